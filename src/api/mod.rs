/// Client for the external chat API.
///
/// - `client` - reqwest-backed `ApiClient`
/// - `models` - wire shapes for requests and responses
/// - `error` - `ApiError` taxonomy shared by every call
///
/// The chat controller talks to the API only through [`ChatBackend`], so
/// it can be driven by a scripted backend in tests.
mod client;
mod error;
mod models;

use async_trait::async_trait;
use futures::stream::LocalBoxStream;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use models::{
    AuthData, RemoteMessage, RemoteThread, StreamRequest, Student, StudentId, StudentList,
    ThreadDetail, ThreadList,
};

/// Raw body chunks of a streaming response.
pub type ByteStream = LocalBoxStream<'static, ApiResult<Vec<u8>>>;

#[async_trait(?Send)]
pub trait ChatBackend {
    async fn list_threads(&self) -> ApiResult<Vec<RemoteThread>>;

    async fn thread_messages(&self, thread_id: &str) -> ApiResult<Vec<RemoteMessage>>;

    /// Issues `POST /chat/stream`. Non-2xx responses are returned as errors
    /// before any body is read.
    async fn open_stream(&self, request: &StreamRequest) -> ApiResult<ByteStream>;
}
