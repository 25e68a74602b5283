use super::error::{ApiError, ApiResult, error_detail};
use super::models::{
    AuthData, Envelope, LoginRequest, RegisterRequest, RemoteMessage, RemoteThread,
    ResetPasswordRequest, StatusMessage, StreamRequest, Student, StudentList, ThreadDetail,
    ThreadList,
};
use super::{ByteStream, ChatBackend};
use crate::config::ApiConfig;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP client for the chat API. Cheap to clone; carries the session token.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, "API request failed");
            return Err(ApiError::from_status(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Auth endpoints answer bad credentials with 401, which must not be
    /// confused with an expired session.
    async fn read_auth_envelope(response: Response, fallback: &str) -> ApiResult<AuthData> {
        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Rejected(
                error_detail(&body).unwrap_or_else(|| fallback.to_string()),
            ));
        }
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }
        let envelope: Envelope<AuthData> = serde_json::from_str(&body)?;
        unwrap_auth_envelope(envelope, fallback)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthData> {
        let response = self
            .http
            .post(self.config.endpoint("/auth/register"))
            .json(&RegisterRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;
        Self::read_auth_envelope(response, "Signup failed").await
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthData> {
        let mut request = self
            .http
            .post(self.config.endpoint("/auth/login"))
            .json(&LoginRequest { email, password });
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request.send().await?;
        Self::read_auth_envelope(response, "Login failed").await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ApiResult<String> {
        let response = self
            .http
            .post(self.config.endpoint("/auth/reset-password"))
            .json(&ResetPasswordRequest {
                email,
                new_password,
                confirm_password,
            })
            .send()
            .await?;
        let reply: StatusMessage = Self::read_json(response).await?;
        if reply.status.as_deref() == Some("error") {
            return Err(ApiError::Rejected(
                reply.message.unwrap_or_else(|| "Reset failed".to_string()),
            ));
        }
        Ok(reply
            .message
            .unwrap_or_else(|| "Your password has been updated.".to_string()))
    }

    /// Probes `/test-auth` so a stale token is caught before heavier calls.
    pub async fn check_auth(&self) -> ApiResult<()> {
        let response = self
            .authorized(self.http.get(self.config.endpoint("/test-auth")))
            .send()
            .await?;
        let _: serde_json::Value = Self::read_json(response).await?;
        Ok(())
    }

    pub async fn students(&self) -> ApiResult<Vec<Student>> {
        let response = self
            .authorized(self.http.get(self.config.endpoint("/students")))
            .send()
            .await?;
        let list: StudentList = Self::read_json(response).await?;
        Ok(list.data)
    }
}

fn unwrap_auth_envelope(envelope: Envelope<AuthData>, fallback: &str) -> ApiResult<AuthData> {
    if envelope.is_error() {
        return Err(ApiError::Rejected(
            envelope.message.unwrap_or_else(|| fallback.to_string()),
        ));
    }
    envelope
        .data
        .filter(|data| !data.token.is_empty())
        .ok_or_else(|| ApiError::Rejected(envelope.message.unwrap_or_else(|| fallback.to_string())))
}

#[async_trait(?Send)]
impl ChatBackend for ApiClient {
    async fn list_threads(&self) -> ApiResult<Vec<RemoteThread>> {
        let response = self
            .authorized(self.http.get(self.config.endpoint("/chat/threads")))
            .send()
            .await?;
        let list: ThreadList = Self::read_json(response).await?;
        Ok(list.threads)
    }

    async fn thread_messages(&self, thread_id: &str) -> ApiResult<Vec<RemoteMessage>> {
        let mut url = self.config.endpoint("/chat/threads");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(thread_id);
        }
        let response = self.authorized(self.http.get(url)).send().await?;
        let detail: ThreadDetail = Self::read_json(response).await?;
        Ok(detail.messages)
    }

    async fn open_stream(&self, request: &StreamRequest) -> ApiResult<ByteStream> {
        let response = self
            .authorized(self.http.post(self.config.endpoint("/chat/stream")))
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ApiError::from))
            .boxed_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_envelope_without_token_is_rejected() {
        let envelope: Envelope<AuthData> = serde_json::from_str(
            r#"{"data":{"name":"A","email":"a@x.io","token":""},"status":"success"}"#,
        )
        .unwrap();
        let err = unwrap_auth_envelope(envelope, "Login failed").unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
    }

    #[test]
    fn auth_envelope_yields_token() {
        let envelope: Envelope<AuthData> = serde_json::from_str(
            r#"{"data":{"name":"Ada","email":"ada@x.io","token":"jwt"},"message":"ok","status":"success"}"#,
        )
        .unwrap();
        let data = unwrap_auth_envelope(envelope, "Login failed").unwrap();
        assert_eq!(data.token, "jwt");
        assert_eq!(data.name, "Ada");
    }

    #[test]
    fn client_carries_token() {
        let client = ApiClient::new(ApiConfig::default()).with_token(Some("abc".into()));
        assert!(client.has_token());
        assert!(!ApiClient::new(ApiConfig::default()).has_token());
    }
}
