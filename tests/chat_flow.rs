//! End-to-end chat flows against a scripted backend.

use async_trait::async_trait;
use chatapp::api::{
    ApiError, ApiResult, ByteStream, ChatBackend, RemoteMessage, RemoteThread, StreamRequest,
};
use chatapp::chat::{
    ChatError, ChatState, ChatStore, create_local_thread, load_threads, refresh_threads,
    select_thread, send_message, start_exchange,
};
use chatapp::types::{ExchangePhase, Role, is_temporary_id};
use futures::StreamExt;
use futures::stream;
use reqwest::StatusCode;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
struct ScriptedBackend {
    threads: RefCell<Vec<RemoteThread>>,
    histories: RefCell<HashMap<String, Vec<RemoteMessage>>>,
    stream: RefCell<Option<ApiResult<ByteStream>>>,
    requests: RefCell<Vec<StreamRequest>>,
    list_calls: Cell<usize>,
    fail_listing: Cell<bool>,
}

impl ScriptedBackend {
    fn with_threads(threads: Vec<RemoteThread>) -> Self {
        let backend = Self::default();
        *backend.threads.borrow_mut() = threads;
        backend
    }

    fn history(self, thread_id: &str, messages: Vec<RemoteMessage>) -> Self {
        self.histories
            .borrow_mut()
            .insert(thread_id.to_string(), messages);
        self
    }

    fn script(&self, body: ApiResult<ByteStream>) {
        *self.stream.borrow_mut() = Some(body);
    }

    fn last_request(&self) -> StreamRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("a stream was opened")
    }
}

#[async_trait(?Send)]
impl ChatBackend for ScriptedBackend {
    async fn list_threads(&self) -> ApiResult<Vec<RemoteThread>> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_listing.get() {
            return Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: "database unavailable".into(),
            });
        }
        Ok(self.threads.borrow().clone())
    }

    async fn thread_messages(&self, thread_id: &str) -> ApiResult<Vec<RemoteMessage>> {
        self.histories
            .borrow()
            .get(thread_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: StatusCode::NOT_FOUND,
                detail: "Thread not found".into(),
            })
    }

    async fn open_stream(&self, request: &StreamRequest) -> ApiResult<ByteStream> {
        self.requests.borrow_mut().push(request.clone());
        self.stream
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(stream::empty().boxed_local()))
    }
}

/// Lets a test reach the state while the controller is mid-stream.
#[derive(Clone, Default)]
struct SharedState(Rc<RefCell<ChatState>>);

impl ChatStore for SharedState {
    fn view<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&self.0.borrow())
    }

    fn update<R>(&mut self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

fn remote_thread(id: &str, title: &str) -> RemoteThread {
    RemoteThread {
        id: id.into(),
        title: Some(title.into()),
        last_message: Some(format!("last in {id}")),
        created_at: Some("2024-03-01T12:00:00".into()),
    }
}

fn remote_message(id: &str, role: &str, content: &str) -> RemoteMessage {
    RemoteMessage {
        id: id.into(),
        content: content.into(),
        role: role.into(),
        timestamp: Some("2024-03-01T12:00:00Z".into()),
    }
}

fn frame(json: &str) -> Vec<u8> {
    format!("data: {json}\n").into_bytes()
}

fn body_of(chunks: Vec<Vec<u8>>) -> ApiResult<ByteStream> {
    Ok(stream::iter(chunks.into_iter().map(Ok)).boxed_local())
}

/// Splits one body into fixed-size chunks, ignoring line and char boundaries.
fn split_body(body: &[u8], size: usize) -> ApiResult<ByteStream> {
    body_of(body.chunks(size).map(<[u8]>::to_vec).collect())
}

async fn state_with_server_thread(backend: &ScriptedBackend) -> ChatState {
    let mut state = ChatState::new();
    load_threads(backend, &mut state).await.unwrap();
    state
}

#[tokio::test]
async fn load_threads_opens_the_first_thread() {
    let backend = ScriptedBackend::with_threads(vec![
        remote_thread("t1", "Algebra"),
        remote_thread("t2", "History"),
    ])
    .history(
        "t1",
        vec![
            remote_message("m1", "user", "What is x?"),
            remote_message("m2", "assistant", "A variable."),
        ],
    );

    let state = state_with_server_thread(&backend).await;

    assert_eq!(state.threads().len(), 2);
    assert_eq!(state.active_id(), Some("t1"));
    let active = state.active_thread().unwrap();
    assert_eq!(active.messages.len(), 2);
    assert_eq!(active.messages[1].role, Role::Assistant);
    assert!(state.thread("t2").unwrap().messages.is_empty());
}

#[tokio::test]
async fn failed_load_leaves_state_alone() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Algebra")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;
    let before = state.clone();

    backend.fail_listing.set(true);
    let err = load_threads(&backend, &mut state).await.unwrap_err();

    assert!(matches!(err, ChatError::Api(ApiError::Status { .. })));
    assert_eq!(err.to_string(), "database unavailable");
    assert_eq!(state, before);
}

#[tokio::test]
async fn failed_select_keeps_the_current_selection() {
    let backend = ScriptedBackend::with_threads(vec![
        remote_thread("t1", "Algebra"),
        remote_thread("gone", "Deleted elsewhere"),
    ])
    .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    let err = select_thread(&backend, &mut state, "gone")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Thread not found");
    assert_eq!(state.active_id(), Some("t1"));
}

#[tokio::test]
async fn first_message_on_a_new_thread_adopts_the_server_id() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("old", "Older chat")])
        .history("old", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    let temp_id = create_local_thread(&mut state);
    assert!(is_temporary_id(&temp_id));

    *backend.threads.borrow_mut() = vec![
        remote_thread("srv-42", "Photosynthesis basics"),
        remote_thread("old", "Older chat"),
    ];
    backend.script(body_of(vec![
        frame(r#"{"type":"start","thread_id":"srv-42"}"#),
        frame(r#"{"type":"delta","content":"Plants "}"#),
        frame(r#"{"type":"delta","content":"use light."}"#),
        frame(r#"{"type":"done","full_response":"Plants use light."}"#),
    ]));

    let outcome = send_message(&backend, &mut state, "  How does photosynthesis work?  ")
        .await
        .unwrap();

    let request = backend.last_request();
    assert_eq!(request.thread_id, None);
    assert_eq!(request.user_input, "How does photosynthesis work?");
    assert!(request.stream);

    assert!(outcome.thread_assigned);
    assert_eq!(outcome.thread_id, "srv-42");
    assert_eq!(outcome.reply, "Plants use light.");

    assert!(state.thread(&temp_id).is_none());
    let ids: Vec<&str> = state.threads().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["srv-42", "old"]);
    assert_eq!(state.active_id(), Some("srv-42"));

    let thread = state.thread("srv-42").unwrap();
    assert_eq!(thread.title, "Photosynthesis basics");
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[0].content, "How does photosynthesis work?");
    assert_eq!(thread.messages[1].content, "Plants use light.");
    assert_eq!(state.streaming_id(), None);
    assert_eq!(state.phase(), ExchangePhase::Completed);
}

#[tokio::test]
async fn start_refreshes_the_list_even_when_the_reply_fails() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("old", "Older chat")])
        .history("old", Vec::new());
    let mut state = state_with_server_thread(&backend).await;
    create_local_thread(&mut state);
    let listings = backend.list_calls.get();

    *backend.threads.borrow_mut() = vec![
        remote_thread("srv-9", "Greetings"),
        remote_thread("old", "Older chat"),
    ];
    backend.script(body_of(vec![
        frame(r#"{"type":"start","thread_id":"srv-9"}"#),
        frame(r#"{"type":"error","error":"boom"}"#),
    ]));

    let err = send_message(&backend, &mut state, "hello there").await.unwrap_err();
    assert!(matches!(&err, ChatError::Application(message) if message == "boom"));

    assert_eq!(backend.list_calls.get(), listings + 1);
    let thread = state.thread("srv-9").unwrap();
    assert_eq!(thread.title, "Greetings");
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(state.active_id(), Some("srv-9"));
}

#[tokio::test]
async fn finished_thread_survives_a_lagging_listing() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("old", "Older chat")])
        .history("old", Vec::new());
    let mut shared = SharedState::default();
    load_threads(&backend, &mut shared).await.unwrap();
    create_local_thread(&mut shared);

    let navigator = shared.clone();
    let mut index = 0;
    let body = stream::iter(vec![
        frame(r#"{"type":"start","thread_id":"srv-9"}"#),
        frame(r#"{"type":"delta","content":"Hi there"}"#),
        frame(r#"{"type":"done","full_response":"Hi there"}"#),
    ])
    .map(move |chunk| {
        // The user goes back to the older thread before the reply finishes.
        if index == 2 {
            navigator.0.borrow_mut().open_thread("old", Vec::new());
        }
        index += 1;
        Ok::<_, ApiError>(chunk)
    })
    .boxed_local();
    backend.script(Ok(body));

    let outcome = send_message(&backend, &mut shared, "hello").await.unwrap();
    assert_eq!(outcome.thread_id, "srv-9");

    // The server listing still lacks the new thread.
    refresh_threads(&backend, &mut shared).await;

    shared.view(|state| {
        let ids: Vec<&str> = state.threads().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["srv-9", "old"]);
        let finished = state.thread("srv-9").unwrap();
        assert_eq!(finished.messages.len(), 2);
        assert_eq!(finished.messages[1].content, "Hi there");
        assert_eq!(state.active_id(), Some("old"));
    });
}

#[tokio::test]
async fn existing_threads_send_their_id_and_skip_the_refresh() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Algebra")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;
    let listings = backend.list_calls.get();

    backend.script(body_of(vec![
        frame(r#"{"type":"start","thread_id":"t1"}"#),
        frame(r#"{"type":"done","full_response":"x = 2"}"#),
    ]));
    let outcome = send_message(&backend, &mut state, "solve 2x = 4").await.unwrap();

    assert_eq!(backend.last_request().thread_id.as_deref(), Some("t1"));
    assert!(!outcome.thread_assigned);
    assert_eq!(backend.list_calls.get(), listings);
    assert_eq!(state.thread("t1").unwrap().last_message, "x = 2");
}

#[tokio::test]
async fn frames_split_across_chunks_reassemble() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "French")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    let mut body = Vec::new();
    body.extend(frame(r#"{"type":"delta","content":"Très "}"#));
    body.extend(b"\n");
    body.extend(frame(r#"{"type":"delta","content":"bien, déjà vu"}"#));
    body.extend(frame(r#"{"type":"done","full_response":"Très bien, déjà vu"}"#));
    backend.script(split_body(&body, 3));

    let outcome = send_message(&backend, &mut state, "Say something").await.unwrap();
    assert_eq!(outcome.reply, "Très bien, déjà vu");
}

#[tokio::test]
async fn malformed_frames_are_skipped() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Misc")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    backend.script(body_of(vec![
        frame(r#"{"type":"delta","content":"Hel"}"#),
        b"data: {not json\n".to_vec(),
        b": keep-alive\n".to_vec(),
        frame(r#"{"type":"mystery","payload":1}"#),
        frame(r#"{"type":"delta","content":"lo"}"#),
    ]));

    let outcome = send_message(&backend, &mut state, "hi").await.unwrap();
    assert_eq!(outcome.reply, "Hello");
}

#[tokio::test]
async fn error_event_fails_the_exchange_but_keeps_the_question() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Misc")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    backend.script(body_of(vec![
        frame(r#"{"type":"delta","content":"Partial"}"#),
        frame(r#"{"type":"error","error":"Model overloaded"}"#),
        frame(r#"{"type":"delta","content":" ignored"}"#),
    ]));

    let err = send_message(&backend, &mut state, "hi").await.unwrap_err();
    assert!(matches!(&err, ChatError::Application(message) if message == "Model overloaded"));

    let thread = state.thread("t1").unwrap();
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(thread.messages[0].role, Role::User);
    assert_eq!(state.streaming_id(), None);
    assert_eq!(state.phase(), ExchangePhase::Failed);
}

#[tokio::test]
async fn rejected_stream_request_removes_the_placeholder() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Misc")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    backend.script(Err(ApiError::from_status(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"detail":"LLM backend down"}"#,
    )));
    let err = send_message(&backend, &mut state, "hi").await.unwrap_err();
    assert_eq!(err.to_string(), "LLM backend down");
    assert!(!err.is_unauthorized());
    assert_eq!(state.thread("t1").unwrap().messages.len(), 1);

    backend.script(Err(ApiError::from_status(StatusCode::UNAUTHORIZED, "")));
    let err = send_message(&backend, &mut state, "again").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(state.phase(), ExchangePhase::Failed);
}

#[tokio::test]
async fn transport_failure_mid_stream_discards_partial_reply() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Misc")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    let broken = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let chunks: Vec<ApiResult<Vec<u8>>> = vec![
        Ok(frame(r#"{"type":"delta","content":"half"}"#)),
        Err(ApiError::Malformed(broken)),
    ];
    backend.script(Ok(stream::iter(chunks).boxed_local()));

    let err = send_message(&backend, &mut state, "hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Api(ApiError::Malformed(_))));
    let thread = state.thread("t1").unwrap();
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(state.streaming_id(), None);
}

#[tokio::test]
async fn stream_without_done_keeps_streamed_text() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Misc")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    backend.script(body_of(vec![frame(r#"{"type":"delta","content":"Cut short"}"#)]));
    let outcome = send_message(&backend, &mut state, "hi").await.unwrap();
    assert_eq!(outcome.reply, "Cut short");
    assert_eq!(state.phase(), ExchangePhase::Completed);

    backend.script(body_of(Vec::new()));
    let err = send_message(&backend, &mut state, "again").await.unwrap_err();
    assert!(matches!(err, ChatError::StreamTruncated));
    assert_eq!(state.thread("t1").unwrap().messages.len(), 3);
}

#[tokio::test]
async fn final_frame_without_newline_still_counts() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Misc")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;

    backend.script(body_of(vec![
        frame(r#"{"type":"delta","content":"Almost"}"#),
        br#"data: {"type":"done","full_response":"Almost done"}"#.to_vec(),
    ]));
    let outcome = send_message(&backend, &mut state, "hi").await.unwrap();
    assert_eq!(outcome.reply, "Almost done");
}

#[tokio::test]
async fn switching_threads_mid_stream_keeps_events_with_their_thread() {
    let backend = ScriptedBackend::with_threads(vec![
        remote_thread("t1", "Algebra"),
        remote_thread("t2", "History"),
    ])
    .history("t1", Vec::new())
    .history("t2", vec![remote_message("h1", "user", "Who was Caesar?")]);

    let mut shared = SharedState::default();
    load_threads(&backend, &mut shared).await.unwrap();

    let navigator = shared.clone();
    let mut index = 0;
    let body = stream::iter(vec![
        frame(r#"{"type":"delta","content":"x "}"#),
        frame(r#"{"type":"delta","content":"= 2"}"#),
        frame(r#"{"type":"done","full_response":"x = 2"}"#),
    ])
    .map(move |chunk| {
        // The user opens another thread after the first fragment.
        if index == 1 {
            navigator.0.borrow_mut().focus_thread("t2");
        }
        index += 1;
        Ok::<_, ApiError>(chunk)
    })
    .boxed_local();
    backend.script(Ok(body));

    let outcome = send_message(&backend, &mut shared, "solve").await.unwrap();
    assert_eq!(outcome.thread_id, "t1");

    shared.view(|state| {
        assert_eq!(state.active_id(), Some("t2"));
        let t1 = state.thread("t1").unwrap();
        assert_eq!(t1.messages.len(), 2);
        assert_eq!(t1.messages[1].content, "x = 2");
        assert!(state.thread("t2").unwrap().messages.is_empty());
    });
}

#[tokio::test]
async fn guards_reject_without_touching_the_network() {
    let backend = ScriptedBackend::default();
    let mut state = ChatState::new();

    let err = send_message(&backend, &mut state, "hello").await.unwrap_err();
    assert!(matches!(err, ChatError::NoActiveThread));

    create_local_thread(&mut state);
    let err = send_message(&backend, &mut state, "   ").await.unwrap_err();
    assert!(matches!(err, ChatError::EmptyMessage));

    start_exchange(&mut state, "first").unwrap();
    let err = send_message(&backend, &mut state, "second").await.unwrap_err();
    assert!(matches!(err, ChatError::SendInFlight));

    assert!(backend.requests.borrow().is_empty());
}

#[tokio::test]
async fn refresh_failure_is_not_an_error() {
    let backend = ScriptedBackend::with_threads(vec![remote_thread("t1", "Algebra")])
        .history("t1", Vec::new());
    let mut state = state_with_server_thread(&backend).await;
    let before = state.clone();

    backend.fail_listing.set(true);
    refresh_threads(&backend, &mut state).await;
    assert_eq!(state, before);
}
