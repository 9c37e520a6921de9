//! Headless application flows against a mock backend: bootstrap, streamed
//! ask requests, failure surfacing, and the streaming-flag lifecycle.

use parley::api::{ApiClient, LogEntry, Message, Session};
use parley::app::{App, AskOutcome, AskPresenter, ConversationView, DismissingPresenter, NullView};
use parley::ask::AskQueueEntry;
use parley::config::Config;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every rendered message as `(role, message_type)`.
#[derive(Default)]
struct RecordingView {
    shown: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingView {
    fn with_log() -> (Self, Arc<Mutex<Vec<(String, String)>>>) {
        let shown = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                shown: Arc::clone(&shown),
            },
            shown,
        )
    }

    fn record(&self, message: &Message) {
        self.shown
            .lock()
            .unwrap()
            .push((message.role.clone(), message.message_type.clone()));
    }
}

impl ConversationView for RecordingView {
    fn show_message(&mut self, message: &Message) {
        self.record(message);
    }
    fn show_snapshot(&mut self, messages: &[Message], _logs: &[LogEntry]) {
        for message in messages {
            self.record(message);
        }
    }
    fn show_sessions(&mut self, _sessions: &[Session], _current: Option<&str>) {}
    fn status(&mut self, _line: &str) {}
    fn timer_started(&mut self) {}
    fn timer_stopped(&mut self, _label: &str) {}
}

/// Replays scripted outcomes and records what was presented.
struct ScriptedPresenter {
    outcomes: VecDeque<AskOutcome>,
    presented: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPresenter {
    fn new(outcomes: Vec<AskOutcome>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let presented = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                outcomes: outcomes.into(),
                presented: Arc::clone(&presented),
            },
            presented,
        )
    }
}

impl AskPresenter for ScriptedPresenter {
    fn present(&mut self, entry: &AskQueueEntry) -> AskOutcome {
        self.presented.lock().unwrap().push(entry.key.clone());
        self.outcomes.pop_front().unwrap_or(AskOutcome::Dismissed)
    }
}

fn test_config() -> Config {
    Config::default()
}

async fn mount_bootstrap(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u1", "username": "ada", "display_name": "Ada" },
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/u1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "title": "First", "model": "default", "permission_mode": "ask" },
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s1/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

fn app_for(
    server: &MockServer,
    view: RecordingView,
    presenter: ScriptedPresenter,
) -> App {
    App::new(
        ApiClient::new(&server.uri()),
        test_config(),
        Box::new(view),
        Box::new(presenter),
    )
}

#[tokio::test]
async fn bootstrap_selects_first_user_and_session() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;

    let mut app = App::new(
        ApiClient::new(&server.uri()),
        test_config(),
        Box::new(NullView),
        Box::new(DismissingPresenter),
    );

    app.bootstrap().await.unwrap();
    assert_eq!(app.current_user_id(), Some("u1"));
    assert_eq!(app.current_session_id(), Some("s1"));
    assert!(!app.is_streaming());
}

#[tokio::test]
async fn bootstrap_without_users_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut app = App::new(
        ApiClient::new(&server.uri()),
        test_config(),
        Box::new(NullView),
        Box::new(DismissingPresenter),
    );

    let error = app.bootstrap().await.unwrap_err();
    assert!(error.to_string().contains("no users"));
}

#[tokio::test]
async fn bootstrap_creates_a_session_when_none_exist() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u1", "username": "ada", "display_name": "Ada" },
        ])))
        .mount(&server)
        .await;
    // First listing is empty; after creation the new session shows up.
    Mock::given(method("GET"))
        .and(path("/api/users/u1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sessions"))
        .and(body_json(json!({ "user_id": "u1", "title": "New Session" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            { "id": "s9", "title": "New Session", "model": "default", "permission_mode": "ask" }
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/u1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s9", "title": "New Session", "model": "default", "permission_mode": "ask" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s9/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s9/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (view, _) = RecordingView::with_log();
    let (presenter, _) = ScriptedPresenter::new(vec![]);
    let mut app = app_for(&server, view, presenter);

    app.bootstrap().await.unwrap();
    assert_eq!(app.current_session_id(), Some("s9"));
}

fn ask_stream_body() -> &'static str {
    concat!(
        "data: {\"event\":\"message\",\"payload\":{\"id\":\"m-ask\",\"role\":\"assistant\",",
        "\"message_type\":\"AssistantMessage\",\"payload\":{\"content\":[",
        "{\"type\":\"tool_use\",\"id\":\"t1\",\"name\":\"AskUserQuestion\",",
        "\"input\":{\"questions\":[{\"header\":\"Color\",\"question\":\"Pick\",",
        "\"options\":[{\"label\":\"A\"},{\"label\":\"B\"}]}]}}]}}}\n\n",
        "data: {\"event\":\"message\",\"payload\":{\"id\":\"m-res\",\"role\":\"result\",",
        "\"message_type\":\"ResultMessage\",\"payload\":{\"result\":\"ok\"}}}\n\n",
    )
}

#[tokio::test]
async fn streamed_ask_request_presents_once_and_dismisses() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/messages/stream"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ask_stream_body(), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let (view, _) = RecordingView::with_log();
    let (presenter, presented) = ScriptedPresenter::new(vec![AskOutcome::Dismissed]);
    let mut app = app_for(&server, view, presenter);

    app.bootstrap().await.unwrap();
    app.submit_prompt("hello").await.unwrap();
    app.drain_asks().await;

    assert_eq!(presented.lock().unwrap().as_slice(), ["m-ask"]);
    assert!(!app.sequencer().is_presenting());
    assert!(!app.is_streaming());
}

#[tokio::test]
async fn submitted_answer_re_enters_the_prompt_path() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    // First stream carries the question; the answer's stream just ends.
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/messages/stream"))
        .and(body_json(json!({ "prompt": "hello" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ask_stream_body(), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/messages/stream"))
        .and(body_json(json!({ "prompt": "B" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"event\":\"message\",\"payload\":{\"id\":\"m2\",\"role\":\"result\",\"message_type\":\"ResultMessage\",\"payload\":{\"result\":\"ok\"}}}\n\n",
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (view, _) = RecordingView::with_log();
    let (presenter, presented) = ScriptedPresenter::new(vec![AskOutcome::Submit {
        answer: "B".into(),
    }]);
    let mut app = app_for(&server, view, presenter);

    app.bootstrap().await.unwrap();
    app.submit_prompt("hello").await.unwrap();
    app.drain_asks().await;

    assert_eq!(presented.lock().unwrap().len(), 1);
    assert!(!app.sequencer().is_presenting());
}

#[tokio::test]
async fn stream_error_envelope_surfaces_a_system_message() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/messages/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"event\":\"error\",\"payload\":{\"message\":\"agent crashed\",\"created_at\":\"t\"}}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let (view, shown) = RecordingView::with_log();
    let (presenter, _) = ScriptedPresenter::new(vec![]);
    let mut app = app_for(&server, view, presenter);

    app.bootstrap().await.unwrap();
    app.submit_prompt("hello").await.unwrap();

    assert!(
        shown
            .lock()
            .unwrap()
            .iter()
            .any(|(role, kind)| role == "system" && kind == "error")
    );
    assert!(!app.is_streaming());
}

#[tokio::test]
async fn transport_failure_reenables_input() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/messages/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (view, shown) = RecordingView::with_log();
    let (presenter, _) = ScriptedPresenter::new(vec![]);
    let mut app = app_for(&server, view, presenter);

    app.bootstrap().await.unwrap();
    assert!(app.submit_prompt("hello").await.is_err());

    // Failure was surfaced once and the streaming flag released.
    assert!(
        shown
            .lock()
            .unwrap()
            .iter()
            .any(|(role, kind)| role == "system" && kind == "error")
    );
    assert!(!app.is_streaming());
}

#[tokio::test]
async fn interrupt_failure_renders_synthetic_message_without_erroring() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/interrupt"))
        .respond_with(ResponseTemplate::new(500).set_body_string("cannot interrupt"))
        .mount(&server)
        .await;

    let (view, shown) = RecordingView::with_log();
    let (presenter, _) = ScriptedPresenter::new(vec![]);
    let mut app = app_for(&server, view, presenter);

    app.bootstrap().await.unwrap();
    app.interrupt().await.unwrap();

    assert!(
        shown
            .lock()
            .unwrap()
            .iter()
            .any(|(_, kind)| kind == "interrupt-error")
    );
}

#[tokio::test]
async fn session_switch_resets_pending_presentations() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s2/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s2/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/messages/stream"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ask_stream_body(), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let (view, _) = RecordingView::with_log();
    let (presenter, presented) = ScriptedPresenter::new(vec![]);
    let mut app = app_for(&server, view, presenter);

    app.bootstrap().await.unwrap();
    app.submit_prompt("hello").await.unwrap();
    assert!(app.sequencer().is_presenting());

    // Switching sessions tears down the queued presentation before it is
    // ever shown.
    app.select_session("s2").await.unwrap();
    assert!(!app.sequencer().is_presenting());
    app.drain_asks().await;
    assert!(presented.lock().unwrap().is_empty());
    assert_eq!(app.current_session_id(), Some("s2"));
}
