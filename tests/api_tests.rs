use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use awaken_backend::message::{ChatResponse, HistoryResponse};
use awaken_backend::routes::create_router;
use awaken_backend::services::assistant::{Assistant, AssistantError};
use awaken_backend::services::language::NoopLanguage;
use awaken_backend::services::store::ChatStore;
use awaken_backend::state::AppState;

struct StubAssistant {
    reply: &'static str,
}

#[async_trait]
impl Assistant for StubAssistant {
    async fn generate_reply(&self, _user_message: &str) -> Result<String, AssistantError> {
        Ok(self.reply.to_string())
    }
}

struct FailingAssistant;

#[async_trait]
impl Assistant for FailingAssistant {
    async fn generate_reply(&self, _user_message: &str) -> Result<String, AssistantError> {
        Err(AssistantError::Api {
            status: 503,
            body: "quota exhausted".to_string(),
        })
    }
}

fn test_app(assistant: Arc<dyn Assistant>) -> Router {
    let state = Arc::new(AppState::new(
        ChatStore::in_memory().unwrap(),
        assistant,
        Arc::new(NoopLanguage),
    ));
    create_router().with_state(state)
}

fn chat_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_generates_session_id() {
    let app = test_app(Arc::new(StubAssistant {
        reply: "Rest and drink fluids.",
    }));

    let response = app
        .oneshot(chat_request(
            r#"{"message": "I have a headache", "session_id": null}"#.to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;
    assert_eq!(chat_resp.session_id.len(), 24);
    assert!(!chat_resp.reply.is_empty());
}

#[tokio::test]
async fn test_chat_keeps_supplied_session_id() {
    let app = test_app(Arc::new(StubAssistant { reply: "ok" }));

    let response = app
        .oneshot(chat_request(
            r#"{"message": "hello", "session_id": "my-session"}"#.to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;
    assert_eq!(chat_resp.session_id, "my-session");
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let app = test_app(Arc::new(StubAssistant { reply: "ok" }));

    let response = app
        .oneshot(chat_request(r#"{"message": "   "}"#.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["error"], "Empty message.");
}

#[tokio::test]
async fn test_chat_then_history_round_trip() {
    let app = test_app(Arc::new(StubAssistant {
        reply: "That sounds like tension. Rest, hydrate, and see a doctor if it persists.",
    }));

    let response = app
        .clone()
        .oneshot(chat_request(
            r#"{"message": "I have a headache"}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/history?session_id={}", chat_resp.session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let history: HistoryResponse = read_json(response).await;
    assert_eq!(history.session_id, chat_resp.session_id);
    assert_eq!(history.messages.len(), 1);
    assert_eq!(history.messages[0].user_message, "I have a headache");
    assert_eq!(history.messages[0].bot_response, chat_resp.reply);
}

#[tokio::test]
async fn test_history_requires_session_id() {
    let app = test_app(Arc::new(StubAssistant { reply: "ok" }));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["error"], "session_id is required");
}

#[tokio::test]
async fn test_history_unknown_session_is_empty() {
    let app = test_app(Arc::new(StubAssistant { reply: "ok" }));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/history?session_id=nobody-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let history: HistoryResponse = read_json(response).await;
    assert!(history.messages.is_empty());
}

#[tokio::test]
async fn test_assistant_failure_becomes_inline_reply() {
    let app = test_app(Arc::new(FailingAssistant));

    let response = app
        .oneshot(chat_request(r#"{"message": "I feel dizzy"}"#.to_string()))
        .await
        .unwrap();

    // Gateway failures keep the conversational path available.
    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;
    assert!(chat_resp.reply.starts_with(" Error contacting AI service "));
    assert!(chat_resp.reply.contains("quota exhausted"));
}

#[tokio::test]
async fn test_history_limit_is_clamped() {
    let app = test_app(Arc::new(StubAssistant { reply: "noted" }));

    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(chat_request(format!(
                r#"{{"message": "message {i}", "session_id": "clamp-test"}}"#
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // limit=0 clamps up to 1.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/history?session_id=clamp-test&limit=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let history: HistoryResponse = read_json(response).await;
    assert_eq!(history.messages.len(), 1);

    // limit=9999 clamps down to 200; only 3 rows exist.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/history?session_id=clamp-test&limit=9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let history: HistoryResponse = read_json(response).await;
    assert_eq!(history.messages.len(), 3);
    assert_eq!(history.messages[0].user_message, "message 0");
    assert_eq!(history.messages[2].user_message, "message 2");
}
