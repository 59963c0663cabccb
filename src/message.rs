// src/message.rs
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    /// Optional caller override for the detected language, e.g. "fr".
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<HistoryMessage>,
}

#[derive(Serialize, Deserialize)]
pub struct HistoryMessage {
    pub user_message: String,
    pub bot_response: String,
    pub lang_code: String,
    pub created_at: String,
}
