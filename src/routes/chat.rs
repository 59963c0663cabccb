use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use tracing::{error, warn};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, HistoryQuery, HistoryResponse},
    services::{
        language::{AUTO_LANG, PIVOT_LANG},
        session::resolve_session_id,
        store::NewChatRecord,
    },
    state::SharedState,
};

const DEFAULT_HISTORY_LIMIT: i64 = 50;

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let user_message = payload.message.trim();
    if user_message.is_empty() {
        return Err(AppError::BadRequest("Empty message.".to_string()));
    }

    let session_id = resolve_session_id(payload.session_id.as_deref());

    // Caller override wins over detection.
    let lang_code = match preferred_lang(payload.lang.as_deref()) {
        Some(lang) => lang,
        None => match state.language.detect(user_message).await {
            Ok(lang) => lang,
            Err(e) => {
                warn!("language detection failed, continuing as auto: {e}");
                AUTO_LANG.to_string()
            }
        },
    };

    // The model only sees the pivot language; translation failures fall back
    // to the untranslated text rather than blocking the reply.
    let message_en = match state
        .language
        .translate(user_message, &lang_code, PIVOT_LANG)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            warn!("inbound translation failed, sending original text: {e}");
            user_message.to_string()
        }
    };

    let reply_en = match state.assistant.generate_reply(&message_en).await {
        Ok(reply) => reply,
        // Deliberately folded into the reply text, matching the original
        // service contract: callers always get HTTP 200 here.
        Err(e) => format!(" Error contacting AI service {e}"),
    };

    let translated_back = state
        .language
        .translate(&reply_en, PIVOT_LANG, &lang_code)
        .await;
    let reply = match translated_back {
        Ok(text) => text,
        Err(e) => {
            warn!("outbound translation failed, returning pivot-language reply: {e}");
            reply_en
        }
    };

    let record = NewChatRecord {
        session_id: session_id.clone(),
        user_message: user_message.to_string(),
        bot_response: reply.clone(),
        lang_code,
        created_at: Utc::now().to_rfc3339(),
    };
    if let Err(e) = state.store.insert(record).await {
        // Persistence is best-effort; the caller still gets the reply.
        error!("failed to store chat exchange: {e}");
    }

    Ok(Json(ChatResponse { reply, session_id }))
}

pub async fn history_handler(
    State(state): State<SharedState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session_id = match query.session_id.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return Err(AppError::BadRequest("session_id is required".to_string())),
    };

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    let messages = match state.store.fetch(&session_id, limit).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("failed to fetch chat history: {e}");
            Vec::new()
        }
    };

    Ok(Json(HistoryResponse {
        session_id,
        messages,
    }))
}

fn preferred_lang(lang: Option<&str>) -> Option<String> {
    lang.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}
