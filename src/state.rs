// src/state.rs
use std::sync::Arc;

use crate::services::assistant::Assistant;
use crate::services::language::LanguageAdapter;
use crate::services::store::ChatStore;

pub type SharedState = Arc<AppState>;

/// Dependencies shared by all handlers. Constructed once in `main` (or in
/// tests with doubles) and injected through axum's `State`.
pub struct AppState {
    pub store: ChatStore,
    pub assistant: Arc<dyn Assistant>,
    pub language: Arc<dyn LanguageAdapter>,
}

impl AppState {
    pub fn new(
        store: ChatStore,
        assistant: Arc<dyn Assistant>,
        language: Arc<dyn LanguageAdapter>,
    ) -> Self {
        Self {
            store,
            assistant,
            language,
        }
    }
}
