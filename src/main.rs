use std::path::Path;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing::info;

use awaken_backend::config::Config;
use awaken_backend::routes;
use awaken_backend::services::assistant::OpenAiAssistant;
use awaken_backend::services::language::{GoogleLanguage, LanguageAdapter, NoopLanguage};
use awaken_backend::services::store::ChatStore;
use awaken_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let store = ChatStore::open(Path::new(&config.database_path))?;

    let assistant = Arc::new(OpenAiAssistant::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));

    let language: Arc<dyn LanguageAdapter> = if config.use_translation {
        Arc::new(GoogleLanguage::new())
    } else {
        Arc::new(NoopLanguage)
    };
    info!(enabled = config.use_translation, "translation support");

    let state = Arc::new(AppState::new(store, assistant, language));

    let cors = CorsLayer::very_permissive();

    let app = routes::create_router().with_state(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("awaken backend listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
