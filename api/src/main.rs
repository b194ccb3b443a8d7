mod auth;
mod page;
mod query_payload;
mod rag_response;
mod routes;

use anyhow::{Context, Result};
use nova_rag::{build_chat_service, Settings};
use routes::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env().context("failed to load settings")?;
    let chat = build_chat_service(&settings).context("failed to initialize Nova")?;

    if settings.api_token.is_none() {
        log::warn!("NOVA_API_TOKEN not set; the JSON API is open to anyone who can reach it");
    }

    let app = build_router(AppState::new(chat, settings.api_token.clone()));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
