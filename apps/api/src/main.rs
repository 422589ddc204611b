mod budget;
mod config;
mod errors;
mod generation;
mod llm_client;
mod persona;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::budget::TokenCounter;
use crate::config::Config;
use crate::generation::generator::{ContentGenerator, GenerationSettings};
use crate::generation::platform::PlatformRuleTable;
use crate::generation::policy::DenylistPolicy;
use crate::generation::prompt_builder::PromptBuilder;
use crate::llm_client::LlmClient;
use crate::persona::InMemoryPersonaStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Composer API v{}", env!("CARGO_PKG_VERSION"));

    // Tokenizer tables are built once and shared
    let tokens = TokenCounter::new()?;
    info!("Token counter initialized (cl100k_base)");

    // Initialize LLM client
    let llm = LlmClient::new(
        &config.llm_base_url,
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!(
        "LLM client initialized (endpoint: {}, model: {})",
        llm.endpoint(),
        config.llm_model
    );

    // Persona store: seeded from PERSONAS_PATH, empty otherwise
    let personas = match &config.personas_path {
        Some(path) => InMemoryPersonaStore::from_json_file(path)?,
        None => {
            info!("PERSONAS_PATH not set; every request uses the default persona");
            InMemoryPersonaStore::new()
        }
    };

    // Content policy (DenylistPolicy by default — swap for a semantic classifier here)
    let generator = ContentGenerator::new(
        Arc::new(llm),
        Arc::new(personas),
        Arc::new(DenylistPolicy),
        PromptBuilder::new(PlatformRuleTable::default()),
        tokens,
        GenerationSettings {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_attempts: config.generation_max_attempts,
            auto_hashtags: config.auto_append_hashtags,
        },
    );

    let state = AppState {
        generator: Arc::new(generator),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
