//! MH Consult - conversational mental health information service
//!
//! Forwards user turns to a hosted chat completions endpoint and serves the
//! transcript over HTTP. Crisis phrases bypass the model and get a static
//! crisis-resources reply.

mod api;
mod completion;
mod config;
mod history;
mod llm;
mod runtime;
mod safety;
mod state_machine;
mod system_prompt;

use api::{create_router, AppState};
use completion::CompletionClient;
use llm::{CredentialResolver, LoggingService, OpenAIService};
use runtime::RuntimeManager;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sessions without a stream subscriber are dropped after this much inactivity
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local .env first so it can supply RUST_LOG and the settings below
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mh_consult=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    // Configuration
    let config_path = std::env::var("MH_CONSULT_CONFIG")
        .map_or_else(|_| PathBuf::from(config::DEFAULT_CONFIG_PATH), PathBuf::from);
    let secrets_path = std::env::var("MH_CONSULT_SECRETS")
        .map_or_else(|_| PathBuf::from(llm::DEFAULT_SECRETS_PATH), PathBuf::from);
    let base_url =
        std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| llm::DEFAULT_BASE_URL.to_string());

    let port: u16 = std::env::var("MH_CONSULT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let session_ttl = std::env::var("MH_CONSULT_SESSION_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map_or(DEFAULT_SESSION_TTL, Duration::from_secs);

    let config = Arc::new(config::load_config(&config_path));

    let resolver = CredentialResolver::from_env(&secrets_path);
    if resolver.has_process_credential() {
        tracing::info!("API credential configured");
    } else {
        tracing::warn!(
            "No {} in secret store or environment. Sessions must supply a key.",
            llm::API_KEY_VAR
        );
    }

    let service = OpenAIService::new(&base_url)?;
    tracing::info!(
        endpoint = %service.endpoint(),
        model = %config.model.default_model,
        "Completion service initialized"
    );

    let completion = Arc::new(CompletionClient::new(
        Arc::new(LoggingService::new(Arc::new(service))),
        resolver,
        config.model.clone(),
    ));

    // Create application state
    let state = AppState::new(RuntimeManager::new(config, completion));
    state.runtime.spawn_sweeper(SESSION_SWEEP_INTERVAL, session_ttl);
    tracing::info!(ttl_secs = session_ttl.as_secs(), "Idle session sweeper started");

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("MH Consult server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
