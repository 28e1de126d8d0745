//! P3394 working group portal - assistant service
//!
//! Serves the portal's conversational assistant panel: a single-writer
//! conversation state machine backed by a Gemini completion gateway.

mod api;
mod gateway;
mod identity;
mod llm;
mod message;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use gateway::{CompletionGateway, GatewayConfig};
use identity::StaticActor;
use llm::{LlmConfig, ModelRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "p3394_portal=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("PORTAL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No completion model configured. Set GEMINI_API_KEY or LLM_GATEWAY; every reply will be the fallback message.");
    }

    let default_llm = llm_registry.default();
    if default_llm.is_none() && llm_registry.has_models() {
        tracing::warn!(model = %llm_registry.default_model_id(), "Default model is not available");
    }

    let gateway_config = GatewayConfig::from_env();
    tracing::info!(max_attempts = gateway_config.max_attempts, "Completion gateway configured");
    let gateway = Arc::new(CompletionGateway::new(default_llm, gateway_config));

    let actor = Arc::new(StaticActor::from_env());
    tracing::info!(member = %identity::CurrentActor::display_name(actor.as_ref()), "Portal member");

    // Create application state
    let state = AppState::new(gateway, actor, llm_registry);

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
    tracing::info!("P3394 portal assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
