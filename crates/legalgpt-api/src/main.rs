use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use legalgpt_agent::TurnOrchestrator;
use legalgpt_api::{
    config::Config,
    handlers::stream,
    middleware::logging,
    routes::{health, messages, threads},
    state::AppState,
};
use legalgpt_llm::{ChatModelClient, OpenAiCompatClient};
use legalgpt_persist::{MessageStore, MongoStore};
use legalgpt_tools::{HttpSearchClient, ToolDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config =
        Config::load().map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("starting LegalGPT API server");
    tracing::info!("config loaded: {}:{}", config.server.host, config.server.port);

    let model: Arc<dyn ChatModelClient> = Arc::new(OpenAiCompatClient::new(
        &config.model.base_url,
        config.model_api_key.as_deref(),
    )?);

    let search = HttpSearchClient::new(&config.search.base_url)?;
    let dispatcher = Arc::new(ToolDispatcher::new(Arc::new(search)));

    tracing::info!("connecting to MongoDB");
    let store: Arc<dyn MessageStore> = Arc::new(
        MongoStore::connect(&config.mongodb_uri, &config.mongodb.database).await?,
    );
    tracing::info!("MongoDB connected");

    let orchestrator = TurnOrchestrator::new(
        model,
        dispatcher,
        Arc::clone(&store),
        config.orchestrator_config(),
    );

    let state = Arc::new(AppState::new(config.clone(), store, orchestrator));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("server listening on {}", addr);
    tracing::info!("health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Threads
        .route("/threads", post(threads::create_thread))
        .route("/threads", get(threads::list_threads))
        .route("/threads/:thread_id", get(threads::get_thread))
        .route("/threads/:thread_id", delete(threads::delete_thread))
        // Messages
        .route("/threads/:thread_id/messages", get(messages::list_messages))
        .route("/threads/:thread_id/messages", post(stream::send_message_stream));

    Router::new()
        .merge(api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(300))) // streaming turns are slow
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed_origin) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed_origin);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
