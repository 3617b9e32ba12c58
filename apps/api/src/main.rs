mod analysis;
mod analytics;
mod auth;
mod config;
mod db;
mod errors;
mod evaluation;
mod extraction;
mod feedback;
mod jobs;
mod llm_client;
mod models;
mod resumes;
mod routes;
mod scoring;
mod state;
mod storage;
mod users;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::store::PgStore;
use crate::feedback::FeedbackGenerator;
use crate::llm_client::{ChatModel, LlmClient};
use crate::routes::{build_router, cors_layer};
use crate::scoring::{KeywordRelevanceScorer, LlmRefinedScorer, RelevanceScorer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relevance API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Scorer and feedback: model-backed only when an API key is configured
    let (scorer, feedback): (Arc<dyn RelevanceScorer>, FeedbackGenerator) =
        match &config.openai_api_key {
            Some(key) => {
                let llm: Arc<dyn ChatModel> = Arc::new(LlmClient::new(
                    key.clone(),
                    config.ai_model.clone(),
                    config.ai_timeout,
                )?);
                info!("LLM refinement enabled (model: {})", config.ai_model);
                (
                    Arc::new(LlmRefinedScorer::new(
                        llm.clone(),
                        config.ai_timeout,
                        config.ai_prompt_char_budget,
                    )),
                    FeedbackGenerator::with_model(llm, config.ai_timeout),
                )
            }
            None => {
                info!("OPENAI_API_KEY not set; using keyword scoring and template feedback");
                (Arc::new(KeywordRelevanceScorer), FeedbackGenerator::templates_only())
            }
        };

    info!(
        "Verdict thresholds: high >= {}, medium >= {}",
        config.verdict_thresholds.high(),
        config.verdict_thresholds.medium()
    );

    // Build app state
    let state = AppState {
        store: PgStore::new(db.clone()),
        db,
        s3,
        config: config.clone(),
        scorer,
        feedback,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.cors_allowed_origins)?),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "relevance-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
