use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::evaluation::store::PgStore;
use crate::feedback::FeedbackGenerator;
use crate::scoring::RelevanceScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Evaluation persistence over the same pool.
    pub store: PgStore,
    pub s3: S3Client,
    pub config: Config,
    /// Keyword scorer, or the model-refined one when an API key is configured.
    pub scorer: Arc<dyn RelevanceScorer>,
    pub feedback: FeedbackGenerator,
}
