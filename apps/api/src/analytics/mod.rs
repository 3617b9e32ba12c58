//! Dashboard summary polled by the front end.

use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;
use crate::models::evaluation::EvaluationSummaryRow;
use crate::models::job::JobRow;
use crate::scoring::Verdict;
use crate::state::AppState;

const RECENT_WINDOW_DAYS: i64 = 7;
const RECENT_EVALUATIONS: i64 = 10;
const RECENT_JOBS: i64 = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerdictDistribution {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

impl VerdictDistribution {
    /// Folds `(verdict, count)` rows; unknown labels are ignored.
    pub fn from_counts<'a>(rows: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        rows.into_iter().fold(Self::default(), |mut acc, (label, count)| {
            match Verdict::parse(label) {
                Some(Verdict::High) => acc.high += count,
                Some(Verdict::Medium) => acc.medium += count,
                Some(Verdict::Low) => acc.low += count,
                None => {}
            }
            acc
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_resumes: i64,
    pub total_evaluations: i64,
    pub recent_evaluations: i64,
    pub degraded_evaluations: i64,
    pub average_score: Option<f64>,
    pub verdict_distribution: VerdictDistribution,
    pub latest_evaluations: Vec<EvaluationSummaryRow>,
    pub latest_jobs: Vec<JobRow>,
    pub generated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct Totals {
    total_jobs: i64,
    active_jobs: i64,
    total_resumes: i64,
    total_evaluations: i64,
    recent_evaluations: i64,
    degraded_evaluations: i64,
    average_score: Option<f64>,
}

async fn load_totals(pool: &PgPool, since: DateTime<Utc>) -> Result<Totals, sqlx::Error> {
    sqlx::query_as::<_, Totals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM job_descriptions) AS total_jobs,
            (SELECT COUNT(*) FROM job_descriptions WHERE status = 'active') AS active_jobs,
            (SELECT COUNT(*) FROM resumes) AS total_resumes,
            (SELECT COUNT(*) FROM evaluations) AS total_evaluations,
            (SELECT COUNT(*) FROM evaluations WHERE created_at >= $1) AS recent_evaluations,
            (SELECT COUNT(*) FROM evaluations WHERE degraded) AS degraded_evaluations,
            (SELECT AVG(score)::float8 FROM evaluations) AS average_score
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await
}

/// GET /api/v1/analytics/summary
pub async fn handle_summary(State(state): State<AppState>) -> Result<Json<AnalyticsSummary>, AppError> {
    let now = Utc::now();
    let totals = load_totals(&state.db, now - Duration::days(RECENT_WINDOW_DAYS)).await?;

    let verdict_rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT verdict, COUNT(*) FROM evaluations GROUP BY verdict")
            .fetch_all(&state.db)
            .await?;
    let verdict_distribution =
        VerdictDistribution::from_counts(verdict_rows.iter().map(|(v, c)| (v.as_str(), *c)));

    let (latest_evaluations, _) = state
        .store
        .list_evaluations(&Default::default(), RECENT_EVALUATIONS, 0)
        .await?;
    let latest_jobs = sqlx::query_as::<_, JobRow>(
        "SELECT * FROM job_descriptions ORDER BY created_at DESC LIMIT $1",
    )
    .bind(RECENT_JOBS)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AnalyticsSummary {
        total_jobs: totals.total_jobs,
        active_jobs: totals.active_jobs,
        total_resumes: totals.total_resumes,
        total_evaluations: totals.total_evaluations,
        recent_evaluations: totals.recent_evaluations,
        degraded_evaluations: totals.degraded_evaluations,
        average_score: totals.average_score.map(|s| (s * 10.0).round() / 10.0),
        verdict_distribution,
        latest_evaluations,
        latest_jobs,
        generated_at: now,
    }))
}
