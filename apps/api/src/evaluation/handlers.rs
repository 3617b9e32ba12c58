use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::evaluation::orchestrator::{
    evaluate_batch, evaluate_pair, BatchOutcome, EvaluationOutcome, EvaluationRequest, Pipeline,
};
use crate::evaluation::store::EvaluationFilter;
use crate::models::evaluation::{EvaluationRow, EvaluationSummaryRow, FeedbackRow};
use crate::models::user::Role;
use crate::routes::pagination::{PageParams, Paginated};
use crate::scoring::Verdict;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub job_id: Uuid,
    pub resume_ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct EvaluationListQuery {
    pub job_id: Option<Uuid>,
    pub resume_id: Option<Uuid>,
    pub verdict: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize)]
pub struct EvaluationDetail {
    pub evaluation: EvaluationRow,
    pub feedback: Option<FeedbackRow>,
}

fn pipeline(state: &AppState) -> Pipeline<'_> {
    Pipeline {
        store: &state.store,
        scorer: state.scorer.as_ref(),
        feedback: &state.feedback,
        thresholds: state.config.verdict_thresholds,
    }
}

/// POST /api/v1/evaluations
pub async fn handle_create_evaluation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<EvaluateRequest>,
) -> Result<(StatusCode, Json<EvaluationOutcome>), AppError> {
    auth.require(Role::can_evaluate)?;

    let outcome = evaluate_pair(
        &pipeline(&state),
        EvaluationRequest {
            resume_id: req.resume_id,
            job_id: req.job_id,
            evaluated_by: Some(auth.user_id),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/batch/evaluate
pub async fn handle_batch_evaluate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchOutcome>, AppError> {
    auth.require(Role::can_run_batches)?;

    let outcome = evaluate_batch(
        &pipeline(&state),
        req.job_id,
        &req.resume_ids,
        state.config.batch_evaluation_limit,
        Some(auth.user_id),
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/evaluations
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    Query(query): Query<EvaluationListQuery>,
) -> Result<Json<Paginated<EvaluationSummaryRow>>, AppError> {
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    }
    .validate()?;
    let verdict = match query.verdict.as_deref() {
        Some(raw) => Some(Verdict::parse(&raw.trim().to_ascii_lowercase()).ok_or_else(|| {
            AppError::Validation(format!("verdict must be one of high, medium, low (got '{raw}')"))
        })?),
        None => None,
    };
    let filter = EvaluationFilter {
        job_id: query.job_id,
        resume_id: query.resume_id,
        verdict,
    };

    let (rows, total) = state
        .store
        .list_evaluations(&filter, page.limit(), page.offset())
        .await?;
    Ok(Json(Paginated::new(rows, page, total)))
}

/// GET /api/v1/evaluations/:id
pub async fn handle_get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationDetail>, AppError> {
    let (evaluation, feedback) = state
        .store
        .get_evaluation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Evaluation {id} not found")))?;
    Ok(Json(EvaluationDetail {
        evaluation,
        feedback,
    }))
}
