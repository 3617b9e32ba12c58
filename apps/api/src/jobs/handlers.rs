use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::JobProfile;
use crate::auth::AuthUser;
use crate::db::is_foreign_key_violation;
use crate::errors::AppError;
use crate::jobs::validation::{JobFields, JobPayload};
use crate::jobs::{repo, JobStatus};
use crate::models::job::JobRow;
use crate::models::user::Role;
use crate::routes::pagination::{PageParams, Paginated};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: JobRow,
    /// Skills and requirements as the scorer will see them.
    pub analysis: JobProfile,
}

impl From<JobRow> for JobDetail {
    fn from(job: JobRow) -> Self {
        let analysis = job.profile();
        Self { job, analysis }
    }
}

async fn load_job(state: &AppState, id: Uuid) -> Result<JobRow, AppError> {
    repo::find_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<JobPayload>,
) -> Result<(StatusCode, Json<JobDetail>), AppError> {
    auth.require(Role::can_manage_jobs)?;

    let fields = JobFields::from_payload(payload, None)?;
    let job = repo::insert_job(&state.db, &fields, auth.user_id).await?;
    info!("Job {} '{}' created by {}", job.id, job.title, auth.user_id);

    Ok((StatusCode::CREATED, Json(job.into())))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Paginated<JobRow>>, AppError> {
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    }
    .validate()?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<JobStatus>)
        .transpose()
        .map_err(AppError::Validation)?;
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let (jobs, total) = repo::list_jobs(&state.db, status, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(jobs, page, total)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobDetail>, AppError> {
    Ok(Json(load_job(&state, id).await?.into()))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobPayload>,
) -> Result<Json<JobDetail>, AppError> {
    auth.require(Role::can_manage_jobs)?;
    let existing = load_job(&state, id).await?;
    auth.require_owner_or_admin(existing.created_by)?;

    let fields = JobFields::from_payload(payload, Some(&existing))?;
    let job = repo::update_job(&state.db, id, &fields).await?;
    info!("Job {id} updated by {}", auth.user_id);

    Ok(Json(job.into()))
}

/// DELETE /api/v1/jobs/:id
///
/// Refused with 409 while evaluations reference the job.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::can_manage_jobs)?;
    let existing = load_job(&state, id).await?;
    auth.require_owner_or_admin(existing.created_by)?;

    let evaluations = repo::count_evaluations(&state.db, id).await?;
    if evaluations > 0 {
        return Err(AppError::Conflict(format!(
            "Job {id} has {evaluations} evaluation(s) and cannot be deleted; close it instead"
        )));
    }

    match repo::delete_job(&state.db, id).await {
        Ok(true) => {
            info!("Job {id} deleted by {}", auth.user_id);
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(AppError::NotFound(format!("Job {id} not found"))),
        Err(e) if is_foreign_key_violation(&e) => Err(AppError::Conflict(format!(
            "Job {id} has evaluations and cannot be deleted"
        ))),
        Err(e) => Err(e.into()),
    }
}
