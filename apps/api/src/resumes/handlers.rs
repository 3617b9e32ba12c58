use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::build_resume_profile;
use crate::analysis::text::truncate_chars;
use crate::auth::AuthUser;
use crate::db::is_foreign_key_violation;
use crate::errors::AppError;
use crate::extraction::extract_text_bounded;
use crate::models::resume::{NewResume, ResumeRow};
use crate::resumes::repo;
use crate::resumes::upload::validate_upload;
use crate::routes::pagination::{PageParams, Paginated};
use crate::state::AppState;
use crate::storage;

const TEXT_PREVIEW_CHARS: usize = 500;

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub filename: String,
    pub message: String,
    pub resume_id: Uuid,
    pub skills: Vec<String>,
    pub confidence: f64,
}

#[derive(Serialize)]
pub struct ResumeDetail {
    #[serde(flatten)]
    pub resume: ResumeRow,
    pub text_preview: String,
}

#[derive(Deserialize)]
pub struct ResumeListQuery {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Fields collected from the multipart body.
#[derive(Default)]
struct UploadForm {
    filename: Option<String>,
    bytes: Option<Bytes>,
    candidate_name: Option<String>,
    candidate_email: Option<String>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".to_string())
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.filename = Some(field.file_name().unwrap_or_default().to_string());
                form.bytes = Some(field.bytes().await.map_err(multipart_error)?);
            }
            "candidate_name" => {
                form.candidate_name = Some(field.text().await.map_err(multipart_error)?)
            }
            "candidate_email" => {
                form.candidate_email = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {}
        }
    }
    Ok(form)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/v1/resumes (multipart: `file`, optional `candidate_name`, `candidate_email`)
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let form = read_form(multipart).await?;
    let (Some(filename), Some(bytes)) = (form.filename.as_deref(), form.bytes.clone()) else {
        return Err(AppError::Validation("No file provided".to_string()));
    };

    let (format, safe_name) = validate_upload(filename, &bytes, state.config.max_upload_bytes)?;

    let document =
        extract_text_bounded(bytes.clone(), safe_name.clone(), state.config.parsing_timeout)
            .await?;
    let profile = build_resume_profile(&document.text);

    let resume_id = Uuid::new_v4();
    let s3_key = storage::resume_key(resume_id, &safe_name);
    storage::put_object(&state.s3, &state.config.s3_bucket, &s3_key, bytes.clone(), format.mime_type())
        .await?;

    let new = NewResume {
        id: resume_id,
        original_filename: &safe_name,
        s3_key: &s3_key,
        file_size: bytes.len() as i64,
        file_format: format.as_str(),
        extracted_text: &document.text,
        profile: &profile,
        candidate_name: non_blank(&form.candidate_name),
        candidate_email: non_blank(&form.candidate_email),
        uploaded_by: auth.user_id,
    };
    let resume = match repo::insert_resume(&state.db, &new).await {
        Ok(row) => row,
        Err(e) => {
            // The row is the source of truth; drop the orphaned object.
            if let Err(cleanup) = storage::delete_object(&state.s3, &state.config.s3_bucket, &s3_key).await {
                warn!("Orphaned upload {s3_key} left in storage: {cleanup}");
            }
            return Err(e.into());
        }
    };

    info!(
        "Resume {} uploaded by {} ({}, {} bytes, {} skills, confidence {:.1})",
        resume.id,
        auth.user_id,
        format,
        resume.file_size,
        resume.skills.len(),
        resume.parsing_confidence
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            status: "success",
            filename: resume.original_filename.clone(),
            message: format!(
                "Resume uploaded and parsed: {} skills found",
                resume.skills.len()
            ),
            resume_id: resume.id,
            skills: resume.skills,
            confidence: resume.parsing_confidence,
        }),
    ))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(query): Query<ResumeListQuery>,
) -> Result<Json<Paginated<ResumeRow>>, AppError> {
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    }
    .validate()?;
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let (rows, total) = repo::list_resumes(&state.db, search, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(rows, page, total)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetail>, AppError> {
    let resume = repo::find_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    let text_preview = truncate_chars(&resume.extracted_text, TEXT_PREVIEW_CHARS).to_string();
    Ok(Json(ResumeDetail {
        resume,
        text_preview,
    }))
}

/// DELETE /api/v1/resumes/:id
///
/// Refused with 409 while evaluations reference the resume.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let resume = repo::find_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    auth.require_owner_or_admin(resume.uploaded_by)?;

    let evaluations = repo::count_evaluations(&state.db, id).await?;
    if evaluations > 0 {
        return Err(AppError::Conflict(format!(
            "Resume {id} has {evaluations} evaluation(s) and cannot be deleted"
        )));
    }

    match repo::delete_resume(&state.db, id).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::NotFound(format!("Resume {id} not found"))),
        Err(e) if is_foreign_key_violation(&e) => {
            return Err(AppError::Conflict(format!(
                "Resume {id} has evaluations and cannot be deleted"
            )))
        }
        Err(e) => return Err(e.into()),
    }

    if let Err(e) = storage::delete_object(&state.s3, &state.config.s3_bucket, &resume.s3_key).await {
        warn!("Resume {id} deleted but its file remains in storage: {e}");
    }
    info!("Resume {id} deleted by {}", auth.user_id);
    Ok(StatusCode::NO_CONTENT)
}
