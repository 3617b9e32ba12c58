use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumeRow};

pub async fn insert_resume(pool: &PgPool, new: &NewResume<'_>) -> Result<ResumeRow, sqlx::Error> {
    let profile = new.profile;
    let skills: Vec<String> = profile.skills.iter().cloned().collect();

    sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, original_filename, s3_key, file_size, file_format, extracted_text, skills,
             experience_titles, education, certifications, parsing_confidence,
             candidate_name, candidate_email, candidate_phone, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.original_filename)
    .bind(new.s3_key)
    .bind(new.file_size)
    .bind(new.file_format)
    .bind(new.extracted_text)
    .bind(&skills)
    .bind(&profile.experience_titles)
    .bind(&profile.education)
    .bind(&profile.certifications)
    .bind(profile.confidence)
    .bind(new.candidate_name.or(profile.candidate_name.as_deref()))
    .bind(new.candidate_email.or(profile.email.as_deref()))
    .bind(&profile.phone)
    .bind(new.uploaded_by)
    .fetch_one(pool)
    .await
}

pub async fn find_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_resumes(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ResumeRow>, i64), sqlx::Error> {
    let pattern = search.map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

    let rows = sqlx::query_as::<_, ResumeRow>(
        r#"
        SELECT * FROM resumes
        WHERE ($1::text IS NULL
               OR candidate_name ILIKE $1
               OR candidate_email ILIKE $1
               OR original_filename ILIKE $1)
        ORDER BY uploaded_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM resumes
        WHERE ($1::text IS NULL
               OR candidate_name ILIKE $1
               OR candidate_email ILIKE $1
               OR original_filename ILIKE $1)
        "#,
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

pub async fn count_evaluations(pool: &PgPool, resume_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM evaluations WHERE resume_id = $1")
        .bind(resume_id)
        .fetch_one(pool)
        .await
}

pub async fn delete_resume(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
