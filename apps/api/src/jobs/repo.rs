use sqlx::PgPool;
use uuid::Uuid;

use crate::jobs::validation::JobFields;
use crate::jobs::JobStatus;
use crate::models::job::JobRow;

pub async fn insert_job(pool: &PgPool, fields: &JobFields, created_by: Uuid) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO job_descriptions
            (id, title, company, location, description, requirements, skills_required,
             skills_preferred, experience_level, experience_years, education_required,
             certifications_required, priority, status, deadline, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&fields.title)
    .bind(&fields.company)
    .bind(&fields.location)
    .bind(&fields.description)
    .bind(&fields.requirements)
    .bind(&fields.skills_required)
    .bind(&fields.skills_preferred)
    .bind(fields.experience_level.as_str())
    .bind(fields.experience_years)
    .bind(&fields.education_required)
    .bind(&fields.certifications_required)
    .bind(fields.priority.as_str())
    .bind(fields.status.as_str())
    .bind(fields.deadline)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn update_job(pool: &PgPool, id: Uuid, fields: &JobFields) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE job_descriptions SET
            title = $2, company = $3, location = $4, description = $5, requirements = $6,
            skills_required = $7, skills_preferred = $8, experience_level = $9,
            experience_years = $10, education_required = $11, certifications_required = $12,
            priority = $13, status = $14, deadline = $15, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&fields.title)
    .bind(&fields.company)
    .bind(&fields.location)
    .bind(&fields.description)
    .bind(&fields.requirements)
    .bind(&fields.skills_required)
    .bind(&fields.skills_preferred)
    .bind(fields.experience_level.as_str())
    .bind(fields.experience_years)
    .bind(&fields.education_required)
    .bind(&fields.certifications_required)
    .bind(fields.priority.as_str())
    .bind(fields.status.as_str())
    .bind(fields.deadline)
    .fetch_one(pool)
    .await
}

pub async fn find_job(pool: &PgPool, id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM job_descriptions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_jobs(
    pool: &PgPool,
    status: Option<JobStatus>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<JobRow>, i64), sqlx::Error> {
    let status = status.map(|s| s.as_str());
    let pattern = search.map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

    let rows = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT * FROM job_descriptions
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::text IS NULL OR title ILIKE $2 OR company ILIKE $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(status)
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM job_descriptions
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::text IS NULL OR title ILIKE $2 OR company ILIKE $2)
        "#,
    )
    .bind(status)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

pub async fn count_evaluations(pool: &PgPool, job_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM evaluations WHERE job_id = $1")
        .bind(job_id)
        .fetch_one(pool)
        .await
}

pub async fn delete_job(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM job_descriptions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
