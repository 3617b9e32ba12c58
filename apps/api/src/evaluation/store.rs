//! Evaluation persistence. The orchestrator only sees the `EvaluationStore`
//! trait so it can be exercised against an in-memory store in tests.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::FeedbackReport;
use crate::models::evaluation::{EvaluationRow, EvaluationSummaryRow, FeedbackRow};
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::scoring::{ScoreReport, Verdict};

/// One scored pair ready to be written, evaluation and feedback together.
pub struct NewEvaluation<'a> {
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub verdict: Verdict,
    pub report: &'a ScoreReport,
    pub feedback: &'a FeedbackReport,
    pub evaluated_by: Option<Uuid>,
}

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn load_resume(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError>;

    async fn load_job(&self, id: Uuid) -> Result<Option<JobRow>, AppError>;

    /// Inserts a new attempt for the pair. Never updates an earlier one.
    async fn save_evaluation(
        &self,
        new: &NewEvaluation<'_>,
    ) -> Result<(EvaluationRow, FeedbackRow), AppError>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationStore for PgStore {
    async fn load_resume(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn load_job(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM job_descriptions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save_evaluation(
        &self,
        new: &NewEvaluation<'_>,
    ) -> Result<(EvaluationRow, FeedbackRow), AppError> {
        let report = new.report;
        let feedback = new.feedback;
        let mut tx = self.pool.begin().await?;

        // Serialises concurrent attempts on the same pair until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || $2::text, 0))")
            .bind(new.resume_id)
            .bind(new.job_id)
            .execute(&mut *tx)
            .await?;

        let current_max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(attempt) FROM evaluations WHERE resume_id = $1 AND job_id = $2",
        )
        .bind(new.resume_id)
        .bind(new.job_id)
        .fetch_one(&mut *tx)
        .await?;
        let attempt = current_max.unwrap_or(0) + 1;

        let evaluation = sqlx::query_as::<_, EvaluationRow>(
            r#"
            INSERT INTO evaluations
                (id, resume_id, job_id, attempt, score, verdict, keyword_score,
                 skills_match_score, experience_match_score, education_match_score,
                 certification_match_score, matched_skills, missing_skills, strengths,
                 weaknesses, ai_analysis, scorer_backend, degraded, evaluated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.resume_id)
        .bind(new.job_id)
        .bind(attempt)
        .bind(i32::from(report.score))
        .bind(new.verdict.as_str())
        .bind(i32::from(report.keyword_score))
        .bind(report.skills_match)
        .bind(report.experience_match)
        .bind(report.education_match)
        .bind(report.certification_match)
        .bind(&report.matched_skills)
        .bind(&report.missing_skills)
        .bind(&report.strengths)
        .bind(&report.weaknesses)
        .bind(&report.ai_analysis)
        .bind(&report.scorer_backend)
        .bind(report.degraded)
        .bind(new.evaluated_by)
        .fetch_one(&mut *tx)
        .await?;

        let feedback_row = sqlx::query_as::<_, FeedbackRow>(
            r#"
            INSERT INTO feedback
                (id, evaluation_id, overall_feedback, skill_improvements, project_suggestions,
                 immediate_actions, long_term_goals, priority, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(evaluation.id)
        .bind(&feedback.overall_feedback)
        .bind(Json(&feedback.skill_improvements))
        .bind(Json(&feedback.project_suggestions))
        .bind(Json(&feedback.immediate_actions))
        .bind(Json(&feedback.long_term_goals))
        .bind(feedback.priority.as_str())
        .bind(feedback.source.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Stored evaluation {} (resume {}, job {}, attempt {attempt})",
            evaluation.id, new.resume_id, new.job_id
        );
        Ok((evaluation, feedback_row))
    }
}

/// Filters for the evaluation listing.
#[derive(Debug, Default)]
pub struct EvaluationFilter {
    pub job_id: Option<Uuid>,
    pub resume_id: Option<Uuid>,
    pub verdict: Option<Verdict>,
}

impl PgStore {
    pub async fn get_evaluation(
        &self,
        id: Uuid,
    ) -> Result<Option<(EvaluationRow, Option<FeedbackRow>)>, AppError> {
        let Some(evaluation) =
            sqlx::query_as::<_, EvaluationRow>("SELECT * FROM evaluations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let feedback =
            sqlx::query_as::<_, FeedbackRow>("SELECT * FROM feedback WHERE evaluation_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(Some((evaluation, feedback)))
    }

    /// Newest first, with the candidate and job names attached.
    pub async fn list_evaluations(
        &self,
        filter: &EvaluationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<EvaluationSummaryRow>, i64), AppError> {
        let verdict = filter.verdict.map(|v| v.as_str());

        let rows = sqlx::query_as::<_, EvaluationSummaryRow>(
            r#"
            SELECT e.id, e.resume_id, e.job_id, e.attempt, e.score, e.verdict, e.degraded,
                   r.candidate_name, r.original_filename, j.title AS job_title, j.company,
                   e.created_at
            FROM evaluations e
            JOIN resumes r ON r.id = e.resume_id
            JOIN job_descriptions j ON j.id = e.job_id
            WHERE ($1::uuid IS NULL OR e.job_id = $1)
              AND ($2::uuid IS NULL OR e.resume_id = $2)
              AND ($3::text IS NULL OR e.verdict = $3)
            ORDER BY e.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.job_id)
        .bind(filter.resume_id)
        .bind(verdict)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM evaluations e
            WHERE ($1::uuid IS NULL OR e.job_id = $1)
              AND ($2::uuid IS NULL OR e.resume_id = $2)
              AND ($3::text IS NULL OR e.verdict = $3)
            "#,
        )
        .bind(filter.job_id)
        .bind(filter.resume_id)
        .bind(verdict)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
