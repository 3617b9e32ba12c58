//! Evaluation pipeline: load → derive features → score → verdict → feedback → persist.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::store::{EvaluationStore, NewEvaluation};
use crate::feedback::{FeedbackContext, FeedbackGenerator};
use crate::models::evaluation::{EvaluationRow, FeedbackRow};
use crate::models::job::JobRow;
use crate::models::resume::ResumeRow;
use crate::scoring::{RelevanceScorer, ScoringInput, VerdictThresholds};

/// Collaborators for one evaluation run, borrowed from `AppState`.
pub struct Pipeline<'a> {
    pub store: &'a dyn EvaluationStore,
    pub scorer: &'a dyn RelevanceScorer,
    pub feedback: &'a FeedbackGenerator,
    pub thresholds: VerdictThresholds,
}

#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub evaluated_by: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationOutcome {
    pub evaluation: EvaluationRow,
    pub feedback: FeedbackRow,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchItemResult {
    Completed {
        resume_id: Uuid,
        evaluation_id: Uuid,
        attempt: i32,
        score: i32,
        verdict: String,
        degraded: bool,
    },
    Failed {
        resume_id: Uuid,
        code: &'static str,
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub job_id: Uuid,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

pub async fn evaluate_pair(
    pipeline: &Pipeline<'_>,
    request: EvaluationRequest,
) -> Result<EvaluationOutcome, AppError> {
    let resume = pipeline
        .store
        .load_resume(request.resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", request.resume_id)))?;
    let job = pipeline
        .store
        .load_job(request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", request.job_id)))?;

    score_and_store(pipeline, &resume, &job, request.evaluated_by).await
}

/// Scores every resume against one job, in input order. A failing item is
/// reported in place and does not stop the batch.
pub async fn evaluate_batch(
    pipeline: &Pipeline<'_>,
    job_id: Uuid,
    resume_ids: &[Uuid],
    limit: usize,
    evaluated_by: Option<Uuid>,
) -> Result<BatchOutcome, AppError> {
    if resume_ids.is_empty() {
        return Err(AppError::Validation("resume_ids must not be empty".to_string()));
    }
    if resume_ids.len() > limit {
        return Err(AppError::Validation(format!(
            "At most {limit} resumes can be evaluated per batch (got {})",
            resume_ids.len()
        )));
    }

    let job = pipeline
        .store
        .load_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let mut results = Vec::with_capacity(resume_ids.len());
    for &resume_id in resume_ids {
        let outcome = match pipeline.store.load_resume(resume_id).await {
            Ok(Some(resume)) => score_and_store(pipeline, &resume, &job, evaluated_by).await,
            Ok(None) => Err(AppError::NotFound(format!("Resume {resume_id} not found"))),
            Err(e) => Err(e),
        };

        results.push(match outcome {
            Ok(EvaluationOutcome { evaluation, .. }) => BatchItemResult::Completed {
                resume_id,
                evaluation_id: evaluation.id,
                attempt: evaluation.attempt,
                score: evaluation.score,
                verdict: evaluation.verdict,
                degraded: evaluation.degraded,
            },
            Err(e) => {
                warn!("Batch item failed (job {job_id}, resume {resume_id}): {e}");
                BatchItemResult::Failed {
                    resume_id,
                    code: e.code(),
                    message: e.public_message(),
                }
            }
        });
    }

    let completed = results
        .iter()
        .filter(|r| matches!(r, BatchItemResult::Completed { .. }))
        .count();
    let total = results.len();
    info!("Batch for job {job_id}: {completed}/{total} completed");

    Ok(BatchOutcome {
        job_id,
        total,
        completed,
        failed: total - completed,
        results,
    })
}

async fn score_and_store(
    pipeline: &Pipeline<'_>,
    resume: &ResumeRow,
    job: &JobRow,
    evaluated_by: Option<Uuid>,
) -> Result<EvaluationOutcome, AppError> {
    let input = ScoringInput {
        job_title: job.title.clone(),
        company: job.company.clone(),
        resume_text: resume.extracted_text.clone(),
        job_text: job.full_text(),
        resume: resume.profile(),
        job: job.profile(),
    };

    let report = pipeline.scorer.score(&input).await?;
    let verdict = pipeline.thresholds.verdict_for(report.score);

    let feedback = pipeline
        .feedback
        .generate(&FeedbackContext {
            job_title: &job.title,
            company: &job.company,
            verdict,
            report: &report,
        })
        .await;

    let (evaluation, feedback) = pipeline
        .store
        .save_evaluation(&NewEvaluation {
            resume_id: resume.id,
            job_id: job.id,
            verdict,
            report: &report,
            feedback: &feedback,
            evaluated_by,
        })
        .await?;

    info!(
        "Evaluated resume {} against job {}: {} ({}), backend {}{}",
        resume.id,
        job.id,
        evaluation.score,
        evaluation.verdict,
        evaluation.scorer_backend,
        if evaluation.degraded { ", degraded" } else { "" }
    );
    Ok(EvaluationOutcome {
        evaluation,
        feedback,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::types::Json;

    use super::*;
    use crate::llm_client::tests::StubModel;
    use crate::models::job::tests::job_row;
    use crate::models::resume::tests::resume_row;
    use crate::scoring::{KeywordRelevanceScorer, LlmRefinedScorer};

    /// In-memory store mirroring the attempt numbering of the SQL one.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        resumes: Mutex<HashMap<Uuid, ResumeRow>>,
        jobs: Mutex<HashMap<Uuid, JobRow>>,
        pub(crate) evaluations: Mutex<Vec<EvaluationRow>>,
    }

    impl MemoryStore {
        pub(crate) fn add_resume(&self, row: ResumeRow) -> Uuid {
            let id = row.id;
            self.resumes.lock().unwrap().insert(id, row);
            id
        }

        pub(crate) fn add_job(&self, row: JobRow) -> Uuid {
            let id = row.id;
            self.jobs.lock().unwrap().insert(id, row);
            id
        }
    }

    #[async_trait]
    impl EvaluationStore for MemoryStore {
        async fn load_resume(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
            Ok(self.resumes.lock().unwrap().get(&id).cloned())
        }

        async fn load_job(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
            Ok(self.jobs.lock().unwrap().get(&id).cloned())
        }

        async fn save_evaluation(
            &self,
            new: &NewEvaluation<'_>,
        ) -> Result<(EvaluationRow, FeedbackRow), AppError> {
            let mut evaluations = self.evaluations.lock().unwrap();
            let attempt = evaluations
                .iter()
                .filter(|e| e.resume_id == new.resume_id && e.job_id == new.job_id)
                .map(|e| e.attempt)
                .max()
                .unwrap_or(0)
                + 1;
            let report = new.report;
            let evaluation = EvaluationRow {
                id: Uuid::new_v4(),
                resume_id: new.resume_id,
                job_id: new.job_id,
                attempt,
                score: i32::from(report.score),
                verdict: new.verdict.as_str().to_string(),
                keyword_score: i32::from(report.keyword_score),
                skills_match_score: report.skills_match,
                experience_match_score: report.experience_match,
                education_match_score: report.education_match,
                certification_match_score: report.certification_match,
                matched_skills: report.matched_skills.clone(),
                missing_skills: report.missing_skills.clone(),
                strengths: report.strengths.clone(),
                weaknesses: report.weaknesses.clone(),
                ai_analysis: report.ai_analysis.clone(),
                scorer_backend: report.scorer_backend.clone(),
                degraded: report.degraded,
                evaluated_by: new.evaluated_by,
                created_at: Utc::now(),
            };
            let feedback = FeedbackRow {
                id: Uuid::new_v4(),
                evaluation_id: evaluation.id,
                overall_feedback: new.feedback.overall_feedback.clone(),
                skill_improvements: Json(new.feedback.skill_improvements.clone()),
                project_suggestions: Json(new.feedback.project_suggestions.clone()),
                immediate_actions: Json(new.feedback.immediate_actions.clone()),
                long_term_goals: Json(new.feedback.long_term_goals.clone()),
                priority: new.feedback.priority.as_str().to_string(),
                source: new.feedback.source.to_string(),
                created_at: Utc::now(),
            };
            evaluations.push(evaluation.clone());
            Ok((evaluation, feedback))
        }
    }

    fn seeded() -> (MemoryStore, Uuid, Uuid) {
        let store = MemoryStore::default();
        let resume_id = store.add_resume(resume_row(
            "Data analyst. Daily work in Python and SQL, reporting dashboards.",
            &["python", "sql"],
        ));
        let job_id = store.add_job(job_row(&["python", "sql", "aws"], &[]));
        (store, resume_id, job_id)
    }

    fn request(resume_id: Uuid, job_id: Uuid) -> EvaluationRequest {
        EvaluationRequest {
            resume_id,
            job_id,
            evaluated_by: None,
        }
    }

    #[tokio::test]
    async fn test_pair_scores_67_medium() {
        let (store, resume_id, job_id) = seeded();
        let feedback = FeedbackGenerator::templates_only();
        let pipeline = Pipeline {
            store: &store,
            scorer: &KeywordRelevanceScorer,
            feedback: &feedback,
            thresholds: VerdictThresholds::default(),
        };

        let outcome = evaluate_pair(&pipeline, request(resume_id, job_id)).await.unwrap();
        assert_eq!(outcome.evaluation.score, 67);
        assert_eq!(outcome.evaluation.verdict, "medium");
        assert_eq!(outcome.evaluation.missing_skills, vec!["aws"]);
        assert_eq!(outcome.feedback.evaluation_id, outcome.evaluation.id);
        assert_eq!(outcome.feedback.source, "template");
    }

    #[tokio::test]
    async fn test_reevaluation_creates_new_attempt() {
        let (store, resume_id, job_id) = seeded();
        let feedback = FeedbackGenerator::templates_only();
        let pipeline = Pipeline {
            store: &store,
            scorer: &KeywordRelevanceScorer,
            feedback: &feedback,
            thresholds: VerdictThresholds::default(),
        };

        let first = evaluate_pair(&pipeline, request(resume_id, job_id)).await.unwrap();
        let second = evaluate_pair(&pipeline, request(resume_id, job_id)).await.unwrap();
        assert_ne!(first.evaluation.id, second.evaluation.id);
        assert_eq!(first.evaluation.attempt, 1);
        assert_eq!(second.evaluation.attempt, 2);
        assert_eq!(store.evaluations.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (store, resume_id, job_id) = seeded();
        let feedback = FeedbackGenerator::templates_only();
        let pipeline = Pipeline {
            store: &store,
            scorer: &KeywordRelevanceScorer,
            feedback: &feedback,
            thresholds: VerdictThresholds::default(),
        };

        let err = evaluate_pair(&pipeline, request(Uuid::new_v4(), job_id)).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        let err = evaluate_pair(&pipeline, request(resume_id, Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(store.evaluations.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ai_timeout_degrades_to_keyword_score() {
        let (store, resume_id, job_id) = seeded();
        let scorer = LlmRefinedScorer::new(
            Arc::new(StubModel::slow(Duration::from_secs(120))),
            Duration::from_secs(15),
            4000,
        );
        let feedback = FeedbackGenerator::templates_only();
        let pipeline = Pipeline {
            store: &store,
            scorer: &scorer,
            feedback: &feedback,
            thresholds: VerdictThresholds::default(),
        };

        let outcome = evaluate_pair(&pipeline, request(resume_id, job_id)).await.unwrap();
        assert!(outcome.evaluation.degraded);
        assert_eq!(outcome.evaluation.score, 67);
        assert_eq!(outcome.evaluation.scorer_backend, "keyword");
    }

    #[tokio::test]
    async fn test_batch_reports_every_item_in_order() {
        let (store, resume_id, job_id) = seeded();
        let other = store.add_resume(resume_row("Cloud engineer: AWS, Python, SQL.", &[]));
        let feedback = FeedbackGenerator::templates_only();
        let pipeline = Pipeline {
            store: &store,
            scorer: &KeywordRelevanceScorer,
            feedback: &feedback,
            thresholds: VerdictThresholds::default(),
        };

        let missing = Uuid::new_v4();
        let ids = [resume_id, missing, other, resume_id];
        let batch = evaluate_batch(&pipeline, job_id, &ids, 50, None).await.unwrap();

        assert_eq!(batch.total, 4);
        assert_eq!(batch.results.len(), 4);
        assert_eq!(batch.completed, 3);
        assert_eq!(batch.failed, 1);
        match &batch.results[1] {
            BatchItemResult::Failed { resume_id, code, .. } => {
                assert_eq!(*resume_id, missing);
                assert_eq!(*code, "NOT_FOUND");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        match &batch.results[2] {
            BatchItemResult::Completed { score, verdict, .. } => {
                assert_eq!(*score, 100);
                assert_eq!(verdict, "high");
            }
            other => panic!("expected completion, got {other:?}"),
        }
        match &batch.results[3] {
            BatchItemResult::Completed { attempt, .. } => assert_eq!(*attempt, 2),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_validation() {
        let (store, resume_id, job_id) = seeded();
        let feedback = FeedbackGenerator::templates_only();
        let pipeline = Pipeline {
            store: &store,
            scorer: &KeywordRelevanceScorer,
            feedback: &feedback,
            thresholds: VerdictThresholds::default(),
        };

        let err = evaluate_batch(&pipeline, job_id, &[], 50, None).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let too_many = vec![resume_id; 3];
        let err = evaluate_batch(&pipeline, job_id, &too_many, 2, None).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = evaluate_batch(&pipeline, Uuid::new_v4(), &[resume_id], 50, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
