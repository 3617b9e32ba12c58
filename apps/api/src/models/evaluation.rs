use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::feedback::{ActionItem, LongTermGoal, ProjectSuggestion, SkillImprovement};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub attempt: i32,
    pub score: i32,
    pub verdict: String,
    pub keyword_score: i32,
    pub skills_match_score: f64,
    pub experience_match_score: f64,
    pub education_match_score: f64,
    pub certification_match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub ai_analysis: Option<String>,
    pub scorer_backend: String,
    pub degraded: bool,
    pub evaluated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedbackRow {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub overall_feedback: String,
    pub skill_improvements: Json<Vec<SkillImprovement>>,
    pub project_suggestions: Json<Vec<ProjectSuggestion>>,
    pub immediate_actions: Json<Vec<ActionItem>>,
    pub long_term_goals: Json<Vec<LongTermGoal>>,
    pub priority: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Evaluation joined with the names a dashboard shows next to it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EvaluationSummaryRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub attempt: i32,
    pub score: i32,
    pub verdict: String,
    pub degraded: bool,
    pub candidate_name: Option<String>,
    pub original_filename: String,
    pub job_title: String,
    pub company: String,
    pub created_at: DateTime<Utc>,
}
