//! Feedback generation: improvement suggestions for a scored (resume, job) pair.
//!
//! Structured parts (skills, projects, actions, goals) are always template-built.
//! The overall message comes from the model when one is configured and answers
//! in time; otherwise the verdict template is used.

pub mod prompts;
pub mod templates;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::{fill_template, UNTRUSTED_INPUT_INSTRUCTION};
use crate::llm_client::{ChatModel, LlmError};
use crate::scoring::{ScoreReport, Verdict};
use prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPriority {
    Low,
    Medium,
    High,
}

impl FeedbackPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackPriority::Low => "low",
            FeedbackPriority::Medium => "medium",
            FeedbackPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    Template,
    Ai,
}

impl fmt::Display for FeedbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedbackSource::Template => "template",
            FeedbackSource::Ai => "ai",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillImprovement {
    pub skill: String,
    pub current_level: String,
    pub target_level: String,
    pub suggestion: String,
    pub timeline: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSuggestion {
    pub project_type: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub timeline: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub action: String,
    pub description: String,
    pub timeline: String,
    pub priority: FeedbackPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTermGoal {
    pub goal: String,
    pub description: String,
    pub timeline: String,
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub overall_feedback: String,
    pub skill_improvements: Vec<SkillImprovement>,
    pub project_suggestions: Vec<ProjectSuggestion>,
    pub immediate_actions: Vec<ActionItem>,
    pub long_term_goals: Vec<LongTermGoal>,
    pub priority: FeedbackPriority,
    pub source: FeedbackSource,
}

/// What the generator needs besides the score report.
pub struct FeedbackContext<'a> {
    pub job_title: &'a str,
    pub company: &'a str,
    pub verdict: Verdict,
    pub report: &'a ScoreReport,
}

#[derive(Clone)]
pub struct FeedbackGenerator {
    model: Option<Arc<dyn ChatModel>>,
    timeout: Duration,
}

impl FeedbackGenerator {
    /// Template-only generator.
    pub fn templates_only() -> Self {
        Self {
            model: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_model(model: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self {
            model: Some(model),
            timeout,
        }
    }

    pub async fn generate(&self, ctx: &FeedbackContext<'_>) -> FeedbackReport {
        let score = ctx.report.score;

        let (overall_feedback, source) = match self.ai_overall(ctx).await {
            Some(text) => (text, FeedbackSource::Ai),
            None => (
                templates::overall_feedback(score, ctx.verdict),
                FeedbackSource::Template,
            ),
        };

        FeedbackReport {
            overall_feedback,
            skill_improvements: templates::skill_improvements(&ctx.report.missing_skills),
            project_suggestions: templates::project_suggestions(&ctx.report.missing_skills),
            immediate_actions: templates::immediate_actions(
                &ctx.report.missing_skills,
                &ctx.report.missing_certifications,
            ),
            long_term_goals: templates::long_term_goals(),
            priority: templates::priority(score, ctx.verdict),
            source,
        }
    }

    async fn ai_overall(&self, ctx: &FeedbackContext<'_>) -> Option<String> {
        let model = self.model.as_ref()?;
        let prompt = build_prompt(ctx);

        let outcome = match tokio::time::timeout(
            self.timeout,
            model.complete(&prompt, FEEDBACK_SYSTEM),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!("AI feedback came back empty, using template");
                None
            }
            Err(e) => {
                warn!("AI feedback unavailable, using template: {e}");
                None
            }
        }
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None identified".to_string()
    } else {
        items.join(", ")
    }
}

fn build_prompt(ctx: &FeedbackContext<'_>) -> String {
    let score = ctx.report.score.to_string();
    let strengths = join_or_none(&ctx.report.strengths);
    let weaknesses = join_or_none(&ctx.report.weaknesses);
    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("untrusted", UNTRUSTED_INPUT_INSTRUCTION),
            ("score", score.as_str()),
            ("verdict", ctx.verdict.as_str()),
            ("strengths", strengths.as_str()),
            ("weaknesses", weaknesses.as_str()),
            ("job_title", ctx.job_title),
            ("company", ctx.company),
        ],
    )
}
