use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::analysis::text::truncate_chars;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, UNTRUSTED_INPUT_INSTRUCTION};
use crate::llm_client::{complete_json, ChatModel, LlmError};
use crate::scoring::prompts::{REFINE_PROMPT_TEMPLATE, REFINE_SYSTEM};
use crate::scoring::relevance::{
    compute_keyword_report, to_score, RelevanceScorer, ScoreReport, ScoringInput,
};

pub const MAX_ADJUSTMENT: i32 = 15;

#[derive(Debug, Deserialize)]
struct Refinement {
    adjustment: f64,
    analysis: String,
}

/// Keyword scorer plus a bounded model adjustment in [-15, 15].
///
/// Any model failure or timeout yields the keyword report with
/// `degraded = true`; scoring itself never fails because of the model.
pub struct LlmRefinedScorer {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
    prompt_char_budget: usize,
}

impl LlmRefinedScorer {
    pub fn new(model: Arc<dyn ChatModel>, timeout: Duration, prompt_char_budget: usize) -> Self {
        Self {
            model,
            timeout,
            prompt_char_budget,
        }
    }

    fn build_prompt(&self, input: &ScoringInput, report: &ScoreReport) -> String {
        // Half the budget each; the job text is usually the shorter one.
        let half = self.prompt_char_budget / 2;
        let keyword_score = report.keyword_score.to_string();
        let matched = report.matched_skills.join(", ");
        let missing = report.missing_skills.join(", ");
        fill_template(
            REFINE_PROMPT_TEMPLATE,
            &[
                ("untrusted", UNTRUSTED_INPUT_INSTRUCTION),
                ("job_title", input.job_title.as_str()),
                ("company", input.company.as_str()),
                ("keyword_score", keyword_score.as_str()),
                ("matched", matched.as_str()),
                ("missing", missing.as_str()),
                ("job_text", truncate_chars(&input.job_text, half)),
                ("resume_text", truncate_chars(&input.resume_text, half)),
            ],
        )
    }

    async fn refine(&self, prompt: &str) -> Result<Refinement, LlmError> {
        match tokio::time::timeout(
            self.timeout,
            complete_json::<Refinement>(self.model.as_ref(), prompt, REFINE_SYSTEM),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl RelevanceScorer for LlmRefinedScorer {
    async fn score(&self, input: &ScoringInput) -> Result<ScoreReport, AppError> {
        let mut report = compute_keyword_report(input);
        let prompt = self.build_prompt(input, &report);

        match self.refine(&prompt).await {
            Ok(refinement) => {
                let adjustment = (refinement.adjustment.round() as i32)
                    .clamp(-MAX_ADJUSTMENT, MAX_ADJUSTMENT);
                debug!(
                    "Model adjusted keyword score {} by {adjustment}",
                    report.keyword_score
                );
                report.score = to_score(f64::from(report.keyword_score) + f64::from(adjustment));
                let analysis = refinement.analysis.trim();
                report.ai_analysis = (!analysis.is_empty()).then(|| analysis.to_string());
                report.scorer_backend = self.model.model_name().to_string();
            }
            Err(e) => {
                warn!("AI refinement unavailable, using keyword score: {e}");
                report.degraded = true;
            }
        }

        Ok(report)
    }
}
