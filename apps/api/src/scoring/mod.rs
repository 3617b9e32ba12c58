pub mod llm_refine;
pub mod prompts;
pub mod relevance;
pub mod verdict;

pub use llm_refine::LlmRefinedScorer;
pub use relevance::{KeywordRelevanceScorer, RelevanceScorer, ScoreReport, ScoringInput};
pub use verdict::{Verdict, VerdictThresholds};
