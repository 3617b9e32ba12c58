//! Relevance scoring: pluggable, trait-based scorers that measure a resume against a job.
//!
//! Default: `KeywordRelevanceScorer` (pure-Rust, deterministic, fully testable).
//! `LlmRefinedScorer` wraps it with a bounded model adjustment.
//!
//! `AppState` holds an `Arc<dyn RelevanceScorer>`, chosen at startup from config.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::skills::contains_term;
use crate::analysis::{text, JobProfile, ResumeProfile};
use crate::errors::AppError;

pub const KEYWORD_BACKEND: &str = "keyword";

const REQUIRED_WEIGHT: f64 = 0.7;
const PREFERRED_WEIGHT: f64 = 0.3;
/// Sub-score when the job states no requirement in that dimension.
const NEUTRAL: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Input / output data models (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

/// Everything a scorer needs about one (resume, job) pair.
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub job_title: String,
    pub company: String,
    pub resume_text: String,
    pub job_text: String,
    pub resume: ResumeProfile,
    pub job: JobProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Final score, 0..=100.
    pub score: u8,
    /// Weighted skill overlap before any model adjustment, 0..=100.
    pub keyword_score: u8,
    pub skills_match: f64,
    pub experience_match: f64,
    pub education_match: f64,
    pub certification_match: f64,
    pub matched_skills: Vec<String>,
    /// Required skills first, then preferred.
    pub missing_skills: Vec<String>,
    /// Job certifications the resume does not show.
    #[serde(default)]
    pub missing_certifications: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub ai_analysis: Option<String>,
    pub scorer_backend: String, // "keyword" | model name
    /// True when a model refinement was attempted and failed.
    pub degraded: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching handlers or the
/// orchestrator. Carried in `AppState` as `Arc<dyn RelevanceScorer>`.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, input: &ScoringInput) -> Result<ScoreReport, AppError>;
}

/// Pure keyword/skill overlap scorer. No I/O.
///
/// Headline score = 0.7 × required overlap + 0.3 × preferred overlap, where a
/// lone skill set carries the full weight and a job with no skills falls back
/// to keyword coverage. Experience, education and certification sub-scores are
/// reported alongside but do not move the headline.
pub struct KeywordRelevanceScorer;

#[async_trait]
impl RelevanceScorer for KeywordRelevanceScorer {
    async fn score(&self, input: &ScoringInput) -> Result<ScoreReport, AppError> {
        Ok(compute_keyword_report(input))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core keyword algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_keyword_report(input: &ScoringInput) -> ScoreReport {
    let resume_lower = input.resume_text.to_lowercase();
    let has_skill = |skill: &String| {
        input.resume.skills.contains(skill) || contains_term(&resume_lower, skill)
    };

    let (req_matched, req_missing) = partition(&input.job.required_skills, has_skill);
    let (pref_matched, pref_missing) = partition(&input.job.preferred_skills, has_skill);

    let required = ratio(req_matched.len(), input.job.required_skills.len());
    let preferred = ratio(pref_matched.len(), input.job.preferred_skills.len());

    let (skills_match, matched_skills, missing_skills) = match (required, preferred) {
        (Some(r), Some(p)) => (
            REQUIRED_WEIGHT * r + PREFERRED_WEIGHT * p,
            concat(req_matched, pref_matched),
            concat(req_missing, pref_missing),
        ),
        (Some(r), None) => (r, req_matched, req_missing),
        (None, Some(p)) => (p, pref_matched, pref_missing),
        (None, None) => keyword_coverage(input),
    };

    let experience_match = experience_match(&input.resume, &input.job);
    let education_match = education_match(&input.resume, &input.job);
    let (certification_match, missing_certifications) =
        certification_match(&input.resume, &input.job);

    let keyword_score = to_score(skills_match * 100.0);

    let mut report = ScoreReport {
        score: keyword_score,
        keyword_score,
        skills_match: round2(skills_match),
        experience_match: round2(experience_match),
        education_match: round2(education_match),
        certification_match: round2(certification_match),
        matched_skills,
        missing_skills,
        missing_certifications,
        strengths: vec![],
        weaknesses: vec![],
        ai_analysis: None,
        scorer_backend: KEYWORD_BACKEND.to_string(),
        degraded: false,
    };
    report.strengths = strengths(&report, &input.resume, &input.job);
    report.weaknesses = weaknesses(&report, &input.resume, &input.job);
    report
}

/// Rounds and clamps a raw value onto the 0..=100 integer scale.
pub fn to_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn round2(v: f64) -> f64 {
    (v.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

fn ratio(hit: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| hit as f64 / total as f64)
}

fn partition(
    skills: &BTreeSet<String>,
    has_skill: impl Fn(&String) -> bool,
) -> (Vec<String>, Vec<String>) {
    skills.iter().cloned().partition(|s| has_skill(s))
}

fn concat(mut a: Vec<String>, b: Vec<String>) -> Vec<String> {
    a.extend(b);
    a
}

/// Share of the job's top keywords that appear anywhere in the resume.
fn keyword_coverage(input: &ScoringInput) -> (f64, Vec<String>, Vec<String>) {
    let resume_tokens: BTreeSet<String> = text::tokenize(&input.resume_text).into_iter().collect();
    let (hit, miss): (Vec<String>, Vec<String>) = input
        .job
        .keywords
        .iter()
        .cloned()
        .partition(|kw| resume_tokens.contains(kw));
    let coverage = ratio(hit.len(), input.job.keywords.len()).unwrap_or(0.0);
    (coverage, hit, miss)
}

fn experience_match(resume: &ResumeProfile, job: &JobProfile) -> f64 {
    let level = resume.experience_level().fit_against(job.experience_level);
    let years = match job.experience_years {
        None | Some(0) => 1.0,
        Some(required) => (resume.effective_years() as f64 / required as f64).min(1.0),
    };
    0.6 * level + 0.4 * years
}

/// 4 = doctorate, 3 = master, 2 = bachelor, 1 = diploma/associate.
pub fn degree_rank(degree: &str) -> u8 {
    let d = degree.to_lowercase().replace('.', "");
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| d.starts_with(p));
    if starts(&["phd", "doctor"]) {
        4
    } else if starts(&["master", "ms", "msc", "mba", "mtech", "me"]) {
        3
    } else if starts(&["bachelor", "bs", "bsc", "btech", "be"]) {
        2
    } else {
        1
    }
}

fn education_match(resume: &ResumeProfile, job: &JobProfile) -> f64 {
    let Some(required) = job.education.as_deref() else {
        return NEUTRAL;
    };
    let needed = degree_rank(required);
    let best = resume.education.iter().map(|d| degree_rank(d)).max();
    match best {
        Some(rank) if rank >= needed => 1.0,
        _ => 0.0,
    }
}

/// Share of job certifications held, and the ones that are not.
fn certification_match(resume: &ResumeProfile, job: &JobProfile) -> (f64, Vec<String>) {
    if job.certifications.is_empty() {
        return (NEUTRAL, vec![]);
    }
    let held: Vec<String> = resume.certifications.iter().map(|c| c.to_lowercase()).collect();
    let missing: Vec<String> = job
        .certifications
        .iter()
        .filter(|wanted| {
            let wanted = wanted.to_lowercase();
            !held.iter().any(|h| h.contains(&wanted) || wanted.contains(h.as_str()))
        })
        .cloned()
        .collect();
    let hits = job.certifications.len() - missing.len();
    (hits as f64 / job.certifications.len() as f64, missing)
}

fn strengths(report: &ScoreReport, resume: &ResumeProfile, job: &JobProfile) -> Vec<String> {
    let mut out = Vec::new();
    if !job.required_skills.is_empty()
        && job.required_skills.iter().all(|s| report.matched_skills.contains(s))
    {
        out.push(format!(
            "Covers all {} required skills",
            job.required_skills.len()
        ));
    } else if report.matched_skills.len() >= 3 {
        out.push(format!(
            "Strong technical skills match ({} skills)",
            report.matched_skills.len()
        ));
    }
    if resume.experience_titles.len() > 3 {
        out.push(format!(
            "Extensive work experience ({} positions)",
            resume.experience_titles.len()
        ));
    }
    if job.experience_years.is_some() && report.experience_match >= 0.8 {
        out.push("Experience level fits the role".to_string());
    }
    if job.education.is_some() && report.education_match >= 1.0 {
        out.push("Meets the education requirement".to_string());
    }
    if !resume.certifications.is_empty() {
        out.push(format!(
            "Relevant certifications ({} certs)",
            resume.certifications.len()
        ));
    }
    out
}

fn weaknesses(report: &ScoreReport, resume: &ResumeProfile, job: &JobProfile) -> Vec<String> {
    let mut out = Vec::new();
    if !report.missing_skills.is_empty() && job.has_skills() {
        let top: Vec<&str> = report.missing_skills.iter().take(3).map(String::as_str).collect();
        out.push(format!("Missing key skills: {}", top.join(", ")));
    }
    if let Some(years) = job.experience_years {
        if resume.effective_years() < years {
            out.push(format!("May lack required experience ({years} years)"));
        }
    }
    if let Some(degree) = &job.education {
        if report.education_match < 1.0 {
            out.push(format!("Education requirement not evidenced ({degree})"));
        }
    }
    if !report.missing_certifications.is_empty() {
        out.push(format!(
            "Missing certifications: {}",
            report.missing_certifications.join(", ")
        ));
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn skill_set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    pub(crate) fn input_with(resume_skills: &[&str], required: &[&str], preferred: &[&str]) -> ScoringInput {
        ScoringInput {
            job_title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            resume_text: resume_skills.join(", "),
            job_text: required.join(", "),
            resume: ResumeProfile {
                skills: skill_set(resume_skills),
                ..Default::default()
            },
            job: JobProfile {
                required_skills: skill_set(required),
                preferred_skills: skill_set(preferred),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_two_of_three_required_is_67() {
        let input = input_with(&["python", "sql"], &["python", "sql", "aws"], &[]);
        let report = KeywordRelevanceScorer.score(&input).await.unwrap();
        assert_eq!(report.score, 67);
        assert_eq!(report.keyword_score, 67);
        assert_eq!(report.matched_skills, vec!["python", "sql"]);
        assert_eq!(report.missing_skills, vec!["aws"]);
        assert!(!report.degraded);
        assert_eq!(report.scorer_backend, "keyword");
        assert!(report.weaknesses.iter().any(|w| w.contains("aws")));
    }

    #[test]
    fn test_identical_sets_score_100() {
        let report = compute_keyword_report(&input_with(
            &["rust", "docker"],
            &["rust"],
            &["docker"],
        ));
        assert_eq!(report.score, 100);
        assert!(report.missing_skills.is_empty());
    }

    #[test]
    fn test_disjoint_sets_score_0() {
        let report = compute_keyword_report(&input_with(&["java"], &["go", "rust"], &["kafka"]));
        assert_eq!(report.score, 0);
        assert!(report.matched_skills.is_empty());
    }

    #[test]
    fn test_required_and_preferred_weights() {
        // required 1/2 → 0.35, preferred 1/1 → 0.3
        let report = compute_keyword_report(&input_with(
            &["python", "docker"],
            &["python", "aws"],
            &["docker"],
        ));
        assert_eq!(report.score, 65);
        assert_eq!(report.missing_skills, vec!["aws"]);
    }

    #[test]
    fn test_preferred_only_carries_full_weight() {
        let report = compute_keyword_report(&input_with(&["docker"], &[], &["docker", "aws"]));
        assert_eq!(report.score, 50);
    }

    #[test]
    fn test_keyword_coverage_when_job_has_no_skills() {
        let mut input = input_with(&[], &[], &[]);
        input.resume_text = "Managed payroll and invoicing for retail stores".to_string();
        input.job.keywords = vec!["payroll".into(), "invoicing".into(), "forklift".into(), "retail".into()];
        let report = compute_keyword_report(&input);
        assert_eq!(report.score, 75);
        assert_eq!(report.missing_skills, vec!["forklift"]);
    }

    #[test]
    fn test_empty_everything_scores_0() {
        let report = compute_keyword_report(&input_with(&[], &[], &[]));
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_skill_in_text_but_not_dictionary_counts() {
        let mut input = input_with(&["java"], &["java", "spring boot"], &[]);
        input.resume_text = "Five years of Java and Spring Boot".to_string();
        assert_eq!(compute_keyword_report(&input).score, 100);
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(to_score(-12.0), 0);
        assert_eq!(to_score(140.2), 100);
        assert_eq!(to_score(66.6667), 67);
        assert_eq!(to_score(f64::NAN), 0);
    }

    #[test]
    fn test_sub_scores_in_unit_range() {
        let mut input = input_with(&["python"], &["python"], &[]);
        input.job.experience_years = Some(10);
        input.job.education = Some("Master of Science".into());
        input.job.certifications = vec!["AWS Certified".into()];
        input.resume.education = vec!["Bachelor of Science".into()];
        let report = compute_keyword_report(&input);
        for v in [
            report.skills_match,
            report.experience_match,
            report.education_match,
            report.certification_match,
        ] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert_eq!(report.education_match, 0.0);
        assert_eq!(report.certification_match, 0.0);
        assert!(report.weaknesses.iter().any(|w| w.contains("10 years")));
    }

    #[test]
    fn test_missing_certifications_listed() {
        let mut input = input_with(&["python"], &["python"], &[]);
        input.job.certifications = vec!["AWS Certified Solutions Architect".into(), "PMP".into()];
        input.resume.certifications = vec!["aws certified solutions architect".into()];
        let report = compute_keyword_report(&input);
        assert_eq!(report.missing_certifications, vec!["PMP"]);
        assert_eq!(report.certification_match, 0.5);
        assert!(report.weaknesses.contains(&"Missing certifications: PMP".to_string()));
    }

    #[test]
    fn test_degree_rank_order() {
        assert!(degree_rank("PhD") > degree_rank("Master of Science"));
        assert!(degree_rank("M.Sc") > degree_rank("B.Tech"));
        assert!(degree_rank("Bachelor of Arts") > degree_rank("Diploma in Engineering"));
    }
}
