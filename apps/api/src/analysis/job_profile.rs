//! Job description analysis: required vs preferred skills, seniority, years,
//! education and certification requirements.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::resume_profile::{collect_unique, CERTIFICATION, DEGREE};
use crate::analysis::{skills, text};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
        }
    }

    /// How well a candidate at `self` fits a role asking for `required`.
    pub fn fit_against(&self, required: ExperienceLevel) -> f64 {
        use ExperienceLevel::*;
        match (*self, required) {
            (a, b) if a == b => 1.0,
            (Entry, Mid) => 0.6,
            (Entry, Senior) => 0.3,
            (Entry, Lead) => 0.2,
            (Mid, Entry) => 0.7,
            (Mid, Senior) => 0.7,
            (Mid, Lead) => 0.5,
            (Senior, Entry) => 0.4,
            (Senior, Mid) => 0.8,
            (Senior, Lead) => 0.8,
            (Lead, Entry) => 0.2,
            (Lead, Mid) => 0.5,
            (Lead, Senior) => 0.8,
            _ => 0.5,
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" => Ok(ExperienceLevel::Entry),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            "lead" => Ok(ExperienceLevel::Lead),
            other => Err(format!(
                "experience_level must be one of entry, mid, senior, lead (got '{other}')"
            )),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static REQUIRED_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:required|must have|must-have|essential|mandatory)\b\s*:?\s*([^.\n]{2,120})")
        .expect("Invalid required-clause regex")
});

static PREFERRED_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:preferred|nice to have|nice-to-have|bonus|plus)\b\s*:?\s*([^.\n]{2,120})")
        .expect("Invalid preferred-clause regex")
});

/// "Kafka experience is a plus" puts the skill before the marker.
static TRAILING_PLUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([^.\n:]{2,80}?)\s+(?:is\s+|are\s+|would be\s+)?a\s+(?:big\s+)?plus\b")
        .expect("Invalid trailing-plus regex")
});

static YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:-\s*\d{1,2}\s*)?(?:years?|yrs?)\b")
        .expect("Invalid years regex")
});

const KEYWORD_LIMIT: usize = 20;

/// Structured requirements derived from a job's description and requirements text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobProfile {
    pub required_skills: BTreeSet<String>,
    pub preferred_skills: BTreeSet<String>,
    pub experience_level: ExperienceLevel,
    pub experience_years: Option<u32>,
    pub education: Option<String>,
    pub certifications: Vec<String>,
    pub keywords: Vec<String>,
}

impl JobProfile {
    pub fn has_skills(&self) -> bool {
        !self.required_skills.is_empty() || !self.preferred_skills.is_empty()
    }
}

pub fn build_job_profile(description: &str, requirements: &str) -> JobProfile {
    let full = format!("{description}\n\n{requirements}");

    // Preferred clauses are cut out before the dictionary pass, otherwise every
    // preferred skill would also land in the required set.
    let mut preferred_spans: Vec<(usize, usize)> = Vec::new();
    let mut preferred_skills = BTreeSet::new();
    for caps in PREFERRED_CLAUSE.captures_iter(&full) {
        if let Some(m) = caps.get(0) {
            preferred_spans.push((m.start(), m.end()));
        }
        if let Some(clause) = caps.get(1) {
            preferred_skills.extend(clause_skills(clause.as_str()));
        }
    }
    for caps in TRAILING_PLUS.captures_iter(&full) {
        if let Some(m) = caps.get(0) {
            preferred_spans.push((m.start(), m.end()));
        }
        if let Some(clause) = caps.get(1) {
            preferred_skills.extend(skills::extract_skills(clause.as_str()));
        }
    }

    let mut required_text = String::with_capacity(full.len());
    let mut cursor = 0;
    preferred_spans.sort_unstable();
    for (start, end) in preferred_spans {
        if start > cursor {
            required_text.push_str(&full[cursor..start]);
            required_text.push('\n');
        }
        cursor = cursor.max(end);
    }
    if cursor < full.len() {
        required_text.push_str(&full[cursor..]);
    }

    let mut required_skills = skills::extract_skills(&required_text);
    for caps in REQUIRED_CLAUSE.captures_iter(&required_text) {
        if let Some(clause) = caps.get(1) {
            required_skills.extend(clause_skills(clause.as_str()));
        }
    }
    preferred_skills.retain(|s| !required_skills.contains(s));

    let cleaned = text::clean_text(&full);
    let experience_years = YEARS
        .captures_iter(&cleaned)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .find(|y| *y <= 20);

    JobProfile {
        required_skills,
        preferred_skills,
        experience_level: detect_level(&cleaned, experience_years),
        experience_years,
        education: DEGREE
            .find(&cleaned)
            .map(|m| m.as_str().trim().trim_end_matches('.').to_string()),
        certifications: collect_unique(&CERTIFICATION, &cleaned, usize::MAX),
        keywords: text::extract_keywords(&cleaned, KEYWORD_LIMIT),
    }
}

/// Skills named in a "Required: a, b and c" style clause. Dictionary hits plus
/// short comma-separated items so recruiter-specific skills (e.g. "spring boot")
/// are not lost.
fn clause_skills(clause: &str) -> BTreeSet<String> {
    let mut found = skills::extract_skills(clause);
    for item in clause.split([',', ';']).flat_map(|part| part.split(" and ")) {
        let item = skills::normalize_skill(item);
        let words: Vec<&str> = item.split_whitespace().collect();
        let plausible = (1..=3).contains(&words.len())
            && words.iter().all(|w| {
                !text::is_stop_word(w)
                    && w.chars().next().is_some_and(char::is_alphabetic)
                    && w.chars().count() > 1
            })
            && !words.iter().any(|w| NON_SKILL_WORDS.contains(w));
        if plausible {
            found.insert(item);
        }
    }
    found
}

/// Words that show up in requirement clauses but never name a skill.
const NON_SKILL_WORDS: &[&str] = &[
    "ability", "background", "degree", "experience", "experienced", "familiarity", "knowledge",
    "proficiency", "skills", "strong", "understanding", "years", "excellent", "good",
    "proven", "solid",
];

fn detect_level(cleaned: &str, years: Option<u32>) -> ExperienceLevel {
    let lower = cleaned.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| skills::contains_term(&lower, w));

    if has(&["principal", "staff engineer", "architect", "director", "head of", "tech lead"]) {
        ExperienceLevel::Lead
    } else if has(&["senior", "sr."]) {
        ExperienceLevel::Senior
    } else if has(&["entry level", "entry-level", "junior", "trainee", "intern", "graduate"]) {
        ExperienceLevel::Entry
    } else if has(&["mid level", "mid-level", "intermediate"]) {
        ExperienceLevel::Mid
    } else {
        match years {
            Some(y) if y >= 8 => ExperienceLevel::Lead,
            Some(y) if y >= 5 => ExperienceLevel::Senior,
            Some(y) if y < 2 => ExperienceLevel::Entry,
            _ => ExperienceLevel::Mid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTERPRISE_JD: &str = "Software Engineer - Platform Team. Join our collaborative team \
        building a microservices platform for payments.";
    const ENTERPRISE_REQ: &str = "Required: Java, Spring Boot, SQL. Preferred: Kubernetes, Terraform. \
        3+ years of experience. Bachelor of Science in Computer Science.";

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_required_and_preferred_split() {
        let p = build_job_profile(ENTERPRISE_JD, ENTERPRISE_REQ);
        assert!(p.required_skills.contains("java"));
        assert!(p.required_skills.contains("spring boot"));
        assert!(p.required_skills.contains("sql"));
        assert!(p.required_skills.contains("microservices"));
        assert_eq!(p.preferred_skills, set(&["kubernetes", "terraform"]));
    }

    #[test]
    fn test_preferred_never_in_required() {
        let p = build_job_profile(
            "Python developer wanted. Docker is a plus.",
            "Must have: Python, Docker. Nice to have: Docker, AWS.",
        );
        assert!(p.required_skills.contains("docker"));
        assert!(p.preferred_skills.contains("aws"));
        assert!(p.required_skills.is_disjoint(&p.preferred_skills));
    }

    #[test]
    fn test_trailing_plus_is_preferred() {
        let p = build_job_profile("Rust engineer. Kafka experience is a plus.", "Required: Rust.");
        assert!(p.preferred_skills.contains("kafka"));
        assert!(!p.required_skills.contains("kafka"));
    }

    #[test]
    fn test_years_and_level() {
        let p = build_job_profile(ENTERPRISE_JD, ENTERPRISE_REQ);
        assert_eq!(p.experience_years, Some(3));
        assert_eq!(p.experience_level, ExperienceLevel::Mid);

        let p = build_job_profile("Senior Data Scientist", "5+ years with Python");
        assert_eq!(p.experience_level, ExperienceLevel::Senior);
        assert_eq!(p.experience_years, Some(5));
    }

    #[test]
    fn test_education_requirement() {
        let p = build_job_profile(ENTERPRISE_JD, ENTERPRISE_REQ);
        assert_eq!(p.education.as_deref(), Some("Bachelor of Science"));
    }

    #[test]
    fn test_clause_skills_filter_noise() {
        let found = clause_skills("strong knowledge of distributed systems, Go and Redis");
        assert!(found.contains("go"));
        assert!(found.contains("redis"));
        assert!(!found.iter().any(|s| s.contains("knowledge")));
    }

    #[test]
    fn test_level_parse_and_fit() {
        assert_eq!("Senior".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Senior);
        assert!("guru".parse::<ExperienceLevel>().is_err());
        assert_eq!(ExperienceLevel::Mid.fit_against(ExperienceLevel::Mid), 1.0);
        assert!(
            ExperienceLevel::Entry.fit_against(ExperienceLevel::Lead)
                < ExperienceLevel::Senior.fit_against(ExperienceLevel::Lead)
        );
    }

    #[test]
    fn test_empty_job_has_no_skills() {
        let p = build_job_profile("", "");
        assert!(!p.has_skills());
        assert!(p.keywords.is_empty());
    }
}
