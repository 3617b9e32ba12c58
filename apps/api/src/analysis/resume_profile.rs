//! Resume feature extraction: contact details, skills, titles, education, certifications.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::job_profile::ExperienceLevel;
use crate::analysis::{skills, text};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid email regex")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b")
        .expect("Invalid phone regex")
});

static JOB_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:senior|lead|principal|staff|junior|sr\.?|jr\.?)\s+)?(?:software|web|mobile|data|devops|cloud|ai|ml|full[\s-]?stack|front[\s-]?end|back[\s-]?end|platform|qa)\s+(?:engineer|developer|architect|analyst|scientist|specialist)\b|\b(?:engineering|product|project)\s+manager\b|\b(?:intern|trainee)\b",
    )
    .expect("Invalid job title regex")
});

pub(crate) static DEGREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:bachelor(?:'s)?|master(?:'s)?|phd|doctorate|diploma|associate)\s+(?:degree\s+)?(?:of|in)?\s*(?:science|arts|engineering|technology|computer\s+science|business|management|mathematics)\b|\b(?:b\.?sc?|m\.?sc?|b\.?tech|m\.?tech|ph\.?d|m\.?b\.?a|b\.e|m\.e)\b\.?",
    )
    .expect("Invalid degree regex")
});

pub(crate) static CERTIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:aws|azure|gcp|google cloud|microsoft|oracle|cisco|comptia|scrum|kubernetes)\s+certified(?:\s+[a-z]+){0,3}|\bcertified\s+(?:kubernetes|scrum|aws|azure|cloud)(?:\s+[a-z]+){0,2}|\b(?:pmp|cissp|cisa|cism|itil|prince2|six sigma|ckad|cka)\b",
    )
    .expect("Invalid certification regex")
});

static YEARS_OF_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\+?\s*(?:years?|yrs?)\s+(?:of\s+)?(?:professional\s+|industry\s+|work\s+)?experience")
        .expect("Invalid experience regex")
});

const MAX_TITLES: usize = 10;
const MAX_EDUCATION: usize = 5;
const KEYWORD_LIMIT: usize = 20;

/// Structured features extracted from resume text. Deterministic for a given input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub candidate_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: BTreeSet<String>,
    pub experience_titles: Vec<String>,
    pub experience_years: Option<u32>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub keywords: Vec<String>,
    /// 0.2 per present signal (email, phone, skills, experience, education).
    pub confidence: f64,
}

impl ResumeProfile {
    /// Seniority implied by the job titles on the resume.
    pub fn experience_level(&self) -> ExperienceLevel {
        let titles = self.experience_titles.join(" ").to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| skills::contains_term(&titles, w));

        if has(&["lead", "principal", "staff", "architect", "manager", "director"]) {
            ExperienceLevel::Lead
        } else if has(&["senior", "sr", "sr."]) {
            ExperienceLevel::Senior
        } else if has(&["junior", "jr", "jr.", "intern", "trainee"]) {
            ExperienceLevel::Entry
        } else {
            match self.effective_years() {
                y if y >= 8 => ExperienceLevel::Lead,
                y if y >= 5 => ExperienceLevel::Senior,
                y if y >= 2 => ExperienceLevel::Mid,
                _ => ExperienceLevel::Entry,
            }
        }
    }

    /// Stated years, or two years per listed position when none are stated.
    pub fn effective_years(&self) -> u32 {
        self.experience_years
            .unwrap_or_else(|| (self.experience_titles.len() as u32 * 2).min(20))
    }
}

pub fn build_resume_profile(raw: &str) -> ResumeProfile {
    let cleaned = text::clean_text(raw);

    let email = EMAIL.find(raw).map(|m| m.as_str().to_string());
    let phone = PHONE.find(raw).map(|m| m.as_str().trim().to_string());
    let skills = skills::extract_skills(&cleaned);
    let experience_titles = collect_unique(&JOB_TITLE, &cleaned, MAX_TITLES);
    let education = collect_unique(&DEGREE, &cleaned, MAX_EDUCATION);
    let certifications = collect_unique(&CERTIFICATION, &cleaned, usize::MAX);

    let experience_years = YEARS_OF_EXPERIENCE
        .captures_iter(&cleaned)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .filter(|y| *y <= 50)
        .max();

    let signals = [
        email.is_some(),
        phone.is_some(),
        !skills.is_empty(),
        !experience_titles.is_empty(),
        !education.is_empty(),
    ];
    let confidence = (signals.iter().filter(|s| **s).count() as f64 * 0.2).min(1.0);

    ResumeProfile {
        candidate_name: guess_name(raw),
        email,
        phone,
        skills,
        experience_titles,
        experience_years,
        education,
        certifications,
        keywords: text::extract_keywords(&cleaned, KEYWORD_LIMIT),
        confidence: (confidence * 10.0).round() / 10.0,
    }
}

/// First short line made only of letters: resumes almost always open with the name.
fn guess_name(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(5)
        .find(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            (2..=4).contains(&words.len())
                && words.iter().all(|w| {
                    w.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'' || c == '.')
                        && w.chars().next().is_some_and(char::is_uppercase)
                })
        })
        .map(str::to_string)
}

pub(crate) fn collect_unique(pattern: &Regex, haystack: &str, limit: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for m in pattern.find_iter(haystack) {
        let value = m.as_str().trim().trim_end_matches('.').to_string();
        if seen.insert(value.to_lowercase()) {
            out.push(value);
            if out.len() >= limit {
                break;
            }
        }
    }
    out
}
