use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::{build_job_profile, ExperienceLevel, JobProfile};
use crate::analysis::skills::normalize_skill_set;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub requirements: String,
    pub skills_required: Vec<String>,
    pub skills_preferred: Vec<String>,
    pub experience_level: String,
    pub experience_years: Option<i32>,
    pub education_required: Option<String>,
    pub certifications_required: Vec<String>,
    pub priority: String,
    pub status: String,
    pub deadline: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRow {
    /// Text used for keyword coverage and the AI prompt.
    pub fn full_text(&self) -> String {
        format!("{}\n\n{}", self.description, self.requirements)
    }

    /// Job features for scoring. Stored skill sets win; empty sets are
    /// derived from the description and requirements.
    pub fn profile(&self) -> JobProfile {
        let mut profile = build_job_profile(&self.description, &self.requirements);

        if !self.skills_required.is_empty() || !self.skills_preferred.is_empty() {
            let required = normalize_skill_set(&self.skills_required);
            profile.preferred_skills = normalize_skill_set(&self.skills_preferred)
                .into_iter()
                .filter(|s| !required.contains(s))
                .collect();
            profile.required_skills = required;
        }
        if let Ok(level) = self.experience_level.parse::<ExperienceLevel>() {
            profile.experience_level = level;
        }
        if let Some(years) = self.experience_years.and_then(|y| u32::try_from(y).ok()) {
            profile.experience_years = Some(years);
        }
        if self.education_required.is_some() {
            profile.education = self.education_required.clone();
        }
        if !self.certifications_required.is_empty() {
            profile.certifications = self.certifications_required.clone();
        }
        profile
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn job_row(required: &[&str], preferred: &[&str]) -> JobRow {
        let now = Utc::now();
        JobRow {
            id: Uuid::new_v4(),
            title: "Data Engineer".into(),
            company: "Acme".into(),
            location: None,
            description: "We are hiring a data engineer to build reliable pipelines for analytics and reporting teams."
                .into(),
            requirements: "Required: Python, SQL and AWS. Nice to have: Docker.".into(),
            skills_required: required.iter().map(|s| s.to_string()).collect(),
            skills_preferred: preferred.iter().map(|s| s.to_string()).collect(),
            experience_level: "mid".into(),
            experience_years: None,
            education_required: None,
            certifications_required: vec![],
            priority: "medium".into(),
            status: "active".into(),
            deadline: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stored_skills_take_precedence() {
        let job = job_row(&["Python", "Postgres"], &["python", "k8s"]);
        let profile = job.profile();
        assert!(profile.required_skills.contains("postgresql"));
        assert!(profile.preferred_skills.contains("kubernetes"));
        assert!(!profile.preferred_skills.contains("python"));
    }

    #[test]
    fn test_empty_skills_are_derived_from_text() {
        let profile = job_row(&[], &[]).profile();
        assert!(profile.required_skills.contains("python"));
        assert!(profile.required_skills.contains("aws"));
        assert!(profile.preferred_skills.contains("docker"));
    }
}
