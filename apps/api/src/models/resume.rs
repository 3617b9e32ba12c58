#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::{build_resume_profile, ResumeProfile};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub original_filename: String,
    pub s3_key: String,
    pub file_size: i64,
    pub file_format: String,
    #[serde(skip_serializing)]
    pub extracted_text: String,
    pub skills: Vec<String>,
    pub experience_titles: Vec<String>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub parsing_confidence: f64,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl ResumeRow {
    /// Features for scoring. Everything not persisted is re-derived from the
    /// stored text; stored columns win when present.
    pub fn profile(&self) -> ResumeProfile {
        let mut profile = build_resume_profile(&self.extracted_text);
        if !self.skills.is_empty() {
            profile.skills = self.skills.iter().cloned().collect();
        }
        if !self.experience_titles.is_empty() {
            profile.experience_titles = self.experience_titles.clone();
        }
        if !self.education.is_empty() {
            profile.education = self.education.clone();
        }
        if !self.certifications.is_empty() {
            profile.certifications = self.certifications.clone();
        }
        profile
    }
}

/// Column values for a freshly uploaded resume.
pub struct NewResume<'a> {
    pub id: Uuid,
    pub original_filename: &'a str,
    pub s3_key: &'a str,
    pub file_size: i64,
    pub file_format: &'a str,
    pub extracted_text: &'a str,
    pub profile: &'a ResumeProfile,
    pub candidate_name: Option<&'a str>,
    pub candidate_email: Option<&'a str>,
    pub uploaded_by: Uuid,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn resume_row(text: &str, skills: &[&str]) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            original_filename: "cv.txt".into(),
            s3_key: "resumes/x/cv.txt".into(),
            file_size: text.len() as i64,
            file_format: "txt".into(),
            extracted_text: text.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_titles: vec![],
            education: vec![],
            certifications: vec![],
            parsing_confidence: 0.4,
            candidate_name: None,
            candidate_email: None,
            candidate_phone: None,
            uploaded_by: Uuid::new_v4(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_rederives_missing_skills() {
        let row = resume_row("Backend developer with Python, SQL and Docker.", &[]);
        let profile = row.profile();
        assert!(profile.skills.contains("python"));
        assert!(profile.skills.contains("docker"));
    }

    #[test]
    fn test_profile_keeps_stored_skills() {
        let row = resume_row("Backend developer with Python.", &["rust"]);
        let profile = row.profile();
        assert!(profile.skills.contains("rust"));
        assert!(!profile.skills.contains("python"));
    }

    #[test]
    fn test_text_not_serialized() {
        let row = resume_row("secret resume body text", &["go"]);
        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("secret resume body"));
    }
}
