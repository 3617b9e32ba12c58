//! Job payload validation and normalisation, shared by create and update.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::analysis::skills::normalize_skill_set;
use crate::analysis::{build_job_profile, ExperienceLevel};
use crate::errors::AppError;
use crate::jobs::{JobPriority, JobStatus};
use crate::models::job::JobRow;

const TITLE_MAX: usize = 200;
const COMPANY_MAX: usize = 100;
const LOCATION_MAX: usize = 200;
const DESCRIPTION_RANGE: (usize, usize) = (50, 10_000);
const REQUIREMENTS_RANGE: (usize, usize) = (20, 5_000);
const MAX_EXPERIENCE_YEARS: i32 = 50;

/// Request body for POST and PUT. On update, absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct JobPayload {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub skills_required: Option<Vec<String>>,
    pub skills_preferred: Option<Vec<String>>,
    pub experience_level: Option<String>,
    pub experience_years: Option<i32>,
    pub education_required: Option<String>,
    pub certifications_required: Option<Vec<String>>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Column values after validation.
#[derive(Debug, Clone)]
pub struct JobFields {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub requirements: String,
    pub skills_required: Vec<String>,
    pub skills_preferred: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub experience_years: Option<i32>,
    pub education_required: Option<String>,
    pub certifications_required: Vec<String>,
    pub priority: JobPriority,
    pub status: JobStatus,
    pub deadline: Option<DateTime<Utc>>,
}

fn required_text(value: Option<String>, base: Option<&String>, field: &str) -> Result<String, AppError> {
    value
        .or_else(|| base.cloned())
        .map(|v| v.trim().to_string())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn optional_text(value: Option<String>, base: Option<&Option<String>>) -> Option<String> {
    match value {
        Some(v) => Some(v.trim().to_string()).filter(|v| !v.is_empty()),
        None => base.cloned().flatten(),
    }
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::Validation(if min <= 1 {
            format!("{field} must be between 1 and {max} characters")
        } else {
            format!("{field} must be between {min} and {max} characters (got {len})")
        }));
    }
    Ok(())
}

fn parse_field<T: std::str::FromStr<Err = String>>(
    value: Option<String>,
    base: Option<&str>,
    fallback: T,
) -> Result<T, AppError> {
    match value.as_deref().or(base) {
        Some(raw) => raw.parse::<T>().map_err(AppError::Validation),
        None => Ok(fallback),
    }
}

impl JobFields {
    /// Builds validated fields from a payload, on top of `base` for updates.
    pub fn from_payload(payload: JobPayload, base: Option<&JobRow>) -> Result<Self, AppError> {
        let title = required_text(payload.title, base.map(|b| &b.title), "title")?;
        let company = required_text(payload.company, base.map(|b| &b.company), "company")?;
        let description =
            required_text(payload.description, base.map(|b| &b.description), "description")?;
        let requirements =
            required_text(payload.requirements, base.map(|b| &b.requirements), "requirements")?;

        check_len("title", &title, 1, TITLE_MAX)?;
        check_len("company", &company, 1, COMPANY_MAX)?;
        check_len("description", &description, DESCRIPTION_RANGE.0, DESCRIPTION_RANGE.1)?;
        check_len("requirements", &requirements, REQUIREMENTS_RANGE.0, REQUIREMENTS_RANGE.1)?;

        let location = optional_text(payload.location, base.map(|b| &b.location));
        if let Some(loc) = &location {
            check_len("location", loc, 1, LOCATION_MAX)?;
        }

        let experience_years = payload.experience_years.or(base.and_then(|b| b.experience_years));
        if let Some(years) = experience_years {
            if !(0..=MAX_EXPERIENCE_YEARS).contains(&years) {
                return Err(AppError::Validation(format!(
                    "experience_years must be between 0 and {MAX_EXPERIENCE_YEARS}"
                )));
            }
        }

        // Unspecified level on create comes from the text.
        let derived_level = if payload.experience_level.is_none() && base.is_none() {
            build_job_profile(&description, &requirements).experience_level
        } else {
            ExperienceLevel::default()
        };
        let experience_level = parse_field(
            payload.experience_level,
            base.map(|b| b.experience_level.as_str()),
            derived_level,
        )?;
        let priority = parse_field(payload.priority, base.map(|b| b.priority.as_str()), JobPriority::default())?;
        let status = parse_field(payload.status, base.map(|b| b.status.as_str()), JobStatus::default())?;

        let normalize = |value: Option<Vec<String>>, base: Option<&Vec<String>>| -> Vec<String> {
            match value {
                Some(list) => normalize_skill_set(list).into_iter().collect(),
                None => base.cloned().unwrap_or_default(),
            }
        };
        let skills_required = normalize(payload.skills_required, base.map(|b| &b.skills_required));
        let skills_preferred: Vec<String> = normalize(payload.skills_preferred, base.map(|b| &b.skills_preferred))
            .into_iter()
            .filter(|s| !skills_required.contains(s))
            .collect();

        let certifications_required = match payload.certifications_required {
            Some(list) => list
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            None => base.map(|b| b.certifications_required.clone()).unwrap_or_default(),
        };

        Ok(JobFields {
            title,
            company,
            location,
            description,
            requirements,
            skills_required,
            skills_preferred,
            experience_level,
            experience_years,
            education_required: optional_text(
                payload.education_required,
                base.map(|b| &b.education_required),
            ),
            certifications_required,
            priority,
            status,
            deadline: payload.deadline.or(base.and_then(|b| b.deadline)),
        })
    }
}
