//! Feature extraction: pure, stateless text analysis shared by upload and scoring.

pub mod job_profile;
pub mod resume_profile;
pub mod skills;
pub mod text;

pub use job_profile::{build_job_profile, ExperienceLevel, JobProfile};
pub use resume_profile::{build_resume_profile, ResumeProfile};
