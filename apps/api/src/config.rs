use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::scoring::verdict::VerdictThresholds;

/// 16 MiB, the upload cap carried over from the original deployment.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Absent key disables the AI refinement and feedback passes.
    pub openai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_timeout: Duration,
    pub ai_prompt_char_budget: usize,
    pub parsing_timeout: Duration,
    pub max_upload_bytes: usize,
    pub batch_evaluation_limit: usize,
    pub verdict_thresholds: VerdictThresholds,
    pub session_ttl_hours: i64,
    /// Browser origins allowed to call the API with credentials. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let verdict_thresholds = VerdictThresholds::new(
            parse_env("VERDICT_HIGH_THRESHOLD", 75)?,
            parse_env("VERDICT_MEDIUM_THRESHOLD", 40)?,
        )?;

        let max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        if max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            ai_model: std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            ai_timeout: Duration::from_secs(parse_env("AI_TIMEOUT_SECS", 15)?),
            ai_prompt_char_budget: parse_env("AI_PROMPT_CHAR_BUDGET", 4000)?,
            parsing_timeout: Duration::from_secs(parse_env("PARSING_TIMEOUT_SECS", 60)?),
            max_upload_bytes,
            batch_evaluation_limit: parse_env("BATCH_EVALUATION_LIMIT", 50)?,
            verdict_thresholds,
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 24)?,
            cors_allowed_origins: parse_origin_list(
                &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            )?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Comma-separated `scheme://host[:port]` origins; blanks are skipped.
fn parse_origin_list(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|origin| {
            let valid = (origin.starts_with("http://") || origin.starts_with("https://"))
                && !origin.ends_with('/')
                && origin.is_ascii();
            if !valid {
                bail!("CORS_ALLOWED_ORIGINS entry '{origin}' must look like https://host[:port]");
            }
            Ok(origin.to_string())
        })
        .collect()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_list() {
        assert!(parse_origin_list("").unwrap().is_empty());
        assert_eq!(
            parse_origin_list(" https://dash.example.com , http://localhost:3000,").unwrap(),
            vec!["https://dash.example.com", "http://localhost:3000"]
        );
        assert!(parse_origin_list("dash.example.com").is_err());
        assert!(parse_origin_list("https://dash.example.com/").is_err());
    }
}
