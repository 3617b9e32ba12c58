use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Low,
    Medium,
    High,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Low => "low",
            Verdict::Medium => "medium",
            Verdict::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Verdict::Low),
            "medium" => Some(Verdict::Medium),
            "high" => Some(Verdict::High),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score cut-offs for verdicts. Always `medium <= high <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictThresholds {
    high: u8,
    medium: u8,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            high: 75,
            medium: 40,
        }
    }
}

impl VerdictThresholds {
    pub fn new(high: u8, medium: u8) -> Result<Self> {
        if high > 100 {
            bail!("VERDICT_HIGH_THRESHOLD must be at most 100, got {high}");
        }
        if medium > high {
            bail!("VERDICT_MEDIUM_THRESHOLD ({medium}) must not exceed VERDICT_HIGH_THRESHOLD ({high})");
        }
        Ok(Self { high, medium })
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn medium(&self) -> u8 {
        self.medium
    }

    pub fn verdict_for(&self, score: u8) -> Verdict {
        if score >= self.high {
            Verdict::High
        } else if score >= self.medium {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands() {
        let t = VerdictThresholds::default();
        assert_eq!(t.verdict_for(100), Verdict::High);
        assert_eq!(t.verdict_for(75), Verdict::High);
        assert_eq!(t.verdict_for(74), Verdict::Medium);
        assert_eq!(t.verdict_for(67), Verdict::Medium);
        assert_eq!(t.verdict_for(40), Verdict::Medium);
        assert_eq!(t.verdict_for(39), Verdict::Low);
        assert_eq!(t.verdict_for(0), Verdict::Low);
    }

    #[test]
    fn test_verdict_is_monotonic() {
        for t in [
            VerdictThresholds::default(),
            VerdictThresholds::new(90, 10).unwrap(),
            VerdictThresholds::new(50, 50).unwrap(),
            VerdictThresholds::new(0, 0).unwrap(),
        ] {
            let mut prev = t.verdict_for(0);
            for score in 1..=100u8 {
                let v = t.verdict_for(score);
                assert!(v >= prev, "{t:?}: {score} gave {v} after {prev}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_rejects_inverted_or_out_of_range() {
        assert!(VerdictThresholds::new(40, 75).is_err());
        assert!(VerdictThresholds::new(101, 40).is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::Medium).unwrap(), r#""medium""#);
        assert_eq!(Verdict::parse("high"), Some(Verdict::High));
        assert_eq!(Verdict::parse("HIGH"), None);
    }
}
