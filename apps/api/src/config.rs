use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::scan::scoring::ScoringWeights;

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup fails only on unparsable values or
/// score weights that do not sum to 100.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Extra taxonomy loaded on top of the built-in one; becomes the default.
    pub taxonomy_path: Option<PathBuf>,
    pub max_input_bytes: usize,
    pub scan_timeout_ms: u64,
    pub weights: ScoringWeights,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ScoringWeights::default();
        let weights = ScoringWeights {
            skill_coverage: parse_or(&lookup, "SCORE_WEIGHT_SKILLS", defaults.skill_coverage)?,
            section_completeness: parse_or(
                &lookup,
                "SCORE_WEIGHT_SECTIONS",
                defaults.section_completeness,
            )?,
            clarity: parse_or(&lookup, "SCORE_WEIGHT_CLARITY", defaults.clarity)?,
        };
        weights.validate()?;

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            taxonomy_path: lookup("TAXONOMY_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            max_input_bytes: parse_or(&lookup, "MAX_INPUT_BYTES", 50_000)?,
            scan_timeout_ms: parse_or(&lookup, "SCAN_TIMEOUT_MS", 2_000)?,
            weights,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
