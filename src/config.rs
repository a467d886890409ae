//! Environment-driven configuration.
//!
//! Every knob has a default matching the survey range the toolkit was built
//! around (2015-01-01 through 2024-10-31, window 30, period 252, 30 lags),
//! so a bare run works out of the box and `.env` or the environment can
//! override any of it.

use crate::application::pipeline::AnalysisSettings;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PRICE_API_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Which retrieval collaborator backs the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Live chart API.
    Yahoo,
    /// Seeded offline generator.
    Synthetic,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(SourceKind::Yahoo),
            "synthetic" => Ok(SourceKind::Synthetic),
            _ => anyhow::bail!("Invalid DATA_SOURCE: {}. Must be 'yahoo' or 'synthetic'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceKind,
    pub price_api_base_url: String,
    pub data_dir: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rolling_window: usize,
    pub decomposition_period: usize,
    pub correlation_lags: usize,
    pub z_score_threshold: f64,
    pub var_confidence: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let source = env::var("DATA_SOURCE")
            .unwrap_or_else(|_| "yahoo".to_string())
            .parse::<SourceKind>()?;
        let price_api_base_url = env::var("PRICE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PRICE_API_BASE_URL.to_string());
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let start_date = parse_date_var("ANALYSIS_START_DATE", "2015-01-01")?;
        let end_date = parse_date_var("ANALYSIS_END_DATE", "2024-10-31")?;
        let rolling_window = parse_var("ROLLING_WINDOW", 30usize)?;
        let decomposition_period = parse_var("DECOMPOSITION_PERIOD", 252usize)?;
        let correlation_lags = parse_var("CORRELATION_LAGS", 30usize)?;
        let z_score_threshold = parse_var("Z_SCORE_THRESHOLD", 3.0f64)?;
        let var_confidence = parse_var("VAR_CONFIDENCE", 0.99f64)?;

        if start_date >= end_date {
            anyhow::bail!(
                "ANALYSIS_START_DATE {} must be before ANALYSIS_END_DATE {}",
                start_date,
                end_date
            );
        }
        if rolling_window == 0 {
            anyhow::bail!("ROLLING_WINDOW must be at least 1");
        }
        if decomposition_period < 2 {
            anyhow::bail!("DECOMPOSITION_PERIOD must be at least 2");
        }
        if correlation_lags == 0 {
            anyhow::bail!("CORRELATION_LAGS must be at least 1");
        }
        if z_score_threshold <= 0.0 {
            anyhow::bail!("Z_SCORE_THRESHOLD must be positive");
        }
        if var_confidence <= 0.0 || var_confidence >= 1.0 {
            anyhow::bail!("VAR_CONFIDENCE must be strictly between 0 and 1");
        }

        Ok(Self {
            source,
            price_api_base_url,
            data_dir,
            start_date,
            end_date,
            rolling_window,
            decomposition_period,
            correlation_lags,
            z_score_threshold,
            var_confidence,
        })
    }

    /// The stage tunables the pipeline consumes.
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            rolling_window: self.rolling_window,
            decomposition_period: self.decomposition_period,
            correlation_lags: self.correlation_lags,
            z_score_threshold: self.z_score_threshold,
            var_confidence: self.var_confidence,
        }
    }
}

fn parse_date_var(var: &str, default: &str) -> Result<NaiveDate> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .with_context(|| format!("{var} must be YYYY-MM-DD, got {raw:?}"))
}

fn parse_var<T: FromStr>(var: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid {var}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
