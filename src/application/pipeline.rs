//! Orchestrates the full diagnostics run for one ticker: load, describe,
//! roll, decompose, flag outliers, measure risk, correlate, then assemble
//! the report artifacts.

use crate::application::loader::SeriesLoader;
use crate::application::report;
use crate::config::{Config, SourceKind};
use crate::domain::analytics::correlation::{self, CorrelationDiagnostics};
use crate::domain::analytics::decomposition::{self, SeasonalDecomposition};
use crate::domain::analytics::descriptive::{self, DescriptiveStats};
use crate::domain::analytics::outliers::{self, OutlierReport};
use crate::domain::analytics::risk::{self, RiskMetrics};
use crate::domain::analytics::rolling::{self, RollingStats};
use crate::domain::errors::AnalysisError;
use crate::domain::ports::{ChartSpec, PriceHistorySource, SeriesStore};
use crate::domain::series::{CleanedSeries, Ticker};
use crate::infrastructure::csv_store::CsvSeriesStore;
use crate::infrastructure::synthetic::SyntheticDailyHistory;
use crate::infrastructure::yahoo::YahooChartSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

/// Tunables for the analysis stages.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub rolling_window: usize,
    pub decomposition_period: usize,
    pub correlation_lags: usize,
    pub z_score_threshold: f64,
    pub var_confidence: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            rolling_window: 30,
            // trading days in a year, the annual cycle of a daily series
            decomposition_period: 252,
            correlation_lags: 30,
            z_score_threshold: outliers::DEFAULT_Z_THRESHOLD,
            var_confidence: 0.99,
        }
    }
}

/// Everything one run produces, ready for rendering or assertions.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub series: CleanedSeries,
    pub descriptive: DescriptiveStats,
    pub rolling: RollingStats,
    pub decomposition: SeasonalDecomposition,
    pub outliers: OutlierReport,
    pub risk: RiskMetrics,
    pub correlation: CorrelationDiagnostics,
    pub charts: Vec<ChartSpec>,
    pub summary: String,
}

pub struct AnalysisPipeline {
    loader: SeriesLoader,
    settings: AnalysisSettings,
}

impl AnalysisPipeline {
    pub fn new(loader: SeriesLoader, settings: AnalysisSettings) -> Self {
        Self { loader, settings }
    }

    /// Composition root: wires the configured source and store.
    pub fn from_config(config: &Config) -> Self {
        let source: Arc<dyn PriceHistorySource> = match config.source {
            SourceKind::Yahoo => Arc::new(YahooChartSource::new(config.price_api_base_url.clone())),
            SourceKind::Synthetic => Arc::new(SyntheticDailyHistory::new()),
        };
        let store: Arc<dyn SeriesStore> = Arc::new(CsvSeriesStore::new(config.data_dir.clone()));
        Self::new(SeriesLoader::new(source, store), config.analysis_settings())
    }

    /// Runs every stage in order. The first failing stage aborts the run
    /// with its context attached; degenerate-but-defined results flow
    /// through as values.
    pub async fn run(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AnalysisOutcome> {
        let mut series = self
            .loader
            .load(ticker, start, end)
            .await
            .with_context(|| format!("[{ticker}] loader stage"))?;

        let descriptive = descriptive::describe(&series)
            .with_context(|| format!("[{ticker}] descriptive stage"))?;

        let closes = series.adjusted_closes();
        let rolling = rolling::rolling_stats(&closes, self.settings.rolling_window);
        info!(
            "{}: rolling stats over a {}-day window",
            ticker, self.settings.rolling_window
        );

        let decomposition =
            decomposition::decompose_multiplicative(&closes, self.settings.decomposition_period)
                .with_context(|| format!("[{ticker}] decomposition stage"))?;

        let outliers = outliers::detect_outliers(&series, self.settings.z_score_threshold);
        series.cache_z_scores(&outliers.z_scores);
        info!(
            "{}: {} return(s) beyond |z| > {}",
            ticker,
            outliers.outliers.len(),
            self.settings.z_score_threshold
        );

        let returns = series.daily_returns();
        let risk = risk::risk_metrics(&returns, self.settings.var_confidence)
            .ok_or_else(|| AnalysisError::EmptySeries {
                ticker: ticker.to_string(),
                rows: series.len(),
                min: 2,
            })
            .with_context(|| format!("[{ticker}] risk stage"))?;

        let correlation = correlation::diagnostics(&closes, self.settings.correlation_lags)
            .with_context(|| format!("[{ticker}] correlation stage"))?;

        let charts = report::build_charts(&series, &rolling, &decomposition, &correlation);
        let summary = report::build_summary(&series, &descriptive, &outliers, &risk);

        Ok(AnalysisOutcome {
            series,
            descriptive,
            rolling,
            decomposition,
            outliers,
            risk,
            correlation,
            charts,
            summary,
        })
    }
}
