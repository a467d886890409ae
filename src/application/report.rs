//! Report assembly: the chart catalog and the printable summary.

use crate::domain::analytics::correlation::CorrelationDiagnostics;
use crate::domain::analytics::decomposition::SeasonalDecomposition;
use crate::domain::analytics::descriptive::DescriptiveStats;
use crate::domain::analytics::outliers::OutlierReport;
use crate::domain::analytics::risk::RiskMetrics;
use crate::domain::analytics::rolling::RollingStats;
use crate::domain::ports::{ChartRenderer, ChartSpec, LabeledSeries};
use crate::domain::series::CleanedSeries;
use chrono::{Datelike, NaiveDate};
use std::fmt::Write as _;
use tracing::warn;

/// Days from 0001-01-01 to the Unix epoch; turns a date into an epoch-day
/// x coordinate.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

pub fn date_to_x(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - UNIX_EPOCH_CE_DAYS) as f64
}

fn zip_points<I>(xs: &[f64], ys: I) -> Vec<[f64; 2]>
where
    I: IntoIterator<Item = Option<f64>>,
{
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| y.map(|y| [*x, y]))
        .collect()
}

/// Lag-indexed points with the definitional unit value at lag zero.
fn lag_points(values: &[f64]) -> Vec<[f64; 2]> {
    let mut points = Vec::with_capacity(values.len() + 1);
    points.push([0.0, 1.0]);
    for (k, v) in values.iter().enumerate() {
        points.push([(k + 1) as f64, *v]);
    }
    points
}

fn line(label: &str, points: Vec<[f64; 2]>) -> LabeledSeries {
    LabeledSeries {
        label: label.to_string(),
        points,
    }
}

/// The full chart catalog for one analyzed ticker: price, returns, rolling
/// overlay, the four decomposition panels, ACF and PACF.
pub fn build_charts(
    series: &CleanedSeries,
    rolling: &RollingStats,
    decomposition: &SeasonalDecomposition,
    correlation: &CorrelationDiagnostics,
) -> Vec<ChartSpec> {
    let ticker = series.ticker();
    let xs: Vec<f64> = series.records().iter().map(|r| date_to_x(r.date)).collect();
    let closes = series.adjusted_closes();
    let close_points = zip_points(&xs, closes.iter().map(|c| Some(*c)));

    let mut charts = Vec::with_capacity(9);

    charts.push(ChartSpec {
        title: format!("{ticker} Adjusted Close Price Over Time"),
        x_label: "Date".to_string(),
        y_label: "Adjusted Close Price".to_string(),
        series: vec![line("Adjusted Close", close_points.clone())],
    });

    charts.push(ChartSpec {
        title: format!("{ticker} Daily Returns Over Time"),
        x_label: "Date".to_string(),
        y_label: "Daily Return".to_string(),
        series: vec![line(
            "Daily Return",
            zip_points(&xs, series.records().iter().map(|r| r.daily_return)),
        )],
    });

    charts.push(ChartSpec {
        title: format!(
            "{ticker} Adjusted Close with {}-Day Rolling Statistics",
            rolling.window
        ),
        x_label: "Date".to_string(),
        y_label: "Price".to_string(),
        series: vec![
            line("Adjusted Close", close_points.clone()),
            line(
                "Rolling Mean",
                zip_points(&xs, rolling.mean.iter().copied()),
            ),
            line(
                "Rolling Std Dev",
                zip_points(&xs, rolling.std_dev.iter().copied()),
            ),
        ],
    });

    let panels: [(&str, &str, Vec<[f64; 2]>); 4] = [
        ("Observed", "Price", close_points),
        (
            "Trend",
            "Trend",
            zip_points(&xs, decomposition.trend.iter().copied()),
        ),
        (
            "Seasonal",
            "Seasonal Factor",
            zip_points(&xs, decomposition.seasonal.iter().map(|s| Some(*s))),
        ),
        (
            "Residual",
            "Residual",
            zip_points(&xs, decomposition.residual.iter().copied()),
        ),
    ];
    for (panel, y_label, points) in panels {
        charts.push(ChartSpec {
            title: format!("{ticker} Seasonal Decomposition: {panel}"),
            x_label: "Date".to_string(),
            y_label: y_label.to_string(),
            series: vec![line(panel, points)],
        });
    }

    charts.push(ChartSpec {
        title: format!("Autocorrelation of {ticker} Adjusted Close"),
        x_label: "Lag".to_string(),
        y_label: "Correlation".to_string(),
        series: vec![line("ACF", lag_points(&correlation.acf))],
    });

    charts.push(ChartSpec {
        title: format!("Partial Autocorrelation of {ticker} Adjusted Close"),
        x_label: "Lag".to_string(),
        y_label: "Correlation".to_string(),
        series: vec![line("PACF", lag_points(&correlation.pacf))],
    });

    charts
}

/// The printable run summary: descriptive table, missing counts, flagged
/// outliers and the volatility metrics.
pub fn build_summary(
    series: &CleanedSeries,
    descriptive: &DescriptiveStats,
    outliers: &OutlierReport,
    risk: &RiskMetrics,
) -> String {
    let ticker = series.ticker();
    let first = series
        .records()
        .first()
        .map(|r| r.date)
        .unwrap_or_else(|| series.start());
    let last = series
        .records()
        .last()
        .map(|r| r.date)
        .unwrap_or_else(|| series.end());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} cleaned records from {} to {}",
        ticker,
        series.len(),
        first,
        last
    );

    let _ = writeln!(out, "\nBasic Statistics for {ticker}:");
    let _ = writeln!(
        out,
        "  {:<14}{:>7}{:>16}{:>16}{:>16}{:>16}{:>16}{:>16}{:>16}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for column in &descriptive.columns {
        let s = &column.summary;
        let _ = writeln!(
            out,
            "  {:<14}{:>7}{:>16.6}{:>16.6}{:>16.6}{:>16.6}{:>16.6}{:>16.6}{:>16.6}",
            column.column.name(),
            s.count,
            s.mean,
            s.std_dev,
            s.min,
            s.q1,
            s.median,
            s.q3,
            s.max
        );
    }

    let _ = writeln!(out, "\nMissing Values for {ticker}:");
    for column in &descriptive.columns {
        let _ = writeln!(out, "  {:<14}{:>7}", column.column.name(), column.missing);
    }

    let _ = writeln!(out, "\nOutliers for {ticker} (|z| > {}):", outliers.threshold);
    if outliers.outliers.is_empty() {
        let _ = writeln!(out, "  none detected");
    } else {
        for outlier in &outliers.outliers {
            let _ = writeln!(
                out,
                "  {}  return {:>10.6}  z-score {:>7.2}",
                outlier.date, outlier.daily_return, outlier.z_score
            );
        }
    }

    let _ = writeln!(out, "\nVolatility Metrics for {ticker}:");
    let _ = writeln!(
        out,
        "  Value at Risk ({:.0}%): {:.6}",
        risk.confidence * 100.0,
        risk.value_at_risk
    );
    let _ = writeln!(
        out,
        "  Risk-adjusted return (mean/std): {:.4}",
        risk.risk_adjusted_ratio
    );
    out
}

/// Pushes the whole catalog through a renderer. A failed figure is logged
/// and skipped; one bad chart must not sink the report.
pub fn render_all(renderer: &dyn ChartRenderer, charts: &[ChartSpec]) {
    for chart in charts {
        if let Err(e) = renderer.render(chart) {
            warn!("renderer failed on {:?}: {e:#}", chart.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{correlation, decomposition, descriptive, outliers, risk, rolling};
    use crate::domain::series::{Ticker, TimeSeriesRecord};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn fixture_series() -> CleanedSeries {
        let ticker: Ticker = "TEST".parse().unwrap();
        let prices: Vec<f64> = (0..12).map(|i| 100.0 + (i % 4) as f64).collect();
        let records: Vec<TimeSeriesRecord> = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| TimeSeriesRecord {
                date: day(1 + i as u32),
                open: price,
                high: price + 1.0,
                low: price - 1.0,
                close: price,
                adj_close: price,
                volume: 1.0e6,
                daily_return: if i == 0 {
                    None
                } else {
                    Some((price - prices[i - 1]) / prices[i - 1])
                },
                z_score: None,
            })
            .collect();
        CleanedSeries::new(ticker, day(1), day(12), records)
    }

    #[test]
    fn epoch_day_coordinates() {
        assert_eq!(date_to_x(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0.0);
        assert_eq!(date_to_x(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1.0);
        assert_eq!(date_to_x(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()), -1.0);
    }

    #[test]
    fn catalog_has_nine_charts_with_aligned_points() {
        let series = fixture_series();
        let closes = series.adjusted_closes();
        let rolling = rolling::rolling_stats(&closes, 3);
        let decomposition = decomposition::decompose_multiplicative(&closes, 4).unwrap();
        let correlation = correlation::diagnostics(&closes, 5).unwrap();

        let charts = build_charts(&series, &rolling, &decomposition, &correlation);
        assert_eq!(charts.len(), 9);

        // price chart keeps every record, returns chart drops the first row
        assert_eq!(charts[0].series[0].points.len(), series.len());
        assert_eq!(charts[1].series[0].points.len(), series.len() - 1);

        // rolling overlay: mean line loses the warmup positions
        assert_eq!(charts[2].series.len(), 3);
        assert_eq!(charts[2].series[1].points.len(), series.len() - 2);

        // trend panel loses period/2 positions at each edge
        let trend_chart = charts
            .iter()
            .find(|c| c.title.contains("Trend"))
            .unwrap();
        assert_eq!(trend_chart.series[0].points.len(), series.len() - 4);

        // correlation charts carry lag 0 plus one point per lag
        assert_eq!(charts[7].series[0].points.len(), 6);
        assert_eq!(charts[7].series[0].points[0], [0.0, 1.0]);
        assert_eq!(charts[8].series[0].points.len(), 6);
    }

    #[test]
    fn summary_contains_every_section() {
        let series = fixture_series();
        let descriptive = descriptive::describe(&series).unwrap();
        let outliers = outliers::detect_outliers(&series, 3.0);
        let risk = risk::risk_metrics(&series.daily_returns(), 0.99).unwrap();

        let summary = build_summary(&series, &descriptive, &outliers, &risk);
        assert!(summary.contains("Basic Statistics for TEST"));
        assert!(summary.contains("Missing Values for TEST"));
        assert!(summary.contains("Outliers for TEST (|z| > 3)"));
        assert!(summary.contains("Value at Risk (99%)"));
        assert!(summary.contains("daily_return"));
        assert!(summary.contains("adj_close"));
    }

    #[test]
    fn zip_points_skips_undefined_cells() {
        let xs = [0.0, 1.0, 2.0];
        let points = zip_points(&xs, vec![Some(5.0), None, Some(7.0)]);
        assert_eq!(points, vec![[0.0, 5.0], [2.0, 7.0]]);
    }
}
