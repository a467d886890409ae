//! Text-mode chart rendering for headless runs.

use crate::domain::ports::{ChartRenderer, ChartSpec, LabeledSeries};
use anyhow::Result;

/// Prints one compact block per chart so a terminal run still shows every
/// figure the interactive viewer would.
#[derive(Default)]
pub struct TermChartRenderer;

impl TermChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for TermChartRenderer {
    fn render(&self, chart: &ChartSpec) -> Result<()> {
        println!("\n{} [{} vs {}]", chart.title, chart.y_label, chart.x_label);
        for series in &chart.series {
            println!("  {}", series_line(series));
        }
        Ok(())
    }
}

fn series_line(series: &LabeledSeries) -> String {
    if series.points.is_empty() {
        return format!("{:<30} (no defined points)", series.label);
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for point in &series.points {
        min = min.min(point[1]);
        max = max.max(point[1]);
    }
    let first = series.points[0][1];
    let last = series.points[series.points.len() - 1][1];
    format!(
        "{:<30} n={:<6} first={:.4} last={:.4} min={:.4} max={:.4}",
        series.label,
        series.points.len(),
        first,
        last,
        min,
        max
    )
}
