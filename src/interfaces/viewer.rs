//! Interactive chart viewer: one window with the chart catalog on the left
//! and the selected figure (or the text summary) on the right.

use crate::application::pipeline::AnalysisOutcome;
use crate::domain::ports::ChartSpec;
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

pub struct ViewerApp {
    title: String,
    summary: String,
    charts: Vec<ChartSpec>,
    /// `None` shows the summary page.
    selected: Option<usize>,
}

impl ViewerApp {
    pub fn new(outcome: &AnalysisOutcome) -> Self {
        Self {
            title: outcome.series.ticker().to_string(),
            summary: outcome.summary.clone(),
            charts: outcome.charts.clone(),
            selected: None,
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("chart_list")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading(&self.title);
                ui.separator();
                if ui.selectable_label(self.selected.is_none(), "Summary").clicked() {
                    self.selected = None;
                }
                for (i, chart) in self.charts.iter().enumerate() {
                    if ui
                        .selectable_label(self.selected == Some(i), &chart.title)
                        .clicked()
                    {
                        self.selected = Some(i);
                    }
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.selected {
            None => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.monospace(&self.summary);
                });
            }
            Some(i) => {
                if let Some(chart) = self.charts.get(i) {
                    ui.label(egui::RichText::new(&chart.title).size(18.0).strong());
                    ui.label(format!("{} vs {}", chart.y_label, chart.x_label));
                    Plot::new(format!("chart_{i}"))
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            for series in &chart.series {
                                plot_ui.line(Line::new(
                                    series.label.clone(),
                                    PlotPoints::from(series.points.clone()),
                                ));
                            }
                        });
                }
            }
        });
    }
}

/// Runs the native event loop until the window closes.
pub fn run(app: ViewerApp) -> anyhow::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title("Tickerscope"),
        ..Default::default()
    };

    eframe::run_native(
        "Tickerscope",
        native_options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Eframe error: {}", e))
}
