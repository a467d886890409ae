use clap::Parser;
use tickerscope::application::pipeline::AnalysisPipeline;
use tickerscope::config::Config;
use tickerscope::domain::series::Ticker;
use tickerscope::interfaces::viewer::{self, ViewerApp};

use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Single-ticker diagnostics: fetch, clean, analyze, then browse the charts.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ticker symbol to analyze
    ticker: String,
}

fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let ticker: Ticker = cli.ticker.parse()?;

    info!("Analyzing {} ({} to {})...", ticker, config.start_date, config.end_date);

    // The stages run strictly in sequence; a single-threaded runtime is all
    // the async retrieval seam needs.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let pipeline = AnalysisPipeline::from_config(&config);
    let outcome = runtime.block_on(pipeline.run(&ticker, config.start_date, config.end_date))?;

    println!("{}", outcome.summary);

    info!("Analysis complete. Launching viewer.");
    viewer::run(ViewerApp::new(&outcome))?;
    Ok(())
}
