//! Headless diagnostics run: prints the summary and text-mode charts.

use clap::Parser;
use tickerscope::application::pipeline::AnalysisPipeline;
use tickerscope::application::report;
use tickerscope::config::Config;
use tickerscope::domain::series::Ticker;
use tickerscope::infrastructure::term_render::TermChartRenderer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ticker symbol to analyze
    ticker: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let ticker: Ticker = cli.ticker.parse()?;

    let pipeline = AnalysisPipeline::from_config(&config);
    let outcome = pipeline
        .run(&ticker, config.start_date, config.end_date)
        .await?;

    println!("{}", outcome.summary);
    report::render_all(&TermChartRenderer::new(), &outcome.charts);
    Ok(())
}
