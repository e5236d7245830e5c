//! # ibov-dashboard
//!
//! Terminal dashboard for IBOV stock prices: pick tickers and a date range,
//! see the price chart, summary statistics, traded volume and the return of
//! an equal-weight portfolio.

mod args;
mod presenter;
mod repl;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ibov_dashboard_core::presenter::Presenter;
use ibov_dashboard_core::StockDashboard;

use args::Cli;
use presenter::{JsonPresenter, TerminalPresenter};
use repl::Session;

const DEFAULT_LOG_FILTER: &str = "ibov_dashboard=info,ibov_dashboard_core=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    // Logs go to stderr so --json output stays parseable.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.load_settings()?;
    let suffix = settings.market_suffix.clone();

    let mut dashboard = StockDashboard::new(settings).context("starting the dashboard")?;
    info!("Providers: {}", dashboard.provider_names().join(", "));

    let catalog_path = dashboard.settings().catalog_path.clone();
    dashboard
        .load_catalog()
        .with_context(|| format!("loading tickers from {}", catalog_path.display()))?;

    let data = dashboard
        .load_catalog_prices()
        .await
        .context("downloading price history")?;
    if !data.missing.is_empty() {
        warn!(
            "No price history for {} tickers: {}",
            data.missing.len(),
            data.missing.join(", ")
        );
    }

    let slider = dashboard.range_slider(&data.prices)?;
    let mut session = Session::new(slider.clone(), suffix, cli.chart, !cli.no_snap);
    session.set_tickers(&cli.tickers);
    session.set_range(
        cli.from.unwrap_or(slider.min),
        cli.to.unwrap_or(slider.max),
    );

    let mut presenter: Box<dyn Presenter> = if cli.json {
        Box::new(JsonPresenter::stdout())
    } else {
        Box::new(TerminalPresenter::new())
    };

    if cli.interactive {
        repl::run(&mut dashboard, &mut session, presenter.as_mut()).await
    } else {
        repl::render(&mut dashboard, &session, presenter.as_mut()).await
    }
}
