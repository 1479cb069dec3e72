//! logstat - Aggregate session statistics from a one-day event log

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use logstat::{
    Pipeline, Result,
    cli::Cli,
    fetch::{LogFetcher, fetcher_for},
    output::get_formatter,
    timezone::TimestampConverter,
};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Fetch all lines, with a spinner on interactive terminals
async fn fetch_with_progress(fetcher: &dyn LogFetcher, show_progress: bool) -> Result<Vec<String>> {
    let progress = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching {}", fetcher.source()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = fetcher.fetch_lines().await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();
    let cli = Cli::parse();

    // The --quiet and --verbose flags override RUST_LOG
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("logstat=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("logstat=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let converter = TimestampConverter::from_hours(cli.utc_offset)?;
    info!(
        "Aggregating {} for {} at UTC{}",
        cli.url,
        cli.date,
        converter.offset()
    );

    let fetcher = fetcher_for(&cli.url, cli.timeout())?;
    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let lines = fetch_with_progress(fetcher.as_ref(), show_progress).await?;

    let report = Pipeline::new(cli.date)
        .with_converter(converter)
        .with_parallel(cli.parallel)
        .run(&lines);

    let malformed = report.parse_stats.malformed();
    if malformed > 0 {
        warn!(
            "Skipped {} malformed of {} lines read",
            malformed, report.parse_stats.lines_read
        );
    }

    let formatter = get_formatter(cli.json, cli.toggles());
    print!(
        "{}",
        formatter.format_report(&report, started.elapsed(), cli.sessions)
    );
    if cli.json {
        println!();
    }

    Ok(())
}
