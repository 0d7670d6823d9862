use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use caf_app::{Cli, RunSummary, run};
use caf_common::CafError;
use caf_common::observability::{LogConfig, LogFormat, init_logging};
use caf_config::ScrapeConfig;
use caf_http::HttpClient;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match scrape(&cli).await {
        Ok(summary) => {
            tracing::info!(
                output = %summary.output.display(),
                objectives = summary.counts.objectives,
                indicators = summary.counts.indicators,
                "run.done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let caf = err.downcast_ref::<CafError>();
            tracing::error!(kind = caf.map(CafError::kind), error = %format!("{err:#}"), "run.failed");
            eprintln!("caf-scrape: {err:#}");
            ExitCode::from(caf.map(CafError::exit_code).unwrap_or(1))
        }
    }
}

async fn scrape(cli: &Cli) -> Result<RunSummary> {
    // 1) Config: defaults < file < CAF__ env < flags
    let cfg: ScrapeConfig = cli.loader().load().map_err(CafError::from)?;

    // 2) Logging next to the output
    init_logging(log_config(&cfg))?;
    tracing::debug!(?cfg, "config.loaded");

    // 3) Fetch, extract, write
    let client = HttpClient::new(
        &cfg.http.user_agent,
        Duration::from_secs(cfg.http.connect_timeout_secs),
    )
    .map_err(CafError::from)?
    .with_timeout(Duration::from_secs(cfg.http.timeout_secs));

    Ok(run(&cfg, &client).await?)
}

fn log_config(cfg: &ScrapeConfig) -> LogConfig {
    LogConfig {
        app_name: "caf-scrape",
        log_file: Some(cfg.log_path()),
        emit_stderr: cfg.log.stderr,
        format: match cfg.log.format {
            caf_config::LogFormat::Text => LogFormat::Text,
            caf_config::LogFormat::Json => LogFormat::Json,
        },
        default_filter: cfg.log.filter.clone(),
    }
}
