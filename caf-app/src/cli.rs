use std::path::PathBuf;

use caf_config::ScrapeConfigLoader;
use clap::{Parser, ValueEnum};

/// Scrape the NCSC Cyber Assessment Framework into JSON.
///
/// With no flags: fetch the framework page, extract it and write
/// `output.json` (and `output.log`) in the current directory.
#[derive(Debug, Parser)]
#[command(name = "caf-scrape", version, about)]
pub struct Cli {
    /// Output stem; writes `<STEM>.json` and `<STEM>.log`.
    #[arg(short, long, value_name = "STEM")]
    pub output: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Page to start from instead of the published framework URL.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Follow objective and principle links instead of reading one page.
    #[arg(long)]
    pub crawl: bool,

    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormatArg>,

    /// Only write the log file; nothing on stderr.
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl Cli {
    /// Config loader with the file and flag layers applied.
    pub fn loader(&self) -> ScrapeConfigLoader {
        let mut loader = ScrapeConfigLoader::new();
        if let Some(path) = &self.config {
            loader = loader.with_file(path);
        }
        if let Some(stem) = &self.output {
            loader = loader.with_override("output_stem", stem.to_string_lossy().into_owned());
        }
        if let Some(url) = &self.url {
            loader = loader.with_override("source_url", url.as_str());
        }
        if self.crawl {
            loader = loader.with_override("mode", "crawl");
        }
        if let Some(format) = self.log_format {
            let format = match format {
                LogFormatArg::Text => "text",
                LogFormatArg::Json => "json",
            };
            loader = loader.with_override("log.format", format);
        }
        if self.quiet {
            loader = loader.with_override("log.stderr", false);
        }
        loader
    }
}
