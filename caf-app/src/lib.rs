//! `caf-scrape`: command-line surface and the scrape pipeline behind it.

pub mod cli;
pub mod pipeline;

pub use cli::Cli;
pub use pipeline::{RunSummary, run};
