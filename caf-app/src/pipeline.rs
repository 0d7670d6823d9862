//! Fetch → extract → write, once, in order.

use std::path::PathBuf;

use caf_common::CafError;
use caf_config::{Mode, ScrapeConfig};
use caf_extract::crawl;
use caf_framework::json::write_json;
use caf_framework::{Counts, FrameworkDocument};
use caf_http::PageSource;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub counts: Counts,
    pub bytes: usize,
}

/// Run one scrape. The output file is only touched once extraction has
/// fully succeeded.
pub async fn run(cfg: &ScrapeConfig, source: &dyn PageSource) -> Result<RunSummary, CafError> {
    let url = cfg.source_url()?;

    let doc = match cfg.mode {
        Mode::Page => {
            let html = source.fetch_page(&url).await?;
            caf_extract::extract(&html)?
        }
        Mode::Crawl => crawl_site(source, &url).await?,
    }
    .with_source(url.as_str());

    let counts = doc.counts();
    tracing::info!(
        mode = ?cfg.mode,
        objectives = counts.objectives,
        principles = counts.principles,
        outcomes = counts.outcomes,
        indicators = counts.indicators,
        "extract.ok"
    );

    let output = cfg.output_path();
    let bytes = write_json(&doc, &output)?;
    tracing::info!(path = %output.display(), bytes, "write.ok");

    Ok(RunSummary {
        output,
        counts,
        bytes,
    })
}

async fn crawl_site(source: &dyn PageSource, start: &Url) -> Result<FrameworkDocument, CafError> {
    let collection = source.fetch_page(start).await?;
    let objective_links = crawl::objective_links(&collection, start)?;

    let mut objectives = Vec::with_capacity(objective_links.len());
    for link in &objective_links {
        let page = crawl::parse_objective_page(&source.fetch_page(link).await?, link)?;

        let mut principles = Vec::with_capacity(page.principle_links.len());
        for principle_link in &page.principle_links {
            let html = source.fetch_page(principle_link).await?;
            principles.push(crawl::parse_principle_page(&html, principle_link, &page.id)?);
        }
        tracing::debug!(objective = %page.id, principles = principles.len(), "crawl.objective");
        objectives.push(crawl::assemble_objective(page, principles));
    }

    Ok(crawl::finish(objectives)?)
}
