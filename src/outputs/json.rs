//! JSON output of collected articles.
//!
//! Each run writes one file named after the collector and the local start
//! time, holding a JSON array of the articles that passed detail
//! extraction. The publishing side picks these files up.

use chrono::{DateTime, Local};
use news_collect::Article;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name for a run: `<collector>-<YYYY-MM-DD_HHMMSS>.json`.
pub fn output_filename(collector: &str, started: &DateTime<Local>) -> String {
    format!("{}-{}.json", collector, started.format("%Y-%m-%d_%H%M%S"))
}

/// Write `articles` as pretty JSON into `output_dir`.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), count = articles.len()))]
pub async fn write_articles(
    articles: &[Article],
    output_dir: &Path,
    collector: &str,
    started: &DateTime<Local>,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(articles)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = output_dir.join(output_filename(collector, started));
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote articles JSON");

    Ok(path)
}
