//! # news_collect
//!
//! Command-line driver around the collector library. Walks the listing
//! pages of the requested tags, extracts every article not yet
//! snapshotted, and writes the accepted ones to a JSON file.
//!
//! ## Usage
//!
//! ```sh
//! news_collect -o ./out --tag mobile --pages 2
//! ```
//!
//! ## Pipeline
//!
//! 1. **Listing**: `article_list(tag, page)` for each tag and page; a
//!    redirect ends the tag's page range
//! 2. **Dedup**: stubs whose page is already snapshotted are skipped
//! 3. **Detail**: `article_detail` runs `concurrency` articles at a time;
//!    too-short and video articles are skipped, other failures logged
//! 4. **Output**: accepted articles are written as JSON

use chrono::Local;
use clap::Parser;
use futures::stream::{self, StreamExt};
use news_collect::images::HttpImageStore;
use news_collect::request::build_client;
use news_collect::{Article, CollectConfig, CollectError, Collector, Registry};
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod outputs;
mod utils;

use cli::Cli;
use outputs::json;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let started = Local::now();
    info!("news_collect starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = CollectConfig::load(args.config.as_deref()).await?;
    debug!(?config, "Effective configuration");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let images = Arc::new(HttpImageStore::new(
        config.image_root.clone(),
        build_client(config.request_timeout())?,
    ));
    let registry = Registry::standard();
    let collector = match registry.create(&args.collector, &config, images) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, available = ?registry.names(), "Cannot create collector");
            return Err(e.into());
        }
    };

    if args.list_tags {
        for tag in collector.tags() {
            println!("{:<14} {:>2}  {}", tag, tag.id(), tag.label());
        }
        return Ok(());
    }

    let tags = if args.tags.is_empty() {
        collector.tags()
    } else {
        args.tags.clone()
    };

    // ---- Listing ----
    let mut seen = HashSet::new();
    let mut stubs = Vec::new();
    let mut already_snapshotted = 0usize;
    for tag in tags {
        for page in 1..=args.pages.max(1) {
            match collector.article_list(tag, page).await {
                Ok(list) => {
                    for mut stub in list {
                        if !seen.insert(stub.href.clone()) {
                            continue;
                        }
                        if !args.include_seen && collector.has_snapshot(&stub) {
                            already_snapshotted += 1;
                            continue;
                        }
                        if stub.category.name.is_empty() {
                            stub.category.name = tag.label().to_string();
                        }
                        stubs.push(stub);
                    }
                }
                Err(e) if e.is_redirect() => {
                    info!(%tag, page, error = %e, "Listing redirected; no more pages");
                    break;
                }
                Err(e @ CollectError::UndefinedTag(_)) => {
                    warn!(%tag, error = %e, "Tag not supported by collector");
                    break;
                }
                Err(e) => {
                    error!(%tag, page, error = %e, "Listing failed");
                    break;
                }
            }
        }
    }
    info!(
        to_extract = stubs.len(),
        already_snapshotted,
        "Article listing complete"
    );

    // ---- Detail extraction ----
    let total = stubs.len();
    let collector: &dyn Collector = collector.as_ref();
    let results: Vec<Option<Article>> = stream::iter(stubs)
        .map(|mut article| async move {
            match collector.article_detail(&mut article).await {
                Ok(()) => {
                    info!(title = %truncate_for_log(&article.title, 40), "Collected article");
                    Some(article)
                }
                Err(e) if e.is_skip() => {
                    warn!(href = %article.href, error = %e, "Skipping article");
                    None
                }
                Err(e) => {
                    error!(href = %article.href, error = %e, "Article extraction failed");
                    None
                }
            }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    let articles: Vec<Article> = results.into_iter().flatten().collect();
    info!(
        total,
        collected = articles.len(),
        dropped = total - articles.len(),
        "Completed article extraction"
    );

    // ---- Output ----
    if let Err(e) = json::write_articles(&articles, &args.output_dir, collector.name(), &started).await {
        error!(error = %e, "Failed to write articles JSON");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
