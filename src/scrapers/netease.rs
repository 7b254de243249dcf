//! NetEase (`www.163.com`) article collector.
//!
//! Listings come in two shapes depending on the channel:
//!
//! - **Structural**: a rendered page where each article is an
//!   `#news-flow-content .bigsize` heading wrapping a link.
//! - **Feed**: a `data_callback([...])` script whose argument is a JSON
//!   array of article records, each with its own keyword list.
//!
//! Article pages are read through the [`SnapshotCache`], then reduced to a
//! sanitized body by [`crate::sanitize`].
//!
//! # URL Pattern
//!
//! Listing pages after the first carry a `_NN` suffix, e.g.
//! `https://tech.163.com/special/it_2016_02/`.

use crate::collector::Collector;
use crate::config::CollectConfig;
use crate::detail::{self, PageRules};
use crate::error::{CollectError, Result};
use crate::images::ImageStore;
use crate::models::{Article, ArticleTag};
use crate::request::{self, build_client, Identity};
use crate::sanitize::{self, SanitizeRules};
use crate::snapshot::SnapshotCache;
use crate::tags::{Column, ListShape, Tag};
use crate::transliterate::transliterate;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const NAME: &str = "www_163_com";
pub const HOME_URL: &str = "https://www.163.com/";

const FEED_PREFIX: &str = "data_callback(";
const FEED_ARTICLE_TYPE: &str = "article";
const IMAGE_CONCURRENCY: usize = 4;

static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("#news-flow-content .bigsize").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

pub const PAGE_RULES: PageRules = PageRules {
    title_selector: r#"meta[property="og:title"]"#,
    title_attr: "content",
    time_selector: "#ne_wrap",
    time_attr: "data-publishtime",
    site_offset_secs: 8 * 3600,
};

pub const SANITIZE_RULES: SanitizeRules = SanitizeRules {
    body_selector: ".post_body",
    decorative_suffixes: &["logo.png"],
    center_class: "f_center",
    artifact_selector: ".Apple-interchange-newline",
};

/// Listing endpoints per supported tag.
///
/// Commerce, car, life and startup have no channel on this site.
pub fn default_columns() -> HashMap<Tag, Column> {
    use ListShape::{Feed, Structural};

    [
        (Tag::Mobile, "https://mobile.163.com/special/index_datalist{page}/", Feed),
        (Tag::Smart, "https://tech.163.com/special/00097UHL/smart_datalist{page}.js", Feed),
        (Tag::It, "https://tech.163.com/special/it_2016{page}/", Structural),
        (Tag::Telecom, "https://tech.163.com/special/tele_2016{page}/", Structural),
        (Tag::Science, "https://tech.163.com/special/techscience{page}/", Structural),
        (Tag::Digital, "https://digi.163.com/special/index_datalist{page}/", Feed),
        (Tag::Fashion, "https://fashion.163.com/special/002688FE/fashion_datalist{page}.js", Feed),
        (Tag::Internet, "https://tech.163.com/special/internet_2016{page}/", Structural),
        (Tag::Blockchain, "https://tech.163.com/special/blockchain_2018{page}/", Structural),
        (Tag::FiveG, "https://tech.163.com/special/5g_2019{page}/", Structural),
        (Tag::Parenting, "https://baby.163.com/special/003687OS/newsdata_hot{page}.js", Feed),
        (Tag::Art, "https://art.163.com/special/00999815/art_redian_api{page}.js", Feed),
        (Tag::MobileReview, "https://mobile.163.com/special/index_datalist_cpsh{page}/", Feed),
        (Tag::Travel, "https://travel.163.com/special/00067VF5/fooddatas_travel{page}.js", Feed),
    ]
    .into_iter()
    .map(|(tag, template, shape)| (tag, Column::new(template, shape)))
    .collect()
}

/// One record of a feed listing. Fields the collector does not use are ignored.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    docurl: String,
    #[serde(default)]
    newstype: String,
    #[serde(default)]
    keywords: Option<Vec<FeedKeyword>>,
}

#[derive(Debug, Deserialize)]
struct FeedKeyword {
    #[serde(default)]
    keyname: String,
}

pub struct NeteaseCollector {
    columns: HashMap<Tag, Column>,
    client: Client,
    snapshots: SnapshotCache,
    images: Arc<dyn ImageStore>,
    min_content_chars: usize,
}

impl NeteaseCollector {
    pub fn new(config: &CollectConfig, images: Arc<dyn ImageStore>) -> Result<Self> {
        let client = build_client(config.request_timeout())?;
        let snapshots = SnapshotCache::new(config.snapshot_root.clone(), NAME, client.clone());
        Ok(Self {
            columns: default_columns(),
            client,
            snapshots,
            images,
            min_content_chars: config.min_content_chars,
        })
    }

    /// Replace the listing endpoints, e.g. to point at a mirror.
    pub fn with_columns(mut self, columns: HashMap<Tag, Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn snapshots(&self) -> &SnapshotCache {
        &self.snapshots
    }

    /// Localize every distinct image source. Failed downloads are logged
    /// and left out of the returned map.
    async fn localize_images(&self, sources: Vec<String>) -> HashMap<String, String> {
        let unique: BTreeSet<String> = sources.into_iter().collect();
        stream::iter(unique)
            .map(|src| async move {
                match self.images.download(&src).await {
                    Ok(local) => Some((src, local)),
                    Err(e) => {
                        warn!(%src, error = %e, "Image download failed; dropping image");
                        None
                    }
                }
            })
            .buffer_unordered(IMAGE_CONCURRENCY)
            .filter_map(std::future::ready)
            .collect()
            .await
    }
}

impl std::fmt::Debug for NeteaseCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeteaseCollector")
            .field("columns", &self.columns.len())
            .field("snapshot_root", &self.snapshots.root())
            .field("min_content_chars", &self.min_content_chars)
            .finish()
    }
}

/// [`Factory`](crate::collector::Factory) for the registry.
pub fn factory(config: &CollectConfig, images: Arc<dyn ImageStore>) -> Result<Box<dyn Collector>> {
    Ok(Box::new(NeteaseCollector::new(config, images)?))
}

#[async_trait]
impl Collector for NeteaseCollector {
    fn name(&self) -> &str {
        NAME
    }

    fn tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.columns.keys().copied().collect();
        tags.sort();
        tags
    }

    #[instrument(level = "info", skip(self), fields(collector = NAME))]
    async fn article_list(&self, tag: Tag, page: u32) -> Result<Vec<Article>> {
        let column = self.columns.get(&tag).ok_or(CollectError::UndefinedTag(tag))?;
        let url = column.page_url(page);

        let body = request::get(&self.client, &url, Identity::Crawler)
            .await?
            .text()
            .await?;
        let articles = match column.shape {
            ListShape::Structural => parse_listing_page(&body, &Url::parse(&url)?),
            ListShape::Feed => parse_feed(&body)?,
        };

        info!(count = articles.len(), %url, "Indexed NetEase articles");
        debug!(hrefs = ?articles.iter().map(|a| a.href.as_str()).collect::<Vec<_>>(), "NetEase hrefs");
        Ok(articles)
    }

    #[instrument(level = "info", skip_all, fields(collector = NAME, href = %article.href))]
    async fn article_detail(&self, article: &mut Article) -> Result<()> {
        if article.href.is_empty() {
            return Err(CollectError::UndefinedArticleHref);
        }

        let html = self.snapshots.read_to_string(&article.href).await?;
        let base = Url::parse(&article.href).ok();
        let facts = detail::inspect(&html, &PAGE_RULES, &SANITIZE_RULES, base.as_ref());
        if !facts.title.is_empty() {
            article.title = facts.title;
        }
        article.post_time = facts.post_time;
        if facts.has_video {
            return Err(CollectError::VideoContent);
        }

        let images = self.localize_images(facts.image_sources).await;
        let body = sanitize::sanitize(&html, &SANITIZE_RULES, &images, base.as_ref());

        article.content = body.content;
        article.tags.extend(body.tags);
        article.local_images.extend(body.local_images);

        if body.visible_chars < self.min_content_chars {
            return Err(CollectError::ArticleTooShort {
                chars: body.visible_chars,
            });
        }
        info!(
            chars = body.visible_chars,
            images = article.local_images.len(),
            tags = article.tags.len(),
            "Parsed NetEase article"
        );
        Ok(())
    }

    fn has_snapshot(&self, article: &Article) -> bool {
        self.snapshots.exists(&article.href)
    }
}

/// Extract stubs from a structural listing page.
///
/// Headings without a link target are skipped; relative targets are
/// resolved against `base`.
pub fn parse_listing_page(html: &str, base: &Url) -> Vec<Article> {
    let document = Html::parse_document(html);
    let mut articles = Vec::new();
    for heading in document.select(&HEADLINE) {
        let Some(anchor) = heading.select(&ANCHOR).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
            continue;
        };
        let href = base.join(href).map(|u| u.to_string()).unwrap_or_else(|_| href.to_string());
        let title = anchor.text().collect::<String>().trim().to_string();
        articles.push(Article::stub(title, href));
    }
    articles
}

/// Extract stubs from a `data_callback(...)` feed, keeping only articles.
pub fn parse_feed(body: &str) -> Result<Vec<Article>> {
    let records: Vec<FeedRecord> = serde_json::from_str(unwrap_callback(body))?;
    let articles = records
        .into_iter()
        .filter(|r| r.newstype == FEED_ARTICLE_TYPE)
        .map(|r| {
            let mut article = Article::stub(r.title, r.docurl);
            article.tags = r
                .keywords
                .unwrap_or_default()
                .into_iter()
                .map(|k| ArticleTag {
                    tag: transliterate(&k.keyname),
                    name: k.keyname,
                })
                .collect();
            article
        })
        .collect();
    Ok(articles)
}

/// Strip the callback name and the one closing parenthesis around the payload.
fn unwrap_callback(body: &str) -> &str {
    let body = body.trim();
    let body = body.strip_prefix(FEED_PREFIX).unwrap_or(body);
    let body = body.trim_end().trim_end_matches(';').trim_end();
    body.strip_suffix(')').unwrap_or(body)
}
