//! # news_collect
//!
//! Collects news articles from a content site into canonical records:
//! title, sanitized body HTML, locally stored images, transliterated
//! keyword tags, category and publish time.
//!
//! ## Architecture
//!
//! A driver works against the [`Collector`] trait:
//! 1. **Listing**: [`Collector::article_list`] turns a tag page into article stubs
//! 2. **Dedup**: [`Collector::has_snapshot`] tells whether a page was already fetched
//! 3. **Detail**: [`Collector::article_detail`] fetches the page through the
//!    snapshot cache and fills in the record
//!
//! Collectors are created by name through the [`Registry`].

pub mod collector;
pub mod config;
pub mod detail;
pub mod error;
pub mod images;
pub mod models;
pub mod request;
pub mod sanitize;
pub mod scrapers;
pub mod snapshot;
pub mod tags;
pub mod transliterate;

pub use collector::{Collector, Registry};
pub use config::CollectConfig;
pub use error::CollectError;
pub use models::{Article, ArticleTag, Category};
pub use tags::Tag;
