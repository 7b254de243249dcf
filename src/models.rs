//! Data models for collected articles.
//!
//! This module defines the records passed between a collector and its driver:
//! - [`Article`]: a stub produced by listing retrieval, filled in by detail extraction
//! - [`ArticleTag`]: a keyword tag with its ASCII key
//! - [`Category`]: the publishing category an article is filed under
//!
//! All types serialize with serde so the driver can hand them to the
//! publishing side as JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A keyword tag attached to an article.
///
/// # Fields
///
/// * `name` - The display name as it appears on the source site
/// * `tag` - The ASCII key derived from `name` by
///   [`transliterate`](crate::transliterate::transliterate)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleTag {
    pub name: String,
    pub tag: String,
}

/// A publishing category.
///
/// The collector never interprets these fields; they are carried through
/// to the publishing system as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub name: String,
    pub alias: String,
    pub order: i32,
    /// Parent category id, `0` for a top-level category.
    pub parent_id: u64,
    pub intro: String,
}

impl Category {
    pub fn is_top_level(&self) -> bool {
        self.parent_id == 0
    }
}

/// An article record.
///
/// Listing retrieval produces stubs with only `title`, `href` and possibly
/// `tags` set. [`Collector::article_detail`](crate::collector::Collector::article_detail)
/// fills in the rest in place.
///
/// A failed detail call may leave the record partially populated: `title`
/// and `post_time` can be set even though `content`, `tags` and
/// `local_images` are incomplete.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    /// Sanitized body HTML, empty until detail extraction succeeds.
    pub content: String,
    pub alias: String,
    /// Keyword tags in discovery order. Names may repeat.
    pub tags: Vec<ArticleTag>,
    pub category: Category,
    pub author_name: String,
    /// Publish time in the local time zone, `None` when the page gave no
    /// parseable time.
    pub post_time: Option<DateTime<Local>>,
    pub intro: String,
    /// Canonical source link. Required before detail extraction.
    pub href: String,
    /// Local paths of images downloaded during detail extraction, in
    /// document order.
    pub local_images: Vec<String>,
}

impl Article {
    /// Create a stub from a listing entry.
    pub fn stub(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            ..Default::default()
        }
    }
}
