//! Site collectors.
//!
//! Each submodule implements [`Collector`](crate::collector::Collector) for
//! one site and exposes a `factory` that the
//! [`Registry`](crate::collector::Registry) maps under the site's `NAME`.
//!
//! # Supported Sites
//!
//! | Site | Module | Listing | Notes |
//! |------|--------|---------|-------|
//! | NetEase | [`netease`] | HTML headings and `data_callback` feeds | Video articles are skipped |
//!
//! # Common Patterns
//!
//! Collectors use:
//! - Crawler identity headers and a no-redirect client from [`crate::request`]
//! - A per-site [`SnapshotCache`](crate::snapshot::SnapshotCache) so each
//!   article page is fetched once
//! - [`crate::sanitize`] with site-specific rules for the article body

pub mod netease;
