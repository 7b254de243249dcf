//! The per-site collector contract and the registry of known collectors.
//!
//! A driver only ever talks to `dyn Collector`:
//!
//! ```ignore
//! let registry = Registry::standard();
//! let collector = registry.create("www_163_com", &config, images)?;
//! for mut article in collector.article_list(Tag::Mobile, 1).await? {
//!     if collector.has_snapshot(&article) {
//!         continue;
//!     }
//!     collector.article_detail(&mut article).await?;
//! }
//! ```

use crate::config::CollectConfig;
use crate::error::{CollectError, Result};
use crate::images::ImageStore;
use crate::models::Article;
use crate::scrapers::netease;
use crate::tags::Tag;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait Collector: Send + Sync {
    /// Stable collector name; also the snapshot subdirectory.
    fn name(&self) -> &str;

    /// Tags this site has listing endpoints for.
    fn tags(&self) -> Vec<Tag>;

    /// Article stubs on one listing page.
    ///
    /// Fails with [`CollectError::UndefinedTag`] for a tag not in
    /// [`Collector::tags`].
    async fn article_list(&self, tag: Tag, page: u32) -> Result<Vec<Article>>;

    /// Fill in `article` from its page. Requires a non-empty `href`.
    async fn article_detail(&self, article: &mut Article) -> Result<()>;

    /// Whether the page for `article` has already been snapshotted.
    fn has_snapshot(&self, article: &Article) -> bool;
}

/// Builds a collector from runtime configuration.
pub type Factory = fn(&CollectConfig, Arc<dyn ImageStore>) -> Result<Box<dyn Collector>>;

/// Name-keyed collector factories, filled once at startup.
#[derive(Default)]
pub struct Registry {
    factories: BTreeMap<&'static str, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every collector shipped in this crate.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(netease::NAME, netease::factory);
        registry
    }

    /// Add a factory. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(&mut self, name: &'static str, factory: Factory) {
        self.factories.insert(name, factory);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub fn create(
        &self,
        name: &str,
        config: &CollectConfig,
        images: Arc<dyn ImageStore>,
    ) -> Result<Box<dyn Collector>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CollectError::UnknownCollector(name.to_string()))?;
        factory(config, images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoImages;

    #[async_trait]
    impl ImageStore for NoImages {
        async fn download(&self, _src: &str) -> Result<String> {
            Err(CollectError::UndefinedArticleHref)
        }
    }

    #[test]
    fn test_standard_registry() {
        let registry = Registry::standard();
        assert_eq!(registry.names(), vec!["www_163_com"]);

        let collector = registry
            .create("www_163_com", &CollectConfig::default(), Arc::new(NoImages))
            .unwrap();
        assert_eq!(collector.name(), "www_163_com");
        assert!(!collector.tags().is_empty());
    }

    #[test]
    fn test_unknown_collector() {
        let registry = Registry::standard();
        let err = registry
            .create("www_example_com", &CollectConfig::default(), Arc::new(NoImages))
            .err()
            .unwrap();
        assert!(matches!(err, CollectError::UnknownCollector(name) if name == "www_example_com"));
    }

    #[test]
    fn test_has_snapshot_false_for_empty_href() {
        let collector = Registry::standard()
            .create("www_163_com", &CollectConfig::default(), Arc::new(NoImages))
            .unwrap();
        assert!(!collector.has_snapshot(&Article::default()));
    }
}
