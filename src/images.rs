//! Image localization.
//!
//! Detail extraction hands every kept article image to an [`ImageStore`]
//! and rewrites the `src` to whatever path the store returns. Failures are
//! not fatal to the article: the image is dropped from the body.

use crate::error::Result;
use crate::request::{self, Identity};
use crate::snapshot::{digest, write_atomic};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the image at `src` and return its local path.
    async fn download(&self, src: &str) -> Result<String>;
}

/// Downloads images over HTTP into `<root>/<digest[0..2]>/<digest>.<ext>`.
///
/// A file already on disk is reused without a request, so repeated detail
/// extraction of the same article yields the same paths.
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    root: PathBuf,
    client: Client,
}

impl HttpImageStore {
    pub fn new(root: impl Into<PathBuf>, client: Client) -> Self {
        Self {
            root: root.into(),
            client,
        }
    }

    pub fn path_for(&self, src: &str) -> PathBuf {
        let digest = digest(src);
        self.root
            .join(&digest[..2])
            .join(format!("{digest}.{}", extension(src)))
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    #[instrument(level = "debug", skip(self))]
    async fn download(&self, src: &str) -> Result<String> {
        let path = self.path_for(src);
        if fs::try_exists(&path).await? {
            debug!(path = %path.display(), "Image already stored");
            return Ok(path_string(&path));
        }

        let body = request::get(&self.client, src, Identity::Browser)
            .await?
            .bytes()
            .await?;
        write_atomic(&path, &body).await?;
        info!(path = %path.display(), bytes = body.len(), "Stored image");
        Ok(path_string(&path))
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// File extension taken from the URL path, `jpg` when there is none usable.
fn extension(src: &str) -> String {
    let ext = Url::parse(src).ok().and_then(|u| {
        let last = u.path_segments()?.next_back()?.to_string();
        let (_, ext) = last.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    });
    match ext {
        Some(ext) if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) => ext,
        _ => "jpg".to_string(),
    }
}
