//! Runtime configuration.
//!
//! Settings come from an optional YAML file. Every field has a default, so
//! an empty file (or no file at all) gives a working setup:
//!
//! ```yaml
//! snapshot_root: ./snapshot
//! image_root: ./images
//! request_timeout_secs: 6
//! min_content_chars: 900
//! concurrency: 4
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectConfig {
    /// Root of the raw page snapshot store.
    pub snapshot_root: PathBuf,
    /// Where downloaded article images are written.
    pub image_root: PathBuf,
    pub request_timeout_secs: u64,
    /// Quality floor on sanitized visible text, in characters.
    pub min_content_chars: usize,
    /// Concurrent detail extractions in the driver.
    pub concurrency: usize,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            snapshot_root: PathBuf::from("./snapshot"),
            image_root: PathBuf::from("./images"),
            request_timeout_secs: 6,
            min_content_chars: 900,
            concurrency: 4,
        }
    }
}

impl CollectConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                let config = Self::from_yaml(&yaml)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}
