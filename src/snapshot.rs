//! Raw page snapshots on local disk.
//!
//! Every article page is fetched at most once per snapshot root. The file
//! for a link lives at
//!
//! ```text
//! <root>/<collector>/<digest[0]>/<digest>.html
//! ```
//!
//! where `digest` is the lowercase hex SHA-256 of the link. Once written a
//! snapshot is never modified.
//!
//! Concurrent first fetches of the *same* link are not coalesced: both
//! requests go out, both write a temporary file, and the second rename
//! replaces the first with identical content.

use crate::error::Result;
use crate::request::{self, Identity};
use rand::{rng, Rng};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, instrument, warn};

/// Lowercase hex SHA-256 of `href`.
pub fn digest(href: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(href.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct SnapshotCache {
    root: PathBuf,
    collector: String,
    client: Client,
}

impl SnapshotCache {
    pub fn new(root: impl Into<PathBuf>, collector: impl Into<String>, client: Client) -> Self {
        Self {
            root: root.into(),
            collector: collector.into(),
            client,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the snapshot for `href` lives. Pure function of `href`.
    pub fn path_for(&self, href: &str) -> PathBuf {
        let digest = digest(href);
        self.root
            .join(&self.collector)
            .join(&digest[..1])
            .join(format!("{digest}.html"))
    }

    /// Whether a snapshot for `href` is already on disk. Never fetches.
    pub fn exists(&self, href: &str) -> bool {
        !href.is_empty() && self.path_for(href).exists()
    }

    /// Open the snapshot for `href`, fetching and storing it first if absent.
    ///
    /// The returned file is positioned at the start.
    #[instrument(level = "info", skip(self))]
    pub async fn open(&self, href: &str) -> Result<File> {
        let path = self.path_for(href);
        match File::open(&path).await {
            Ok(file) => {
                debug!(path = %path.display(), "Snapshot hit");
                return Ok(file);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let body = request::get(&self.client, href, Identity::Crawler)
            .await?
            .bytes()
            .await?;
        write_atomic(&path, &body).await?;
        info!(path = %path.display(), bytes = body.len(), "Stored snapshot");

        Ok(File::open(&path).await?)
    }

    /// Open and read the whole snapshot. Invalid UTF-8 is replaced.
    pub async fn read_to_string(&self, href: &str) -> Result<String> {
        let mut file = self.open(href).await?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Write `body` to a temporary sibling of `path`, then rename it into place.
///
/// Readers see either no file or the complete one.
pub(crate) async fn write_atomic(path: &Path, body: &[u8]) -> Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(fs::write(path, body).await?);
    };
    fs::create_dir_all(dir).await?;

    let nonce: u64 = rng().random();
    let tmp = dir.join(format!(".{nonce:016x}.tmp"));
    fs::write(&tmp, body).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        warn!(tmp = %tmp.display(), error = %e, "Failed to move file into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::build_client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cache(root: &Path) -> SnapshotCache {
        SnapshotCache::new(root, "www_163_com", build_client(Duration::from_secs(6)).unwrap())
    }

    #[test]
    fn test_digest_is_fixed_length_hex() {
        let d = digest("https://www.163.com/tech/article/ABC.html");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(d, digest("https://www.163.com/tech/article/ABC.html"));
        assert_ne!(d, digest("https://www.163.com/tech/article/ABD.html"));
    }

    #[test]
    fn test_path_layout() {
        let cache = cache(Path::new("/srv/snapshot"));
        let href = "https://www.163.com/tech/article/ABC.html";
        let d = digest(href);
        let expected = PathBuf::from("/srv/snapshot/www_163_com")
            .join(&d[..1])
            .join(format!("{d}.html"));
        assert_eq!(cache.path_for(href), expected);
        assert_eq!(cache.path_for(href), cache.path_for(href));
    }

    #[test]
    fn test_exists_false_for_empty_href() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        // Even a file at the digest of "" does not count.
        let p = cache.path_for("");
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(&p, "x").unwrap();
        assert!(!cache.exists(""));
    }

    #[tokio::test]
    async fn test_open_fetches_once_then_reads_disk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let href = format!("{}/article.html", server.uri());

        assert!(!cache.exists(&href));
        assert_eq!(cache.read_to_string(&href).await.unwrap(), "<html>hello</html>");
        assert!(cache.exists(&href));
        assert_eq!(cache.read_to_string(&href).await.unwrap(), "<html>hello</html>");
    }

    #[tokio::test]
    async fn test_existing_snapshot_is_not_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let href = format!("{}/a.html", server.uri());
        let p = cache.path_for(&href);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(&p, "stale").unwrap();

        assert_eq!(cache.read_to_string(&href).await.unwrap(), "stale");
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/page.html");
        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("page.html")]);
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let href = format!("{}/broken.html", server.uri());

        assert!(cache.open(&href).await.is_err());
        assert!(!cache.exists(&href));
    }
}
