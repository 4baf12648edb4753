//! Offline page source backed by saved HTML files.

use std::path::PathBuf;

use tracing::debug;
use url::Url;

use qaharvest_shared::{HarvestError, Result};

use crate::{PageSource, RenderedPage, url_to_path};

/// Serves pages saved under a root directory.
///
/// `https://stackoverflow.com/questions/42/some-title` is read from
/// `<root>/questions/42/some-title.html`.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the page for `url` is expected on disk.
    pub fn path_for(&self, url: &Url) -> PathBuf {
        self.root.join(format!("{}.html", url_to_path(url)))
    }
}

impl PageSource for FileSource {
    async fn fetch(&self, url: &Url) -> Result<RenderedPage> {
        let path = self.path_for(url);
        debug!(%url, path = %path.display(), "reading saved page");

        let html = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| HarvestError::io(&path, e))?;

        Ok(RenderedPage {
            url: url.clone(),
            html,
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}
