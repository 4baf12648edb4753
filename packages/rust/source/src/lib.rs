//! Page sources: where rendered question pages come from.
//!
//! This crate provides:
//! - [`PageSource`]: the seam the pipeline fetches pages through
//! - [`HttpSource`]: live pages over HTTP
//! - [`FileSource`]: pages previously saved to disk
//!
//! Sources only deliver HTML. Waiting, retries and any browser automation are
//! the source's business; the assembler assumes the page it gets is complete.

pub mod file;
pub mod http;

use std::future::Future;

use url::Url;

use qaharvest_shared::Result;

pub use file::FileSource;
pub use http::{HttpSource, build_client};

/// A fetched page, ready for assembly.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL the page was requested as.
    pub url: Url,
    /// Full HTML document.
    pub html: String,
}

/// Something that can produce the rendered HTML for a question URL.
pub trait PageSource: Send + Sync {
    /// Fetch the page at `url`.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<RenderedPage>> + Send;

    /// Human-readable source name for tracing.
    fn name(&self) -> &str;
}

/// Convert a URL path to a filesystem-safe relative path.
pub fn url_to_path(url: &Url) -> String {
    let cleaned = url
        .path()
        .trim_start_matches('/')
        .trim_end_matches('/')
        .trim_end_matches(".html")
        .trim_end_matches(".htm");

    let safe: String = cleaned
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect::<Vec<_>>()
        .join("/");

    if safe.is_empty() { "index".to_string() } else { safe }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_to_path() {
        let url = Url::parse("https://stackoverflow.com/questions/123/how-to-x").unwrap();
        assert_eq!(url_to_path(&url), "questions/123/how-to-x");

        let url = Url::parse("https://stackoverflow.com/").unwrap();
        assert_eq!(url_to_path(&url), "index");

        let url = Url::parse("https://example.com/docs/page.html").unwrap();
        assert_eq!(url_to_path(&url), "docs/page");
    }

    #[test]
    fn url_to_path_drops_traversal_segments() {
        let url = Url::parse("https://example.com/a/%2E%2E/b").unwrap();
        let path = url_to_path(&url);
        assert!(!path.split('/').any(|seg| seg == ".."));
    }
}
