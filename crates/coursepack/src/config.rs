use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("coursepack/", env!("CARGO_PKG_VERSION"));

/// Configurable options for the document fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Root URL documents live under; a document's filename is appended
    /// as one URL-encoded path segment
    pub document_root: Url,

    /// Overall timeout for one request. Zero disables the limit, which is
    /// the default since course PDFs can be large on slow links
    pub timeout: Duration,

    /// Time allowed for establishing the connection
    pub connect_timeout: Duration,

    /// Follow HTTP redirects, up to a fixed hop limit
    pub follow_redirects: bool,

    /// User-Agent header value
    pub user_agent: String,

    /// Extra headers sent with every request
    pub headers: HeaderMap,
}

impl FetcherConfig {
    pub fn new(document_root: Url) -> Self {
        Self {
            document_root,
            timeout: Duration::ZERO,
            connect_timeout: Duration::from_secs(10),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: FetcherConfig::get_default_headers(),
        }
    }

    pub fn builder(document_root: Url) -> crate::builder::FetcherConfigBuilder {
        crate::builder::FetcherConfigBuilder::new(document_root)
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/pdf,application/octet-stream;q=0.9,*/*;q=0.8"),
        );

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers
    }
}
