//! # Builder for FetcherConfig
//!
//! This module provides a builder pattern implementation for creating and
//! customizing FetcherConfig instances with a fluent API.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use coursepack_engine::FetcherConfig;
//! use url::Url;
//!
//! let root = Url::parse("https://example.edu/P1100/pdfs/").unwrap();
//! let config = FetcherConfig::builder(root)
//!     .with_timeout(Duration::from_secs(120))
//!     .with_connect_timeout(Duration::from_secs(5))
//!     .with_user_agent("studyapp/2.1")
//!     .with_header("X-Course-Token", "abc123")
//!     .build();
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::FetcherConfig;

/// Builder for creating FetcherConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct FetcherConfigBuilder {
    /// Config being accumulated
    config: FetcherConfig,
}

impl FetcherConfigBuilder {
    /// Create a new builder rooted at the given document URL
    pub fn new(document_root: Url) -> Self {
        Self {
            config: FetcherConfig::new(document_root),
        }
    }

    /// Set the overall timeout for one request. Zero disables the limit
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection establishment timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set whether redirects are followed
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    /// Set the User-Agent sent with every request
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add one header. Unparsable names or values are ignored
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<reqwest::header::HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Replace the whole header map, defaults included
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    /// Build the FetcherConfig instance
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://example.edu/P1100/pdfs/").unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = FetcherConfigBuilder::new(root()).build();

        assert_eq!(config.document_root, root());
        assert_eq!(config.timeout, Duration::ZERO);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.follow_redirects);
        assert!(config.user_agent.starts_with("coursepack/"));
        assert!(config.headers.contains_key(reqwest::header::ACCEPT));
    }

    #[test]
    fn test_fluent_overrides() {
        let config = FetcherConfigBuilder::new(root())
            .with_timeout(Duration::from_secs(90))
            .with_connect_timeout(Duration::from_secs(3))
            .with_follow_redirects(false)
            .with_user_agent("studyapp/2.1")
            .with_header("X-Course-Token", "tok-123")
            .build();

        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.follow_redirects);
        assert_eq!(config.user_agent, "studyapp/2.1");

        let token = config.headers.get("X-Course-Token").unwrap();
        assert_eq!(token.to_str().unwrap(), "tok-123");
    }

    #[test]
    fn test_bad_header_names_are_skipped() {
        let config = FetcherConfigBuilder::new(root())
            .with_header("not a header name", "v")
            .build();

        // Only the defaults remain
        assert!(config.headers.get("not a header name").is_none());
    }

    #[test]
    fn test_replacing_headers_drops_defaults() {
        let config = FetcherConfigBuilder::new(root())
            .with_headers(HeaderMap::new())
            .build();

        assert!(config.headers.is_empty());
    }
}
