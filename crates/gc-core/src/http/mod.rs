//! HTTP transport types
//!
//! Requests go through the [`Transport`] trait so the contact layer never
//! talks to reqwest directly. [`GoogleClient`] is the production
//! implementation; tests plug in their own.

pub mod client;

use async_trait::async_trait;

use crate::Result;

pub use client::GoogleClient;

/// An HTTP response described as plain data.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the given status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated transport to the contacts feed.
///
/// Paths are relative to [`Transport::base_url`]; absolute URLs are passed
/// through untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Feed root used to relativize URLs
    fn base_url(&self) -> &str;

    /// GET a feed resource as JSON
    async fn get(&self, path: &str) -> Result<HttpResponse>;

    /// GET a binary resource (photos) without feed query parameters
    async fn get_media(&self, url: &str) -> Result<HttpResponse>;

    /// POST an Atom document
    async fn post(&self, path: &str, body: String) -> Result<HttpResponse>;

    /// PUT an Atom document with extra request headers
    async fn put(&self, path: &str, body: String, headers: &[(String, String)]) -> Result<HttpResponse>;
}

/// Normalize a feed URL to https and strip the feed root from it.
pub fn relative_path(url: &str, base_url: &str) -> String {
    let secure = url.replacen("http://", "https://", 1);
    secure.replacen(base_url, "", 1)
}
