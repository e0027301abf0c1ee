//! HTTP request and response types described as plain data.
//!
//! # Design
//! The dispatcher builds an `HttpRequest` and consumes an `HttpResponse`
//! without knowing how the bytes travel. A `Transport` (see
//! [`crate::transport`]) performs the actual exchange, which keeps request
//! building and envelope parsing deterministic and testable on their own.
//!
//! All fields use owned types so values can be recorded by test doubles and
//! compared after the call.

use std::fmt;

/// Content type used for every POST body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request. The API only ever uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is the full target including the query string for GET requests.
/// POST requests carry their form-encoded parameters in `body` and never
/// have a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// The URL without its query string. Safe to log: the query carries the
    /// API key.
    pub fn path(&self) -> &str {
        match self.url.split_once('?') {
            Some((path, _)) => path,
            None => &self.url,
        }
    }

    /// The raw query string of a GET request, if any.
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }
}

/// An HTTP response described as plain data.
///
/// The body is kept as raw bytes; the client decodes it with the configured
/// response charset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
