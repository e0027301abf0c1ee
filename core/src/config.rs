//! Client configuration.
//!
//! Everything here is supplied once when the client is built and never
//! changes afterwards.

use std::fmt;

use crate::catalogue::DEFAULT_API_VERSION;
use crate::error::ApiError;

pub const ENV_URL: &str = "ETHERPAD_URL";
pub const ENV_API_KEY: &str = "ETHERPAD_API_KEY";
pub const ENV_API_VERSION: &str = "ETHERPAD_API_VERSION";
pub const ENV_CHARSET: &str = "ETHERPAD_CHARSET";

/// The API key. Its `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Charset used to decode response bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
}

impl Charset {
    pub fn parse(name: &str) -> Result<Self, ApiError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            other => Err(ApiError::InvalidConfig(format!("unsupported charset {other:?}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode a response body. Invalid UTF-8 is a transport error; every
    /// byte sequence is valid Latin-1.
    pub fn decode(&self, bytes: Vec<u8>) -> Result<String, ApiError> {
        match self {
            Charset::Utf8 => String::from_utf8(bytes)
                .map_err(|e| ApiError::transport_with_source("response body is not valid UTF-8", e)),
            Charset::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// Settings for [`crate::EtherpadClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: ApiKey,
    pub api_version: String,
    pub charset: Charset,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: ApiKey::new(api_key),
            api_version: DEFAULT_API_VERSION.to_string(),
            charset: Charset::default(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Read `ETHERPAD_URL` and `ETHERPAD_API_KEY`, plus the optional
    /// `ETHERPAD_API_VERSION` and `ETHERPAD_CHARSET`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::InvalidConfig(format!("environment variable {name} is not set")))
        };
        let mut config = Self::new(required(ENV_URL)?, required(ENV_API_KEY)?);
        if let Some(version) = lookup(ENV_API_VERSION).filter(|v| !v.is_empty()) {
            config.api_version = version;
        }
        if let Some(charset) = lookup(ENV_CHARSET).filter(|v| !v.is_empty()) {
            config.charset = Charset::parse(&charset)?;
        }
        Ok(config)
    }
}
