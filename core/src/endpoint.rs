//! Target endpoint of the API and its security heuristic.

use url::Url;

use crate::error::ApiError;

/// Conventional HTTPS port.
pub const SECURE_PORT: u16 = 443;

/// Scheme, host, port and API version of the service. Fixed for the lifetime
/// of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
    api_version: String,
}

impl Endpoint {
    /// Parse a base URL such as `http://localhost:9001`. A missing port falls
    /// back to the scheme's default. Only a root path is accepted because
    /// the API path is always `/api/<version>/<operation>`.
    pub fn parse(base_url: &str, api_version: &str) -> Result<Self, ApiError> {
        let url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidConfig(format!("invalid base url {base_url:?}: {e}")))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ApiError::InvalidConfig(format!(
                "unsupported scheme {scheme:?} in {base_url:?}"
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| ApiError::InvalidConfig(format!("no host in {base_url:?}")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| ApiError::InvalidConfig(format!("no port in {base_url:?}")))?;
        if url.path() != "/" && !url.path().is_empty() {
            return Err(ApiError::InvalidConfig(format!(
                "base url {base_url:?} must not carry a path"
            )));
        }
        let valid_version = !api_version.is_empty()
            && api_version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid_version {
            return Err(ApiError::InvalidConfig(format!(
                "invalid api version {api_version:?}"
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            api_version: api_version.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// `scheme://host:port/api/<version>/<operation>`
    pub fn operation_url(&self, operation: &str) -> String {
        format!(
            "{}://{}:{}/api/{}/{}",
            self.scheme, self.host, self.port, self.api_version, operation
        )
    }

    pub fn is_secure(&self) -> bool {
        is_secure(self)
    }
}

/// Whether the endpoint is considered secure. Looks at the port only; the
/// scheme and the actual transport are not inspected.
pub fn is_secure(endpoint: &Endpoint) -> bool {
    endpoint.port == SECURE_PORT
}
