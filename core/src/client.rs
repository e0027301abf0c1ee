//! Request dispatch for the Etherpad HTTP API.
//!
//! # Design
//! `EtherpadClient` holds only immutable settings (endpoint, API key,
//! response charset) and a transport, so one instance can serve concurrent
//! callers. Dispatch is split the same way as the wire exchange:
//! `build_request` turns an operation and its parameters into an
//! `HttpRequest`, `parse_response` turns an `HttpResponse` into the envelope
//! `data`, and `invoke` runs exactly one exchange between the two. Nothing is
//! retried.

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalogue::{self, OperationDescriptor};
use crate::codec;
use crate::config::{ApiKey, Charset, ClientConfig};
use crate::endpoint::Endpoint;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, FORM_CONTENT_TYPE};
use crate::params::ParameterSet;
use crate::transport::{Transport, UreqTransport};

/// Client for the Etherpad HTTP API.
#[derive(Debug, Clone)]
pub struct EtherpadClient<T = UreqTransport> {
    endpoint: Endpoint,
    api_key: ApiKey,
    charset: Charset,
    transport: T,
}

impl EtherpadClient<UreqTransport> {
    /// Client for `base_url` with the default API version and charset.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiError> {
        Self::from_config(ClientConfig::new(base_url, api_key))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> EtherpadClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        let endpoint = Endpoint::parse(&config.base_url, &config.api_version)?;
        Ok(Self {
            endpoint,
            api_key: config.api_key,
            charset: config.charset,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Advisory only: true when the configured port is 443.
    pub fn is_secure(&self) -> bool {
        self.endpoint.is_secure()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `operation` and return the envelope `data`.
    pub fn invoke(&self, operation: &str, params: &ParameterSet) -> Result<Value, ApiError> {
        let request = self.build_request(operation, params)?;
        debug!(operation, method = %request.method, path = request.path(), "dispatching");

        let response = self.transport.execute(&request).inspect_err(|e| {
            warn!(operation, path = request.path(), error = %e, "exchange failed");
        })?;

        self.parse_response(response).inspect_err(|e| {
            debug!(operation, kind = %e.kind(), error = %e, "call failed");
        })
    }

    /// Build the request for `operation` without sending it.
    ///
    /// Fails with `UnknownOperation` for a name outside the catalogue and
    /// with `InvalidParameters` when a required parameter is absent.
    pub fn build_request(&self, operation: &str, params: &ParameterSet) -> Result<HttpRequest, ApiError> {
        let descriptor = catalogue::lookup(operation)
            .ok_or_else(|| ApiError::UnknownOperation(operation.to_string()))?;
        check_parameters(descriptor, params)?;

        let method = catalogue::classify(descriptor, params);
        let url = self.endpoint.operation_url(descriptor.name);
        let encoded = codec::encode(params, self.api_key.expose());

        Ok(match method {
            HttpMethod::Get => HttpRequest {
                method,
                url: format!("{url}?{encoded}"),
                headers: Vec::new(),
                body: None,
            },
            HttpMethod::Post => HttpRequest {
                method,
                url,
                headers: vec![(
                    "content-type".to_string(),
                    format!("{FORM_CONTENT_TYPE}; charset=UTF-8"),
                )],
                body: Some(encoded),
            },
        })
    }

    /// Interpret a response.
    ///
    /// A 2xx body goes straight to the envelope parser. Other statuses are
    /// still parsed because the service reports some API errors that way;
    /// when no envelope can be read the status itself is the error.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        let status = response.status;
        let success = response.is_success();
        let body = self.charset.decode(response.body);

        if success {
            return Envelope::parse(&body?)?.into_result();
        }

        let envelope = body.ok().and_then(|text| Envelope::parse(&text).ok());
        match envelope {
            Some(envelope) => envelope.into_result(),
            None => Err(ApiError::transport(format!(
                "HTTP {status} without a response envelope"
            ))),
        }
    }
}

fn check_parameters(descriptor: &OperationDescriptor, params: &ParameterSet) -> Result<(), ApiError> {
    if let Some(missing) = descriptor.missing_parameter(params) {
        return Err(ApiError::InvalidParameters(format!(
            "{} requires parameter {missing}",
            descriptor.name
        )));
    }
    for (name, _) in params.iter() {
        if !descriptor.accepts(name) {
            debug!(operation = descriptor.name, parameter = name, "undeclared parameter passed through");
        }
    }
    Ok(())
}
