//! Blocking client for the Etherpad HTTP API.
//!
//! # Overview
//! Every API call is a named operation plus a set of named parameters. The
//! client turns that pair into one HTTP request against
//! `scheme://host:port/api/<version>/<operation>`, sends it, and reads the
//! `{code, message, data}` envelope back into `data` or an [`ApiError`].
//!
//! # Design
//! - The operation table in [`catalogue`] decides GET or POST; the only
//!   exception is `createAuthor`, which is POST when given a `name`.
//! - Parameters are form encoded in insertion order after the API key, in
//!   the query string for GET and in the body for POST.
//! - `EtherpadClient` holds only immutable settings plus a [`Transport`],
//!   so request building and envelope parsing can be tested without I/O.
//! - Each call is one exchange; nothing is retried, cached or batched.
//! - [`operations`] adds one typed method per API operation on top of
//!   [`EtherpadClient::invoke`].

pub mod catalogue;
pub mod client;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http;
pub mod operations;
pub mod params;
pub mod transport;
pub mod types;

pub use catalogue::{OperationDescriptor, DEFAULT_API_VERSION};
pub use client::EtherpadClient;
pub use config::{ApiKey, Charset, ClientConfig};
pub use endpoint::{is_secure, Endpoint};
pub use envelope::Envelope;
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{ParamValue, ParameterSet};
pub use transport::{Transport, UreqTransport};
pub use types::{AttributePool, ChatMessage, DiffHtml, PadUser, SessionExpiry, SessionInfo};

/// Untyped `data` of a successful envelope.
pub use serde_json::Value;
