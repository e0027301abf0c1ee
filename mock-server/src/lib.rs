//! In-memory stand-in for an Etherpad server's HTTP API.
//!
//! Serves `/api/{version}/{operation}` and answers every call with the
//! `{code, message, data}` envelope. Mutating operations must arrive as
//! POST with a form body and reads as GET with a query string, mirroring
//! what the client is expected to send.

pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

use crate::store::{Failure, Store};

pub const DEFAULT_API_KEY: &str = "a04f17343b51afaa036a7428171dd873469cd85911ab43be0503d29d2acbbd58";

/// Operations that must be sent as POST.
pub const POST_OPERATIONS: &[&str] = &[
    "appendChatMessage",
    "appendText",
    "copyPad",
    "createAuthorIfNotExistsFor",
    "createGroup",
    "createGroupIfNotExistsFor",
    "createGroupPad",
    "createPad",
    "createSession",
    "deleteGroup",
    "deletePad",
    "deleteSession",
    "movePad",
    "restoreRevision",
    "saveRevision",
    "sendClientsMessage",
    "setHTML",
    "setPassword",
    "setPublicStatus",
    "setText",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub code: i64,
    pub message: String,
    pub data: Value,
}

pub struct AppState {
    api_key: String,
    store: RwLock<Store>,
}

pub type Db = Arc<AppState>;

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let db: Db = Arc::new(AppState {
        api_key: api_key.to_string(),
        store: RwLock::new(Store::default()),
    });
    Router::new()
        .route("/api/{version}/{operation}", get(handle_get).post(handle_post))
        .with_state(db)
}

pub async fn run_with_key(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

/// Verb the client must use for `operation` given its parameters.
fn expected_method(operation: &str, params: &[(String, String)]) -> Method {
    let mutating = if operation == "createAuthor" {
        params.iter().any(|(k, _)| k == "name")
    } else {
        POST_OPERATIONS.contains(&operation)
    };
    if mutating {
        Method::POST
    } else {
        Method::GET
    }
}

async fn handle_get(
    State(db): State<Db>,
    Path((_version, operation)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    dispatch(db, Method::GET, &operation, params).await
}

async fn handle_post(
    State(db): State<Db>,
    Path((_version, operation)): Path<(String, String)>,
    Form(params): Form<Vec<(String, String)>>,
) -> Response {
    dispatch(db, Method::POST, &operation, params).await
}

async fn dispatch(db: Db, method: Method, operation: &str, params: Vec<(String, String)>) -> Response {
    let expected = expected_method(operation, &params);
    if method != expected {
        debug!(operation, %method, %expected, "wrong verb");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            format!("{operation} must be sent as {expected}"),
        )
            .into_response();
    }

    let key_ok = params
        .iter()
        .any(|(k, v)| k == "apikey" && *v == db.api_key);
    let outcome = if key_ok {
        db.store.write().await.execute(operation, &params)
    } else {
        Err(Failure {
            code: 4,
            message: "no or wrong API Key".to_string(),
        })
    };

    let (status, envelope) = match outcome {
        Ok(data) => (
            StatusCode::OK,
            Envelope {
                code: 0,
                message: "ok".to_string(),
                data,
            },
        ),
        Err(failure) => (
            status_for(failure.code),
            Envelope {
                code: failure.code,
                message: failure.message,
                data: Value::Null,
            },
        ),
    };
    debug!(operation, code = envelope.code, "handled");
    (status, Json(envelope)).into_response()
}

fn status_for(code: i64) -> StatusCode {
    match code {
        1 => StatusCode::BAD_REQUEST,
        3 => StatusCode::NOT_FOUND,
        4 => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(names: &[&str]) -> Vec<(String, String)> {
        names.iter().map(|n| (n.to_string(), String::new())).collect()
    }

    #[test]
    fn envelope_serializes_null_data() {
        let env = Envelope {
            code: 0,
            message: "ok".to_string(),
            data: Value::Null,
        };
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"code":0,"message":"ok","data":null}"#);
    }

    #[test]
    fn reads_are_get_and_writes_are_post() {
        assert_eq!(expected_method("getText", &pairs(&["padID"])), Method::GET);
        assert_eq!(expected_method("createPad", &pairs(&["padID"])), Method::POST);
    }

    #[test]
    fn create_author_verb_follows_name() {
        assert_eq!(expected_method("createAuthor", &[]), Method::GET);
        assert_eq!(expected_method("createAuthor", &pairs(&["name"])), Method::POST);
    }

    #[test]
    fn status_codes_follow_envelope_code() {
        assert_eq!(status_for(1), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(2), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(3), StatusCode::NOT_FOUND);
        assert_eq!(status_for(4), StatusCode::UNAUTHORIZED);
    }
}
