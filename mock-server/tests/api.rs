use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with_key, Envelope, DEFAULT_API_KEY};
use serde_json::json;
use tower::ServiceExt;

async fn body_envelope(response: axum::response::Response) -> Envelope {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(operation: &str, query: &str) -> Request<String> {
    let sep = if query.is_empty() { "" } else { "&" };
    Request::builder()
        .uri(format!("/api/1.2.13/{operation}?apikey={DEFAULT_API_KEY}{sep}{query}"))
        .body(String::new())
        .unwrap()
}

fn post_request(operation: &str, form: &str) -> Request<String> {
    let sep = if form.is_empty() { "" } else { "&" };
    Request::builder()
        .method("POST")
        .uri(format!("/api/1.2.13/{operation}"))
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded; charset=UTF-8",
        )
        .body(format!("apikey={DEFAULT_API_KEY}{sep}{form}"))
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

// --- api key ---

#[tokio::test]
async fn check_token_with_key_is_ok() {
    let app = app();
    let resp = send(&app, get_request("checkToken", "")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let env = body_envelope(resp).await;
    assert_eq!(env.code, 0);
    assert_eq!(env.message, "ok");
    assert_eq!(env.data, json!(null));
}

#[tokio::test]
async fn wrong_key_is_code_four() {
    let app = app_with_key("another-key");
    let resp = send(&app, get_request("checkToken", "")).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let env = body_envelope(resp).await;
    assert_eq!(env.code, 4);
    assert_eq!(env.message, "no or wrong API Key");
}

#[tokio::test]
async fn missing_key_is_code_four() {
    let app = app();
    let resp = send(
        &app,
        Request::builder()
            .uri("/api/1.2.13/checkToken")
            .body(String::new())
            .unwrap(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_envelope(resp).await.code, 4);
}

// --- verbs ---

#[tokio::test]
async fn mutating_operation_over_get_is_rejected() {
    let app = app();
    let resp = send(&app, get_request("createPad", "padID=p1")).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"createPad must be sent as POST");
}

#[tokio::test]
async fn read_operation_over_post_is_rejected() {
    let app = app();
    let resp = send(&app, post_request("getText", "padID=p1")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn create_author_accepts_get_without_name_and_post_with_name() {
    let app = app();

    let resp = send(&app, get_request("createAuthor", "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let anonymous = body_envelope(resp).await;
    assert!(anonymous.data["authorID"].as_str().unwrap().starts_with("a."));

    let resp = send(&app, post_request("createAuthor", "name=Ann+Author")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let named = body_envelope(resp).await;
    let author_id = named.data["authorID"].as_str().unwrap().to_string();

    let resp = send(&app, get_request("getAuthorName", &format!("authorID={author_id}"))).await;
    assert_eq!(body_envelope(resp).await.data, json!("Ann Author"));

    let resp = send(&app, get_request("createAuthor", "name=Ann")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- errors ---

#[tokio::test]
async fn unknown_operation_is_code_three() {
    let app = app();
    let resp = send(&app, get_request("getAttributePool", "padID=p1")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let env = body_envelope(resp).await;
    assert_eq!(env.code, 3);
    assert_eq!(env.message, "no such function");
    assert_eq!(env.data, json!(null));
}

#[tokio::test]
async fn missing_pad_is_code_one() {
    let app = app();
    let resp = send(&app, get_request("getText", "padID=nope")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let env = body_envelope(resp).await;
    assert_eq!(env.code, 1);
    assert_eq!(env.message, "padID does not exist");
}

// --- pads ---

#[tokio::test]
async fn create_then_read_pad() {
    let app = app();

    let resp = send(&app, post_request("createPad", "padID=p1&text=hello+world")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, get_request("getText", "padID=p1")).await;
    let env = body_envelope(resp).await;
    assert_eq!(env.data, json!({ "text": "hello world\n" }));

    let resp = send(&app, post_request("createPad", "padID=p1")).await;
    assert_eq!(body_envelope(resp).await.code, 1);
}

#[tokio::test]
async fn group_pad_id_survives_form_encoding() {
    let app = app();

    let resp = send(&app, post_request("createGroup", "")).await;
    let group_id = body_envelope(resp).await.data["groupID"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = send(
        &app,
        post_request("createGroupPad", &format!("groupID={group_id}&padName=notes")),
    )
    .await;
    let pad_id = body_envelope(resp).await.data["padID"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(pad_id, format!("{group_id}$notes"));

    let encoded = pad_id.replace('$', "%24");
    let resp = send(&app, get_request("getText", &format!("padID={encoded}"))).await;
    assert_eq!(body_envelope(resp).await.code, 0);
}
