//! Router integration harness.
//!
//! # What this covers
//!
//! - **JSON API**: `/api/invoices` and `/api/travel` report the board state
//!   (loading, ready, failed) inside the response envelope.
//! - **Raw view**: `/api/invoices/{index}/json` returns the re-indented
//!   embedded JSON of one invoice.
//! - **Pages**: `/invoices` and `/travel` render the normalised records.
//! - **Reload**: `POST /api/{board}/reload` starts a new fetch.
//!
//! Webhooks are served by `mockito`; requests go through the router with
//! `tower::ServiceExt::oneshot`, no socket is bound.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mockito::{Server, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use webhook_board::api::routes::create_router;
use webhook_board::config::Config;
use webhook_board::AppState;

const INVOICE_BODY: &str = r#"[
    {"row_number": 2, "name": "f1.pdf", "date": "2025-05-01", "json": "{\"supplier\":\"ACME\",\"number\":\"A1\",\"devise\":\"EUR\",\"resume\":\"Chaises\"}", "file": " `https://files.example/a1.pdf` "},
    {"row_number": 3, "name": "f2.pdf", "date": "2025-05-02", "json": "not json"},
    {"row_number": 4, "name": "f3.pdf", "date": "2025-05-03", "json": "{\"supplier\":\"Globex\",\"number\":\"B2\",\"taxes\":\"\"}"}
]"#;

fn travel_body() -> String {
    let voyages = json!([
        { "permalink": "/voyage/islande", "image_principale": "/img/islande.jpg", "description": "<p>Glaciers</p>", "titre": "Islande" }
    ]);
    let info = json!([{ "code": "IS", "text": "<p>Pas de visa</p>" }]);
    json!([{ "json": voyages.to_string(), "info_travel": info.to_string() }]).to_string()
}

fn state_for(server: &ServerGuard) -> AppState {
    let vars: HashMap<&str, String> = HashMap::from([
        ("INVOICE_WEBHOOK_URL", format!("{}/invoices", server.url())),
        ("TRAVEL_WEBHOOK_URL", format!("{}/travel", server.url())),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    AppState::new(config)
}

async fn send(state: &AppState, method: &str, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(state: &AppState, method: &str, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(state, method, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn invoices_are_loading_until_the_first_fetch() {
    let server = Server::new_async().await;
    let state = state_for(&server);

    let (status, body) = send_json(&state, "GET", "/api/invoices").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["meta"]["status"], "loading");
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn invoices_api_returns_only_parseable_rows() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", "/invoices")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(INVOICE_BODY)
        .create_async()
        .await;
    let state = state_for(&server);
    assert!(state.invoices.refresh().await);

    let (status, body) = send_json(&state, "GET", "/api/invoices").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["data"]["count"], 2);
    let invoices = body["data"]["invoices"].as_array().unwrap();
    assert_eq!(invoices[0]["parsed"]["number"], "A1");
    assert_eq!(invoices[0]["parsed"]["currency"], "EUR");
    assert_eq!(invoices[0]["file"], "https://files.example/a1.pdf");
    assert_eq!(invoices[1]["parsed"]["supplier"], "Globex");
    assert!(invoices[1].get("file").is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn failed_webhook_is_reported_as_bad_gateway() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/invoices")
        .with_status(500)
        .create_async()
        .await;
    let state = state_for(&server);
    state.invoices.refresh().await;

    let (status, body) = send_json(&state, "GET", "/api/invoices").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["meta"]["status"], "error");
    let message = body["meta"]["message"].as_str().unwrap();
    assert!(message.starts_with("Impossible de charger les factures."));

    let (status, page) = send(&state, "GET", "/invoices").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("role=\"alert\""));
}

#[tokio::test]
async fn raw_json_view_is_reindented() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/invoices")
        .with_status(200)
        .with_body(INVOICE_BODY)
        .create_async()
        .await;
    let state = state_for(&server);
    state.invoices.refresh().await;

    let (status, body) = send_json(&state, "GET", "/api/invoices/1/json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["number"], "B2");
    assert_eq!(
        body["data"]["json"],
        "{\n  \"supplier\": \"Globex\",\n  \"number\": \"B2\",\n  \"taxes\": \"\"\n}"
    );

    let (status, _) = send(&state, "GET", "/api/invoices/7/json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn travel_api_and_page_render_listing() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/travel")
        .with_status(200)
        .with_body(travel_body())
        .create_async()
        .await;
    let state = state_for(&server);
    state.travel.refresh().await;

    let (status, body) = send_json(&state, "GET", "/api/travel").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["voyages"][0]["title"], "Islande");
    assert_eq!(body["data"]["country_info"][0]["code"], "IS");

    let (status, page) = send(&state, "GET", "/travel").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<p>Glaciers</p>"));
    assert!(page.contains("<p>Pas de visa</p>"));
    assert!(page.contains("Islande"));
}

#[tokio::test]
async fn travel_without_info_still_lists_voyages() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/travel")
        .with_status(200)
        .with_body(r#"[{"json":"[{\"titre\":\"Maroc\"}]"}]"#)
        .create_async()
        .await;
    let state = state_for(&server);
    state.travel.refresh().await;

    let (_, body) = send_json(&state, "GET", "/api/travel").await;

    assert_eq!(body["data"]["voyages"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["country_info"], json!([]));
}

#[tokio::test]
async fn reload_starts_a_background_fetch() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/invoices")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let state = state_for(&server);

    let (status, body) = send_json(&state, "POST", "/api/invoices/reload").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["board"], "invoices");
    assert_eq!(body["data"]["started"], true);
}

#[tokio::test]
async fn root_redirects_and_health_answers() {
    let server = Server::new_async().await;
    let state = state_for(&server);

    let (status, _) = send(&state, "GET", "/").await;
    assert!(status.is_redirection());

    let (status, body) = send(&state, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
