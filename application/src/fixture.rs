//! Fixtures for testing the HTTP API over an in-memory database.

use axum::{body::Body, Router};
use http::{header, Request, StatusCode};
use serde_json::{json, Value};
use service::{infra::Memory, Service};
use tower::ServiceExt as _;

use crate::api;

/// Creates a new HTTP API [`Router`] over an empty in-memory database.
pub(crate) fn app() -> Router {
    app_with_database().0
}

/// Creates a new HTTP API [`Router`] along with the in-memory database it
/// operates on.
pub(crate) fn app_with_database() -> (Router, Memory) {
    let db = Memory::new();
    let app = api::router(Service::new(service::Config::default(), db.clone()));
    (app, db)
}

/// Sends a request with the provided raw `body` and returns the response
/// status along with its raw body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    if body.is_some() {
        req = req.header(header::CONTENT_TYPE, "application/json");
    }
    let req = req.body(body.map_or_else(Body::empty, Body::from)).unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// Sends a request with the provided JSON `body` and returns the response
/// status along with its JSON body ([`Value::Null`] if empty).
pub(crate) async fn json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|b| b.to_string());
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Sends a request with the provided unparsed `body`.
pub(crate) async fn raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: &str,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, Some(body.to_owned())).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Sends a bodiless request and returns the response as text.
pub(crate) async fn text(
    app: &Router,
    method: &str,
    uri: &str,
) -> (StatusCode, String) {
    let (status, bytes) = send(app, method, uri, None).await;
    (status, String::from_utf8(bytes).unwrap())
}

/// Sells a newly created farm to a newly created client, returning the
/// created transaction.
pub(crate) async fn sale(app: &Router) -> Value {
    let (status, _) = json(
        app,
        "POST",
        "/clientes",
        Some(json!({
            "nome": "João Silva",
            "email": "joao@example.com",
            "telefone": "11999999999",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = json(
        app,
        "POST",
        "/fazendas",
        Some(json!({
            "nome": "Fazenda Boa Vista",
            "localizacao": "POINT(-47.9292 -15.7801)",
            "area": 100,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = json(
        app,
        "POST",
        "/transacoes",
        Some(json!({
            "cliente_id": 1,
            "fazenda_id": 1,
            "data_transacao": "2023-10-01",
            "valor": 500_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}
