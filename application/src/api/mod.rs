//! HTTP API definitions.

pub mod client;
pub mod farm;
pub mod transaction;
pub mod validate;

use std::any::Any;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    response::{Html, IntoResponse as _, Response},
    routing::get,
    Extension, Router,
};
use common::pagination;
use http::request::Parts;
use serde::Deserialize;
use service::{check::Verdict, infra::database};
use tower_http::catch_panic::CatchPanicLayer;
use tracing as log;

use crate::{define_error, error::root_cause, Error};

/// Text of the `GET /` response.
pub const WELCOME: &str =
    "Desejo-lhe boas-vindas à API de Gestão de Fazendas!";

/// HTML page returned for unknown routes.
pub const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>\
<html lang=\"pt-BR\">\
<head><meta charset=\"utf-8\"><title>404</title></head>\
<body>\
<h1>404</h1>\
<p>Rota não encontrada, a URL solicitada não existe. \
Verifique o endereço e tente novamente.</p>\
<p>Consulte a documentação em <a href=\"/api-docs\">/api-docs</a>.</p>\
</body>\
</html>";

/// [`Service`] capable of serving the whole HTTP API.
///
/// [`Service`]: service::Service
pub trait Api: client::Api + farm::Api + transaction::Api {}

impl<S> Api for S where S: client::Api + farm::Api + transaction::Api {}

/// Requirements shared by all the HTTP API handlers.
pub trait Shared: Clone + Send + Sync + 'static {
    /// Returns [`service::Config`] of this [`Service`].
    ///
    /// [`Service`]: service::Service
    fn config(&self) -> &service::Config;
}

impl<Db> Shared for service::Service<Db>
where
    Db: Clone + Send + Sync + 'static,
{
    fn config(&self) -> &service::Config {
        Self::config(self)
    }
}

/// Builds the HTTP API [`Router`] over the provided [`Service`].
///
/// [`Service`]: service::Service
pub fn router<S: Api>(service: S) -> Router {
    Router::new()
        .route("/", get(welcome))
        .nest("/clientes", client::routes::<S>())
        .nest("/fazendas", farm::routes::<S>())
        .nest("/transacoes", transaction::routes::<S>())
        .fallback(not_found)
        .layer(Extension(service))
        .layer(CatchPanicLayer::custom(on_panic))
}

/// Greets the API user.
async fn welcome() -> &'static str {
    WELCOME
}

/// Responds to requests of unknown routes.
async fn not_found() -> (http::StatusCode, Html<&'static str>) {
    (http::StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE))
}

/// Turns a panic of a handler into an [`Error`] response.
fn on_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let details = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload");
    log::error!("handler panicked: {details}");

    Error::from(Rejection::Unexpected).into_response()
}

define_error! {
    enum Rejection {
        #[code = "INVALID_ID"]
        #[status = BAD_REQUEST]
        #[message = "ID deve ser um número inteiro"]
        InvalidId,

        #[code = "INVALID_PAGINATION"]
        #[status = BAD_REQUEST]
        #[message = "Parâmetros de paginação inválidos"]
        InvalidPagination,

        #[code = "CLIENT_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Cliente não encontrado"]
        ClientNotFound,

        #[code = "FARM_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Fazenda não encontrada"]
        FarmNotFound,

        #[code = "TRANSACTION_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Transação não encontrada"]
        TransactionNotFound,

        #[code = "FARM_ALREADY_SOLD"]
        #[status = BAD_REQUEST]
        #[message = "Esta fazenda já foi vendida"]
        FarmAlreadySold,

        #[code = "UNEXPECTED"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Algo deu errado!"]
        Unexpected,
    }
}

/// Integer ID extracted from the `:id` path segment.
///
/// Any numeric notation of an integer is accepted.
#[derive(Clone, Copy, Debug)]
pub struct Id<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Id<T>
where
    S: Send + Sync,
    T: From<i32> + Send,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| Rejection::InvalidId)?;
        parse_id(&raw)
            .map(|id| Self(id.into()))
            .ok_or_else(|| Rejection::InvalidId.into())
    }
}

/// Parses an integral ID, accepting any numeric notation of an integer (like
/// `1.0` or `1e2`).
fn parse_id(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i32>() {
        return Some(id);
    }
    let num = raw.parse::<f64>().ok().filter(|n| n.is_finite())?;
    if num.fract() != 0.0
        || num < f64::from(i32::MIN)
        || num > f64::from(i32::MAX)
    {
        return None;
    }
    #[expect(clippy::cast_possible_truncation, reason = "checked above")]
    let id = num as i32;
    Some(id)
}

/// Raw `page` and `limit` query parameters.
#[derive(Debug, Default, Deserialize)]
struct RawPagination {
    /// Requested page number.
    page: Option<String>,

    /// Requested page size.
    limit: Option<String>,
}

/// Validated `page` and `limit` query parameters.
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// Requested page number, if any.
    pub page: Option<u32>,

    /// Requested page size, if any.
    pub limit: Option<u32>,
}

impl Pagination {
    /// Turns this [`Pagination`] into [`pagination::Arguments`], falling back
    /// to the configured page size.
    ///
    /// # Errors
    ///
    /// If the requested page is `0`.
    pub fn arguments(
        self,
        config: &service::Config,
    ) -> Result<pagination::Arguments, Error> {
        pagination::Arguments::new(
            self.page,
            self.limit,
            config.default_page_limit,
        )
        .ok_or_else(|| Rejection::InvalidPagination.into())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Query(RawPagination { page, limit }) =
            Query::try_from_uri(&parts.uri)
                .map_err(|_| Rejection::InvalidPagination)?;

        let parse = |raw: Option<String>| {
            raw.map(|v| v.trim().parse::<u32>())
                .transpose()
                .map_err(|_| Error::from(Rejection::InvalidPagination))
        };
        Ok(Self {
            page: parse(page)?,
            limit: parse(limit)?,
        })
    }
}

/// Converts a [`database::Error`] violating integrity constraints into a
/// validation [`Error`].
fn constraint_violation(err: &database::Error) -> Option<Error> {
    err.is_constraint_violation().then(|| {
        Error::bad_request(&format!("Erro de validação: {}", root_cause(err)))
    })
}

/// Converts a negative [`Verdict`] into an [`Error`].
fn rejected(verdict: Verdict) -> Option<Error> {
    match verdict {
        Verdict::Proceed => None,
        Verdict::ClientNotExists(_) => Some(Rejection::ClientNotFound.into()),
        Verdict::FarmNotExists(_) => Some(Rejection::FarmNotFound.into()),
        Verdict::FarmAlreadySold(_) => Some(Rejection::FarmAlreadySold.into()),
        Verdict::TransactionNotExists(_) => {
            Some(Rejection::TransactionNotFound.into())
        }
    }
}

#[cfg(test)]
mod spec {
    use http::StatusCode;
    use serde_json::json;

    use crate::fixture;

    #[tokio::test]
    async fn welcomes() {
        let app = fixture::app();

        let (status, text) = fixture::text(&app, "GET", "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(text.contains(super::WELCOME));
    }

    #[tokio::test]
    async fn renders_not_found_page() {
        let app = fixture::app();

        let (status, text) = fixture::text(&app, "GET", "/rota-invalida").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(text.contains(
            "Rota não encontrada, a URL solicitada não existe. \
             Verifique o endereço e tente novamente.",
        ));
        assert!(text.contains("/api-docs"));
    }

    #[tokio::test]
    async fn rejects_non_integer_ids() {
        let app = fixture::app();

        for uri in ["/clientes/abc", "/fazendas/1.5", "/transacoes/x1"] {
            let (status, body) = fixture::json(&app, "GET", uri, None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({"error": "ID deve ser um número inteiro"}));
        }
        let (status, _) = fixture::json(&app, "DELETE", "/clientes/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn accepts_integral_ids_in_any_notation() {
        let app = fixture::app();
        _ = fixture::json(
            &app,
            "POST",
            "/clientes",
            Some(json!({"nome": "Maria", "email": "maria@example.com"})),
        )
        .await;

        for uri in ["/clientes/1", "/clientes/1.0", "/clientes/1e0", "/clientes/%201"] {
            let (status, body) = fixture::json(&app, "GET", uri, None).await;

            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["id"], 1, "{uri}");
        }
        let (status, _) =
            fixture::json(&app, "GET", "/clientes/1e2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn parses_ids() {
        assert_eq!(super::parse_id("7"), Some(7));
        assert_eq!(super::parse_id("7.0"), Some(7));
        assert_eq!(super::parse_id("1e2"), Some(100));
        assert_eq!(super::parse_id("-3"), Some(-3));

        assert_eq!(super::parse_id("1.5"), None);
        assert_eq!(super::parse_id("abc"), None);
        assert_eq!(super::parse_id("NaN"), None);
        assert_eq!(super::parse_id("inf"), None);
        assert_eq!(super::parse_id("1e10"), None);
    }

    #[tokio::test]
    async fn rejects_invalid_pagination() {
        let app = fixture::app();

        for uri in [
            "/clientes?page=0",
            "/fazendas?page=abc",
            "/transacoes?limit=-1",
        ] {
            let (status, body) = fixture::json(&app, "GET", uri, None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                body,
                json!({"error": "Parâmetros de paginação inválidos"}),
            );
        }
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let app = fixture::app();

        let (status, body) =
            fixture::raw(&app, "POST", "/clientes", "{\"nome\": ").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn reports_unavailable_database() {
        let (app, db) = fixture::app_with_database();
        db.set_unavailable(true).await;

        let (status, body) = fixture::json(&app, "GET", "/clientes", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Erro ao obter clientes: database is unavailable"}),
        );
    }

    #[tokio::test]
    async fn recovers_from_panics() {
        async fn explode() -> &'static str {
            panic!("boom")
        }

        let app = axum::Router::new()
            .route("/", axum::routing::get(explode))
            .layer(tower_http::catch_panic::CatchPanicLayer::custom(
                super::on_panic,
            ));

        let (status, body) = fixture::json(&app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Algo deu errado!"}));
    }
}
