//! [`Transaction`]-related HTTP API.
//!
//! [`Transaction`]: domain::Transaction

use axum::{
    extract::rejection::JsonRejection,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use service::{
    command::{
        self, CreateTransaction, DeleteTransaction, UpdateTransaction,
    },
    domain::{self, client, farm, transaction},
    infra::database,
    query, read, Command, Query,
};
use tracerr::Traced;

use crate::{AsError, Error};

use super::{
    constraint_violation, rejected,
    validate::{required, Object},
    Id, Pagination, Rejection, Shared,
};

/// [`Service`] capable of serving the [`Transaction`]-related HTTP API.
///
/// [`Service`]: service::Service
/// [`Transaction`]: domain::Transaction
pub trait Api:
    Shared
    + Command<
        CreateTransaction,
        Ok = domain::Transaction,
        Err = Traced<command::create_transaction::ExecutionError>,
    > + Command<
        UpdateTransaction,
        Ok = domain::Transaction,
        Err = Traced<command::update_transaction::ExecutionError>,
    > + Command<
        DeleteTransaction,
        Ok = domain::Transaction,
        Err = Traced<command::delete_transaction::ExecutionError>,
    > + Query<
        query::transaction::ById,
        Ok = Option<domain::Transaction>,
        Err = Traced<database::Error>,
    > + Query<
        query::transactions::List,
        Ok = read::transaction::list::Page,
        Err = Traced<database::Error>,
    >
{
}

impl<S> Api for S where
    S: Shared
        + Command<
            CreateTransaction,
            Ok = domain::Transaction,
            Err = Traced<command::create_transaction::ExecutionError>,
        > + Command<
            UpdateTransaction,
            Ok = domain::Transaction,
            Err = Traced<command::update_transaction::ExecutionError>,
        > + Command<
            DeleteTransaction,
            Ok = domain::Transaction,
            Err = Traced<command::delete_transaction::ExecutionError>,
        > + Query<
            query::transaction::ById,
            Ok = Option<domain::Transaction>,
            Err = Traced<database::Error>,
        > + Query<
            query::transactions::List,
            Ok = read::transaction::list::Page,
            Err = Traced<database::Error>,
        >
{
}

/// Routes of the [`Transaction`]-related HTTP API.
///
/// [`Transaction`]: domain::Transaction
pub fn routes<S: Api>() -> Router {
    Router::new()
        .route("/", get(list::<S>).post(create::<S>))
        .route(
            "/:id",
            get(get_by_id::<S>).put(update::<S>).delete(delete::<S>),
        )
}

/// JSON representation of a [`domain::Transaction`].
#[derive(Clone, Debug, Serialize)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    pub id: transaction::Id,

    /// ID of the buying [`Client`].
    ///
    /// [`Client`]: domain::Client
    #[serde(rename = "cliente_id")]
    pub client_id: client::Id,

    /// ID of the sold [`Farm`].
    ///
    /// [`Farm`]: domain::Farm
    #[serde(rename = "fazenda_id")]
    pub farm_id: farm::Id,

    /// Date of this [`Transaction`].
    #[serde(
        rename = "data_transacao",
        serialize_with = "common::datetime::serde::rfc3339::serialize"
    )]
    pub date: transaction::Date,

    /// Amount of this [`Transaction`].
    #[serde(rename = "valor")]
    pub amount: transaction::Amount,
}

impl From<domain::Transaction> for Transaction {
    fn from(transaction: domain::Transaction) -> Self {
        let domain::Transaction {
            id,
            client_id,
            farm_id,
            date,
            amount,
        } = transaction;
        Self {
            id,
            client_id,
            farm_id,
            date,
            amount,
        }
    }
}

/// Validated body of [`Transaction`] creation and update requests.
#[derive(Clone, Copy, Debug)]
pub struct Input {
    /// ID of the [`Client`] buying the [`Farm`].
    ///
    /// [`Client`]: domain::Client
    /// [`Farm`]: domain::Farm
    pub client_id: client::Id,

    /// ID of the [`Farm`] being sold.
    ///
    /// [`Farm`]: domain::Farm
    pub farm_id: farm::Id,

    /// [`transaction::Date`] of the sale.
    pub date: transaction::Date,

    /// [`transaction::Amount`] of the sale.
    pub amount: transaction::Amount,
}

impl Input {
    /// Validates the provided JSON `body`.
    ///
    /// # Errors
    ///
    /// With the message of the first violated rule.
    pub fn parse(body: &Value) -> Result<Self, Error> {
        let obj = Object::new(body)?;

        let client_id = required("cliente_id", obj.integer("cliente_id")?)?;
        let farm_id = required("fazenda_id", obj.integer("fazenda_id")?)?;
        let date = required("data_transacao", obj.date("data_transacao")?)?;
        let amount = required("valor", obj.positive("valor")?)?;
        obj.only(&["cliente_id", "fazenda_id", "data_transacao", "valor"])?;

        Ok(Self {
            client_id: client_id.into(),
            farm_id: farm_id.into(),
            date,
            amount: amount.into(),
        })
    }
}

/// Sells a [`Farm`] to a [`Client`].
///
/// [`Client`]: domain::Client
/// [`Farm`]: domain::Farm
#[tracing::instrument(skip_all)]
async fn create<S: Api>(
    Extension(service): Extension<S>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Transaction>), Error> {
    let Json(body) = body.map_err(|e| e.as_error())?;
    let Input {
        client_id,
        farm_id,
        date,
        amount,
    } = Input::parse(&body)?;

    service
        .execute(CreateTransaction {
            client_id,
            farm_id,
            date,
            amount,
        })
        .await
        .map(|tx| (http::StatusCode::CREATED, Json(Transaction::from(tx))))
        .map_err(|e| e.as_error_of("Erro ao criar transação"))
}

/// Lists a page of [`Transaction`]s.
#[tracing::instrument(skip_all, fields(pagination = ?pagination))]
async fn list<S: Api>(
    Extension(service): Extension<S>,
    pagination: Pagination,
) -> Result<Json<Vec<Transaction>>, Error> {
    let args = pagination.arguments(service.config())?;

    service
        .execute(query::transactions::List::by(args))
        .await
        .map(|page| Json(page.into_iter().map(Transaction::from).collect()))
        .map_err(|e| e.as_error_of("Erro ao obter transações"))
}

/// Returns a single [`Transaction`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn get_by_id<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<transaction::Id>,
) -> Result<Json<Transaction>, Error> {
    service
        .execute(query::transaction::ById::by(id))
        .await
        .map_err(|e| e.as_error_of("Erro ao buscar transação"))?
        .map(|tx| Json(Transaction::from(tx)))
        .ok_or_else(|| Rejection::TransactionNotFound.into())
}

/// Replaces an existing [`Transaction`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn update<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<transaction::Id>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Json(body) = body.map_err(|e| e.as_error())?;
    let Input {
        client_id,
        farm_id,
        date,
        amount,
    } = Input::parse(&body)?;

    service
        .execute(UpdateTransaction {
            id,
            client_id,
            farm_id,
            date,
            amount,
        })
        .await
        .map(|tx| Json(Transaction::from(tx)))
        .map_err(|e| e.as_error_of("Erro ao atualizar transação"))
}

/// Deletes an existing [`Transaction`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn delete<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<transaction::Id>,
) -> Result<http::StatusCode, Error> {
    service
        .execute(DeleteTransaction { id })
        .await
        .map(|_| http::StatusCode::NO_CONTENT)
        .map_err(|e| e.as_error_of("Erro ao deletar transação"))
}

impl AsError for command::create_transaction::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Rejected(verdict) => rejected(*verdict),
        }
    }
}

impl AsError for command::update_transaction::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => constraint_violation(e),
            Self::Rejected(verdict) => rejected(*verdict),
        }
    }
}

impl AsError for command::delete_transaction::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::TransactionNotExists(_) => {
                Some(Rejection::TransactionNotFound.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use http::StatusCode;
    use serde_json::json;

    use crate::fixture;

    #[tokio::test]
    async fn sells_farm_once() {
        let app = fixture::app();
        _ = fixture::sale(&app).await;
        _ = fixture::json(
            &app,
            "POST",
            "/clientes",
            Some(json!({"nome": "Maria", "email": "maria@example.com"})),
        )
        .await;

        let (status, body) = fixture::json(
            &app,
            "POST",
            "/transacoes",
            Some(json!({
                "cliente_id": 2,
                "fazenda_id": 1,
                "data_transacao": "2023-11-01",
                "valor": 600_000,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Esta fazenda já foi vendida"}));
    }

    #[tokio::test]
    async fn creates_transaction() {
        let app = fixture::app();

        let body = fixture::sale(&app).await;

        assert_eq!(
            body,
            json!({
                "id": 1,
                "cliente_id": 1,
                "fazenda_id": 1,
                "data_transacao": "2023-10-01T00:00:00Z",
                "valor": 500_000,
            }),
        );
    }

    #[tokio::test]
    async fn accepts_dates_without_offset() {
        let app = fixture::app();

        for (id, (date, expected)) in [
            ("2023-10-01T12:00:00", "2023-10-01T12:00:00Z"),
            ("2023-10-01 12:00:00", "2023-10-01T12:00:00Z"),
            ("2023/10/01", "2023-10-01T00:00:00Z"),
        ]
        .into_iter()
        .enumerate()
        {
            _ = fixture::json(
                &app,
                "POST",
                "/clientes",
                Some(json!({"nome": "Maria", "email": "maria@example.com"})),
            )
            .await;
            _ = fixture::json(
                &app,
                "POST",
                "/fazendas",
                Some(json!({"nome": "Sol", "localizacao": "POINT(1 1)", "area": 1})),
            )
            .await;

            let (status, body) = fixture::json(
                &app,
                "POST",
                "/transacoes",
                Some(json!({
                    "cliente_id": id + 1,
                    "fazenda_id": id + 1,
                    "data_transacao": date,
                    "valor": 10,
                })),
            )
            .await;

            assert_eq!(status, StatusCode::CREATED, "{date}");
            assert_eq!(body["data_transacao"], expected, "{date}");
        }
    }

    #[tokio::test]
    async fn checks_client_before_farm() {
        let app = fixture::app();

        let (status, body) = fixture::json(
            &app,
            "POST",
            "/transacoes",
            Some(json!({
                "cliente_id": 999,
                "fazenda_id": 999,
                "data_transacao": "2023-10-01",
                "valor": 1,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Cliente não encontrado"}));
    }

    #[tokio::test]
    async fn checks_farm_existence() {
        let app = fixture::app();
        _ = fixture::json(
            &app,
            "POST",
            "/clientes",
            Some(json!({"nome": "Maria", "email": "maria@example.com"})),
        )
        .await;

        let (status, body) = fixture::json(
            &app,
            "POST",
            "/transacoes",
            Some(json!({
                "cliente_id": 1,
                "fazenda_id": 999,
                "data_transacao": "2023-10-01",
                "valor": 1,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Fazenda não encontrada"}));
    }

    #[tokio::test]
    async fn validates_transaction() {
        let app = fixture::app();

        for (input, error) in [
            (
                json!({"fazenda_id": 1, "data_transacao": "2023-10-01", "valor": 1}),
                "\"cliente_id\" is required",
            ),
            (
                json!({
                    "cliente_id": 1.5,
                    "fazenda_id": 1,
                    "data_transacao": "2023-10-01",
                    "valor": 1,
                }),
                "\"cliente_id\" must be an integer",
            ),
            (
                json!({
                    "cliente_id": 1,
                    "fazenda_id": 1,
                    "data_transacao": "ontem",
                    "valor": 1,
                }),
                "\"data_transacao\" must be a valid date",
            ),
            (
                json!({
                    "cliente_id": 1,
                    "fazenda_id": 1,
                    "data_transacao": "2023-10-01",
                    "valor": -10,
                }),
                "\"valor\" must be a positive number",
            ),
        ] {
            let (status, body) =
                fixture::json(&app, "POST", "/transacoes", Some(input)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{error}");
            assert_eq!(body, json!({"error": error}));
        }
    }

    #[tokio::test]
    async fn updates_without_sold_check() {
        let app = fixture::app();
        _ = fixture::sale(&app).await;

        let (status, body) = fixture::json(
            &app,
            "PUT",
            "/transacoes/1",
            Some(json!({
                "cliente_id": 1,
                "fazenda_id": 1,
                "data_transacao": "2023-12-24",
                "valor": "750000.50",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data_transacao"], "2023-12-24T00:00:00Z");
        assert_eq!(body["valor"], 750_000.5);
    }

    #[tokio::test]
    async fn rejects_update_selling_farm_twice() {
        let app = fixture::app();
        _ = fixture::sale(&app).await;
        _ = fixture::json(
            &app,
            "POST",
            "/fazendas",
            Some(json!({"nome": "Outra", "localizacao": "POINT(3 3)", "area": 5})),
        )
        .await;
        _ = fixture::json(
            &app,
            "POST",
            "/transacoes",
            Some(json!({
                "cliente_id": 1,
                "fazenda_id": 2,
                "data_transacao": "2023-10-02",
                "valor": 10,
            })),
        )
        .await;

        let (status, body) = fixture::json(
            &app,
            "PUT",
            "/transacoes/2",
            Some(json!({
                "cliente_id": 1,
                "fazenda_id": 1,
                "data_transacao": "2023-10-02",
                "valor": 10,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Erro de validação: ")));
    }

    #[tokio::test]
    async fn checks_transaction_first_on_update() {
        let app = fixture::app();

        let (status, body) = fixture::json(
            &app,
            "PUT",
            "/transacoes/5",
            Some(json!({
                "cliente_id": 999,
                "fazenda_id": 999,
                "data_transacao": "2023-10-01",
                "valor": 1,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Transação não encontrada"}));
    }

    #[tokio::test]
    async fn deletes_transaction_releasing_parties() {
        let app = fixture::app();
        _ = fixture::sale(&app).await;

        let (deleted, _) =
            fixture::json(&app, "DELETE", "/transacoes/1", None).await;
        let (again, error) =
            fixture::json(&app, "DELETE", "/transacoes/1", None).await;
        let (client, _) =
            fixture::json(&app, "DELETE", "/clientes/1", None).await;

        assert_eq!(deleted, StatusCode::NO_CONTENT);
        assert_eq!(again, StatusCode::NOT_FOUND);
        assert_eq!(error, json!({"error": "Transação não encontrada"}));
        assert_eq!(client, StatusCode::NO_CONTENT);
    }
}
