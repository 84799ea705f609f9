//! [`Client`]-related HTTP API.
//!
//! [`Client`]: domain::Client

use axum::{
    extract::rejection::JsonRejection,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use service::{
    command::{self, CreateClient, DeleteClient, UpdateClient},
    domain::{self, client},
    infra::database,
    query, read, Command, Query,
};
use tracerr::Traced;

use crate::{define_error, AsError, Error};

use super::{
    constraint_violation,
    validate::{required, Object},
    Id, Pagination, Rejection, Shared,
};

/// [`Service`] capable of serving the [`Client`]-related HTTP API.
///
/// [`Client`]: domain::Client
/// [`Service`]: service::Service
pub trait Api:
    Shared
    + Command<
        CreateClient,
        Ok = domain::Client,
        Err = Traced<command::create_client::ExecutionError>,
    > + Command<
        UpdateClient,
        Ok = domain::Client,
        Err = Traced<command::update_client::ExecutionError>,
    > + Command<
        DeleteClient,
        Ok = domain::Client,
        Err = Traced<command::delete_client::ExecutionError>,
    > + Query<
        query::client::ById,
        Ok = Option<domain::Client>,
        Err = Traced<database::Error>,
    > + Query<
        query::clients::List,
        Ok = read::client::list::Page,
        Err = Traced<database::Error>,
    >
{
}

impl<S> Api for S where
    S: Shared
        + Command<
            CreateClient,
            Ok = domain::Client,
            Err = Traced<command::create_client::ExecutionError>,
        > + Command<
            UpdateClient,
            Ok = domain::Client,
            Err = Traced<command::update_client::ExecutionError>,
        > + Command<
            DeleteClient,
            Ok = domain::Client,
            Err = Traced<command::delete_client::ExecutionError>,
        > + Query<
            query::client::ById,
            Ok = Option<domain::Client>,
            Err = Traced<database::Error>,
        > + Query<
            query::clients::List,
            Ok = read::client::list::Page,
            Err = Traced<database::Error>,
        >
{
}

/// Routes of the [`Client`]-related HTTP API.
///
/// [`Client`]: domain::Client
pub fn routes<S: Api>() -> Router {
    Router::new()
        .route("/", get(list::<S>).post(create::<S>))
        .route(
            "/:id",
            get(get_by_id::<S>).put(update::<S>).delete(delete::<S>),
        )
}

/// JSON representation of a [`domain::Client`].
#[derive(Clone, Debug, Serialize)]
pub struct Client {
    /// ID of this [`Client`].
    pub id: client::Id,

    /// Name of this [`Client`].
    #[serde(rename = "nome")]
    pub name: client::Name,

    /// Email address of this [`Client`].
    pub email: client::Email,

    /// Phone number of this [`Client`], if any.
    #[serde(rename = "telefone")]
    pub phone: Option<client::Phone>,
}

impl From<domain::Client> for Client {
    fn from(client: domain::Client) -> Self {
        let domain::Client {
            id,
            name,
            email,
            phone,
        } = client;
        Self {
            id,
            name,
            email,
            phone,
        }
    }
}

/// Validated body of [`Client`] creation and update requests.
#[derive(Clone, Debug)]
pub struct Input {
    /// [`client::Name`] of the [`Client`].
    pub name: client::Name,

    /// [`client::Email`] of the [`Client`].
    pub email: client::Email,

    /// [`client::Phone`] of the [`Client`], if any.
    pub phone: Option<client::Phone>,
}

impl Input {
    /// Validates the provided JSON `body`.
    ///
    /// # Errors
    ///
    /// With the message of the first violated rule.
    pub fn parse(body: &Value) -> Result<Self, Error> {
        let obj = Object::new(body)?;

        let name = required("nome", obj.string("nome")?)?;
        let email = required("email", obj.string("email")?)?;
        let email = client::Email::new(email).ok_or_else(|| {
            Error::bad_request(&"\"email\" must be a valid email")
        })?;
        let phone = obj.string("telefone")?.map(client::Phone::from);
        obj.only(&["nome", "email", "telefone"])?;

        Ok(Self {
            // Emptiness is rejected by `Object::string()` already.
            name: client::Name::new(name).ok_or_else(|| {
                Error::bad_request(&"\"nome\" is not allowed to be empty")
            })?,
            email,
            phone,
        })
    }
}

/// Creates a new [`Client`].
#[tracing::instrument(skip_all)]
async fn create<S: Api>(
    Extension(service): Extension<S>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Client>), Error> {
    let Json(body) = body.map_err(|e| e.as_error())?;
    let Input { name, email, phone } = Input::parse(&body)?;

    service
        .execute(CreateClient { name, email, phone })
        .await
        .map(|client| (http::StatusCode::CREATED, Json(Client::from(client))))
        .map_err(|e| e.as_error_of("Erro ao criar cliente"))
}

/// Lists a page of [`Client`]s.
#[tracing::instrument(skip_all, fields(pagination = ?pagination))]
async fn list<S: Api>(
    Extension(service): Extension<S>,
    pagination: Pagination,
) -> Result<Json<Vec<Client>>, Error> {
    let args = pagination.arguments(service.config())?;

    service
        .execute(query::clients::List::by(args))
        .await
        .map(|page| Json(page.into_iter().map(Client::from).collect()))
        .map_err(|e| e.as_error_of("Erro ao obter clientes"))
}

/// Returns a single [`Client`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn get_by_id<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<client::Id>,
) -> Result<Json<Client>, Error> {
    service
        .execute(query::client::ById::by(id))
        .await
        .map_err(|e| e.as_error_of("Erro ao buscar cliente"))?
        .map(|client| Json(Client::from(client)))
        .ok_or_else(|| Rejection::ClientNotFound.into())
}

/// Replaces an existing [`Client`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn update<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<client::Id>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Client>, Error> {
    let Json(body) = body.map_err(|e| e.as_error())?;
    let Input { name, email, phone } = Input::parse(&body)?;

    service
        .execute(UpdateClient {
            id,
            name,
            email,
            phone,
        })
        .await
        .map(|client| Json(Client::from(client)))
        .map_err(|e| e.as_error_of("Erro ao atualizar cliente"))
}

/// Deletes an existing [`Client`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn delete<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<client::Id>,
) -> Result<http::StatusCode, Error> {
    service
        .execute(DeleteClient { id })
        .await
        .map(|_| http::StatusCode::NO_CONTENT)
        .map_err(|e| e.as_error_of("Erro ao deletar cliente"))
}

impl AsError for command::update_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => constraint_violation(e),
            Self::ClientNotExists(_) => Some(Rejection::ClientNotFound.into()),
        }
    }
}

impl AsError for command::delete_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CLIENT_REFERENCED"]
                #[status = BAD_REQUEST]
                #[message = "Erro ao deletar cliente: não se pode deletar \
                             um cliente que esteja envolvido em uma \
                             transação."]
                ClientReferenced,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ClientNotExists(_) => Some(Rejection::ClientNotFound.into()),
            Self::ClientReferenced(_) => Some(Error::ClientReferenced.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use http::StatusCode;
    use serde_json::json;

    use crate::fixture;

    #[tokio::test]
    async fn creates_client() {
        let app = fixture::app();

        let (status, body) = fixture::json(
            &app,
            "POST",
            "/clientes",
            Some(json!({"nome": "João Silva", "email": "joao@example.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({
                "id": 1,
                "nome": "João Silva",
                "email": "joao@example.com",
                "telefone": null,
            }),
        );
    }

    #[tokio::test]
    async fn validates_client() {
        let app = fixture::app();

        for (input, error) in [
            (json!({"email": "a@b.com"}), "\"nome\" is required"),
            (
                json!({"nome": "A", "email": "not-an-email"}),
                "\"email\" must be a valid email",
            ),
            (
                json!({"nome": "", "email": "a@b.com"}),
                "\"nome\" is not allowed to be empty",
            ),
            (
                json!({"nome": "A", "email": "a@b.com", "telefone": 5}),
                "\"telefone\" must be a string",
            ),
            (
                json!({"nome": "A", "email": "a@b.com", "cpf": "1"}),
                "\"cpf\" is not allowed",
            ),
            (json!([1, 2]), "\"value\" must be of type object"),
        ] {
            let (status, body) =
                fixture::json(&app, "POST", "/clientes", Some(input)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{error}");
            assert_eq!(body, json!({"error": error}));
        }
    }

    #[tokio::test]
    async fn lists_clients_by_pages() {
        let app = fixture::app();
        for name in ["Ana", "Bruno", "Carla"] {
            _ = fixture::json(
                &app,
                "POST",
                "/clientes",
                Some(json!({"nome": name, "email": "x@example.com"})),
            )
            .await;
        }

        let (status, all) = fixture::json(&app, "GET", "/clientes", None).await;
        let (_, second) =
            fixture::json(&app, "GET", "/clientes?page=2&limit=2", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().map(Vec::len), Some(3));
        assert_eq!(second[0]["nome"], "Carla");
        assert_eq!(second.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn lists_all_stored_clients_on_first_page() {
        let app = fixture::app();
        for (name, email) in
            [("Ana", "ana@example.com"), ("Bruno", "bruno@example.com")]
        {
            _ = fixture::json(
                &app,
                "POST",
                "/clientes",
                Some(json!({"nome": name, "email": email})),
            )
            .await;
        }

        let (status, body) =
            fixture::json(&app, "GET", "/clientes?page=1&limit=10", None)
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {
                    "id": 1,
                    "nome": "Ana",
                    "email": "ana@example.com",
                    "telefone": null,
                },
                {
                    "id": 2,
                    "nome": "Bruno",
                    "email": "bruno@example.com",
                    "telefone": null,
                },
            ]),
        );
    }

    #[tokio::test]
    async fn gets_client_by_id() {
        let app = fixture::app();
        _ = fixture::json(
            &app,
            "POST",
            "/clientes",
            Some(json!({"nome": "Ana", "email": "ana@example.com"})),
        )
        .await;

        let (found, body) = fixture::json(&app, "GET", "/clientes/1", None).await;
        let (missing, error) =
            fixture::json(&app, "GET", "/clientes/42", None).await;

        assert_eq!(found, StatusCode::OK);
        assert_eq!(body["nome"], "Ana");
        assert_eq!(missing, StatusCode::NOT_FOUND);
        assert_eq!(error, json!({"error": "Cliente não encontrado"}));
    }

    #[tokio::test]
    async fn updates_client() {
        let app = fixture::app();
        _ = fixture::json(
            &app,
            "POST",
            "/clientes",
            Some(json!({"nome": "Ana", "email": "ana@example.com"})),
        )
        .await;

        let (status, body) = fixture::json(
            &app,
            "PUT",
            "/clientes/1",
            Some(json!({
                "nome": "Ana Souza",
                "email": "ana@example.com",
                "telefone": "123",
            })),
        )
        .await;
        let (missing, error) = fixture::json(
            &app,
            "PUT",
            "/clientes/7",
            Some(json!({"nome": "X", "email": "x@example.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nome"], "Ana Souza");
        assert_eq!(body["telefone"], "123");
        assert_eq!(missing, StatusCode::NOT_FOUND);
        assert_eq!(error, json!({"error": "Cliente não encontrado"}));
    }

    #[tokio::test]
    async fn keeps_client_involved_into_transaction() {
        let app = fixture::app();
        _ = fixture::sale(&app).await;

        let (status, body) =
            fixture::json(&app, "DELETE", "/clientes/1", None).await;
        let (kept, _) = fixture::json(&app, "GET", "/clientes/1", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "error": "Erro ao deletar cliente: não se pode deletar um \
                          cliente que esteja envolvido em uma transação.",
            }),
        );
        assert_eq!(kept, StatusCode::OK);
    }

    #[tokio::test]
    async fn deletes_client() {
        let app = fixture::app();
        _ = fixture::json(
            &app,
            "POST",
            "/clientes",
            Some(json!({"nome": "Ana", "email": "ana@example.com"})),
        )
        .await;

        let (deleted, _) =
            fixture::json(&app, "DELETE", "/clientes/1", None).await;
        let (again, error) =
            fixture::json(&app, "DELETE", "/clientes/1", None).await;

        assert_eq!(deleted, StatusCode::NO_CONTENT);
        assert_eq!(again, StatusCode::NOT_FOUND);
        assert_eq!(error, json!({"error": "Cliente não encontrado"}));
    }
}
