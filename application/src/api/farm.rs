//! [`Farm`]-related HTTP API.
//!
//! [`Farm`]: domain::Farm

use axum::{
    extract::rejection::JsonRejection,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use service::{
    command::{self, CreateFarm, DeleteFarm, UpdateFarm},
    domain::{self, farm},
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

/// [`Service`] capable of serving the [`Farm`]-related HTTP API.
///
/// [`Farm`]: domain::Farm
/// [`Service`]: service::Service
pub trait Api:
    Shared
    + Command<
        CreateFarm,
        Ok = domain::Farm,
        Err = Traced<command::create_farm::ExecutionError>,
    > + Command<
        UpdateFarm,
        Ok = domain::Farm,
        Err = Traced<command::update_farm::ExecutionError>,
    > + Command<
        DeleteFarm,
        Ok = domain::Farm,
        Err = Traced<command::delete_farm::ExecutionError>,
    > + Query<
        query::farm::ById,
        Ok = Option<domain::Farm>,
        Err = Traced<database::Error>,
    > + Query<
        query::farms::List,
        Ok = read::farm::list::Page,
        Err = Traced<database::Error>,
    >
{
}

impl<S> Api for S where
    S: Shared
        + Command<
            CreateFarm,
            Ok = domain::Farm,
            Err = Traced<command::create_farm::ExecutionError>,
        > + Command<
            UpdateFarm,
            Ok = domain::Farm,
            Err = Traced<command::update_farm::ExecutionError>,
        > + Command<
            DeleteFarm,
            Ok = domain::Farm,
            Err = Traced<command::delete_farm::ExecutionError>,
        > + Query<
            query::farm::ById,
            Ok = Option<domain::Farm>,
            Err = Traced<database::Error>,
        > + Query<
            query::farms::List,
            Ok = read::farm::list::Page,
            Err = Traced<database::Error>,
        >
{
}

/// Routes of the [`Farm`]-related HTTP API.
///
/// [`Farm`]: domain::Farm
pub fn routes<S: Api>() -> Router {
    Router::new()
        .route("/", get(list::<S>).post(create::<S>))
        .route(
            "/:id",
            get(get_by_id::<S>).put(update::<S>).delete(delete::<S>),
        )
}

/// JSON representation of a [`domain::Farm`].
#[derive(Clone, Debug, Serialize)]
pub struct Farm {
    /// ID of this [`Farm`].
    pub id: farm::Id,

    /// Name of this [`Farm`].
    #[serde(rename = "nome")]
    pub name: farm::Name,

    /// Location of this [`Farm`] as a WKT geometry.
    #[serde(rename = "localizacao")]
    pub location: farm::Location,

    /// Area of this [`Farm`].
    pub area: Area,
}

/// Area of a [`Farm`] as returned in a response.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Area {
    /// Stored [`farm::Area`].
    Stored(farm::Area),

    /// Area exactly as it was sent in the request body.
    Echoed(Value),
}

impl Farm {
    /// Replaces the [`Area`] of this [`Farm`] with the one sent in the
    /// provided request `body`.
    #[must_use]
    fn echoing(mut self, body: &Value) -> Self {
        if let Some(area) = body.get("area") {
            self.area = Area::Echoed(area.clone());
        }
        self
    }
}

impl From<domain::Farm> for Farm {
    fn from(farm: domain::Farm) -> Self {
        let domain::Farm {
            id,
            name,
            location,
            area,
        } = farm;
        Self {
            id,
            name,
            location,
            area: Area::Stored(area),
        }
    }
}

/// Validated body of [`Farm`] creation and update requests.
#[derive(Clone, Debug)]
pub struct Input {
    /// [`farm::Name`] of the [`Farm`].
    pub name: farm::Name,

    /// [`farm::Location`] of the [`Farm`].
    pub location: farm::Location,

    /// [`farm::Area`] of the [`Farm`].
    pub area: farm::Area,
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
        let name = farm::Name::new(name).ok_or_else(|| {
            Error::bad_request(&"\"nome\" is not allowed to be empty")
        })?;
        let location = required("localizacao", obj.string("localizacao")?)?;
        let location = farm::Location::new(location).ok_or_else(|| {
            Error::bad_request(&"\"localizacao\" is not allowed to be empty")
        })?;
        let area = required("area", obj.positive("area")?)?;
        obj.only(&["nome", "localizacao", "area"])?;

        Ok(Self {
            name,
            location,
            area: area.into(),
        })
    }
}

/// Creates a new [`Farm`].
#[tracing::instrument(skip_all)]
async fn create<S: Api>(
    Extension(service): Extension<S>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Farm>), Error> {
    let Json(body) = body.map_err(|e| e.as_error())?;
    let Input {
        name,
        location,
        area,
    } = Input::parse(&body)?;

    service
        .execute(CreateFarm {
            name,
            location,
            area,
        })
        .await
        .map(|farm| {
            let farm = Farm::from(farm).echoing(&body);
            (http::StatusCode::CREATED, Json(farm))
        })
        .map_err(|e| e.as_error_of("Erro ao criar fazenda"))
}

/// Lists a page of [`Farm`]s.
#[tracing::instrument(skip_all, fields(pagination = ?pagination))]
async fn list<S: Api>(
    Extension(service): Extension<S>,
    pagination: Pagination,
) -> Result<Json<Vec<Farm>>, Error> {
    let args = pagination.arguments(service.config())?;

    service
        .execute(query::farms::List::by(args))
        .await
        .map(|page| Json(page.into_iter().map(Farm::from).collect()))
        .map_err(|e| e.as_error_of("Erro ao obter fazendas"))
}

/// Returns a single [`Farm`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn get_by_id<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<farm::Id>,
) -> Result<Json<Farm>, Error> {
    service
        .execute(query::farm::ById::by(id))
        .await
        .map_err(|e| e.as_error_of("Erro ao obter fazenda"))?
        .map(|farm| Json(Farm::from(farm)))
        .ok_or_else(|| Rejection::FarmNotFound.into())
}

/// Replaces an existing [`Farm`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn update<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<farm::Id>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Farm>, Error> {
    let Json(body) = body.map_err(|e| e.as_error())?;
    let Input {
        name,
        location,
        area,
    } = Input::parse(&body)?;

    service
        .execute(UpdateFarm {
            id,
            name,
            location,
            area,
        })
        .await
        .map(|farm| Json(Farm::from(farm).echoing(&body)))
        .map_err(|e| e.as_error_of("Erro ao atualizar fazenda"))
}

/// Deletes an existing [`Farm`].
#[tracing::instrument(skip_all, fields(id = %id))]
async fn delete<S: Api>(
    Extension(service): Extension<S>,
    Id(id): Id<farm::Id>,
) -> Result<http::StatusCode, Error> {
    service
        .execute(DeleteFarm { id })
        .await
        .map(|_| http::StatusCode::NO_CONTENT)
        .map_err(|e| e.as_error_of("Erro ao deletar fazenda"))
}

impl AsError for command::update_farm::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => constraint_violation(e),
            Self::FarmNotExists(_) => Some(Rejection::FarmNotFound.into()),
        }
    }
}

impl AsError for command::delete_farm::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "FARM_REFERENCED"]
                #[status = BAD_REQUEST]
                #[message = "Erro ao deletar fazenda: não se pode deletar \
                             uma fazenda que esteja envolvida em uma \
                             transação."]
                FarmReferenced,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::FarmNotExists(_) => Some(Rejection::FarmNotFound.into()),
            Self::FarmReferenced(_) => Some(Error::FarmReferenced.into()),
        }
    }
}
