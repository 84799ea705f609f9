//! [`Command`] for creating a new [`Farm`].

use common::operations::{Commit, Insert, Transact, Transacted};
use tracerr::Traced;

use crate::{
    domain::{farm, Farm},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Farm`].
#[derive(Clone, Debug)]
pub struct CreateFarm {
    /// [`farm::Name`] of a new [`Farm`].
    pub name: farm::Name,

    /// [`farm::Location`] of a new [`Farm`].
    pub location: farm::Location,

    /// [`farm::Area`] of a new [`Farm`].
    pub area: farm::Area,
}

impl<Db> Command<CreateFarm> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<farm::New>,
            Ok = Farm,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Farm;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateFarm) -> Result<Self::Ok, Self::Err> {
        let CreateFarm {
            name,
            location,
            area,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;

        let farm = tx
            .execute(Insert(farm::New {
                name,
                location,
                area,
            }))
            .await
            .map_err(tracerr::wrap!())?;

        tx.execute(Commit).await.map_err(tracerr::wrap!())?;

        Ok(farm)
    }
}

/// Error of [`CreateFarm`] [`Command`] execution.
pub type ExecutionError = database::Error;
