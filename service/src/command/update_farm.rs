//! [`Command`] for updating an existing [`Farm`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{farm, Farm},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Farm`].
///
/// All the fields of the [`Farm`] are replaced.
#[derive(Clone, Debug)]
pub struct UpdateFarm {
    /// ID of the [`Farm`] to update.
    pub id: farm::Id,

    /// New [`farm::Name`] of the [`Farm`].
    pub name: farm::Name,

    /// New [`farm::Location`] of the [`Farm`].
    pub location: farm::Location,

    /// New [`farm::Area`] of the [`Farm`].
    pub area: farm::Area,
}

impl<Db> Command<UpdateFarm> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Farm, farm::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Farm>, farm::Id>>,
            Ok = Option<Farm>,
            Err = Traced<database::Error>,
        > + Database<Update<Farm>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Farm;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateFarm) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateFarm {
            id,
            name,
            location,
            area,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Farm`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut farm = tx
            .execute(Select(By::<Option<Farm>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::FarmNotExists(id))
            .map_err(tracerr::wrap!())?;

        farm.name = name;
        farm.location = location;
        farm.area = area;
        tx.execute(Update(farm.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(farm)
    }
}

/// Error of [`UpdateFarm`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Farm`] doesn't exist.
    #[display("`Farm(id: {_0})` does not exist")]
    #[from(ignore)]
    FarmNotExists(#[error(not(source))] farm::Id),
}
