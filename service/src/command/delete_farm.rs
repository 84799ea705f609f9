//! [`Command`] for deleting an existing [`Farm`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Transaction;
use crate::{
    domain::{farm, Farm},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting an existing [`Farm`].
///
/// A [`Farm`] involved into any [`Transaction`] cannot be deleted.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteFarm {
    /// ID of the [`Farm`] to delete.
    pub id: farm::Id,
}

impl<Db> Command<DeleteFarm> for Service<Db>
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
        > + Database<
            Delete<By<Farm, farm::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Farm;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteFarm) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteFarm { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Farm`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let farm = tx
            .execute(Select(By::<Option<Farm>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::FarmNotExists(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Farm, _>::new(id)))
            .await
            .map_err(|e| {
                if e.as_ref().is_foreign_key_violation() {
                    tracerr::new!(E::FarmReferenced(id))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(farm)
    }
}

/// Error of [`DeleteFarm`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Farm`] doesn't exist.
    #[display("`Farm(id: {_0})` does not exist")]
    #[from(ignore)]
    FarmNotExists(#[error(not(source))] farm::Id),

    /// [`Farm`] is involved into a [`Transaction`].
    #[display("`Farm(id: {_0})` is involved into a `Transaction`")]
    #[from(ignore)]
    FarmReferenced(#[error(not(source))] farm::Id),
}

#[cfg(test)]
mod spec {
    use crate::{fixture, query::farm::ById, Command as _, Query as _};

    use super::{DeleteFarm, ExecutionError};

    #[tokio::test]
    async fn deletes_unsold_farm() {
        let svc = fixture::service();
        let farm = fixture::farm(&svc, "Sunny").await;

        let deleted = svc.execute(DeleteFarm { id: farm.id }).await.unwrap();

        assert_eq!(deleted.id, farm.id);
        assert!(svc.execute(ById::by(farm.id)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keeps_sold_farm() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;
        _ = fixture::sell(&svc, client.id, farm.id).await;

        let err = svc.execute(DeleteFarm { id: farm.id }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::FarmReferenced(id) if *id == farm.id,
        ));
        assert!(svc.execute(ById::by(farm.id)).await.unwrap().is_some());
    }
}
