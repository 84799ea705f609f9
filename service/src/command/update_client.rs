//! [`Command`] for updating an existing [`Client`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Client`].
///
/// All the fields of the [`Client`] are replaced.
#[derive(Clone, Debug)]
pub struct UpdateClient {
    /// ID of the [`Client`] to update.
    pub id: client::Id,

    /// New [`client::Name`] of the [`Client`].
    pub name: client::Name,

    /// New [`client::Email`] of the [`Client`].
    pub email: client::Email,

    /// New [`client::Phone`] of the [`Client`].
    ///
    /// [`None`] removes the existing one.
    pub phone: Option<client::Phone>,
}

impl<Db> Command<UpdateClient> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Client, client::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<Update<Client>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateClient {
            id,
            name,
            email,
            phone,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Client`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut client = tx
            .execute(Select(By::<Option<Client>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(id))
            .map_err(tracerr::wrap!())?;

        client.name = name;
        client.email = email;
        client.phone = phone;
        tx.execute(Update(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(client)
    }
}

/// Error of [`UpdateClient`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Client`] doesn't exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),
}

#[cfg(test)]
mod spec {
    use crate::{domain::client, fixture, Command as _};

    use super::{ExecutionError, UpdateClient};

    #[tokio::test]
    async fn replaces_all_fields() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;

        let updated = svc
            .execute(UpdateClient {
                id: client.id,
                name: client::Name::new("Jane").unwrap(),
                email: client::Email::new("jane@example.com").unwrap(),
                phone: Some("+55 11 99999-0000".into()),
            })
            .await
            .unwrap();

        assert_eq!(updated.id, client.id);
        assert_eq!(updated.name.to_string(), "Jane");
        assert_eq!(updated.email.to_string(), "jane@example.com");
        assert_eq!(
            updated.phone.map(|p| p.to_string()).as_deref(),
            Some("+55 11 99999-0000"),
        );
    }

    #[tokio::test]
    async fn rejects_missing_client() {
        let svc = fixture::service();

        let err = svc
            .execute(UpdateClient {
                id: client::Id::from(9),
                name: client::Name::new("Jane").unwrap(),
                email: client::Email::new("jane@example.com").unwrap(),
                phone: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ClientNotExists(_)));
    }
}
