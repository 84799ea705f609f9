//! [`Command`] for creating a new [`Client`].

use common::operations::{Commit, Insert, Transact, Transacted};
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Client`].
#[derive(Clone, Debug)]
pub struct CreateClient {
    /// [`client::Name`] of a new [`Client`].
    pub name: client::Name,

    /// [`client::Email`] of a new [`Client`].
    pub email: client::Email,

    /// [`client::Phone`] of a new [`Client`], if any.
    pub phone: Option<client::Phone>,
}

impl<Db> Command<CreateClient> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<client::New>,
            Ok = Client,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateClient) -> Result<Self::Ok, Self::Err> {
        let CreateClient { name, email, phone } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;

        let client = tx
            .execute(Insert(client::New { name, email, phone }))
            .await
            .map_err(tracerr::wrap!())?;

        tx.execute(Commit).await.map_err(tracerr::wrap!())?;

        Ok(client)
    }
}

/// Error of [`CreateClient`] [`Command`] execution.
pub type ExecutionError = database::Error;
