//! [`Command`] for creating a new [`Transaction`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    check::{self, Verdict},
    domain::{client, farm, transaction, Client, Farm, Transaction},
    infra::{database, Database},
    read::farm::IsSold,
    Service,
};

use super::Command;

/// Name of the [`Database`] constraint allowing a single [`Transaction`] per
/// [`Farm`].
const FARM_SOLD_ONCE: &str = "transacoes_fazenda_id_key";

/// [`Command`] for creating a new [`Transaction`], selling a [`Farm`] to a
/// [`Client`].
#[derive(Clone, Debug)]
pub struct CreateTransaction {
    /// ID of the [`Client`] buying the [`Farm`].
    pub client_id: client::Id,

    /// ID of the [`Farm`] being sold.
    pub farm_id: farm::Id,

    /// [`transaction::Date`] of the sale.
    pub date: transaction::Date,

    /// [`transaction::Amount`] of the sale.
    pub amount: transaction::Amount,
}

impl<Db> Command<CreateTransaction> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Farm, farm::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Farm>, farm::Id>>,
            Ok = Option<Farm>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<IsSold, farm::Id>>,
            Ok = IsSold,
            Err = Traced<database::Error>,
        > + Database<
            Insert<transaction::New>,
            Ok = Transaction,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateTransaction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTransaction {
            client_id,
            farm_id,
            date,
            amount,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent sales of the same `Farm`.
        tx.execute(Lock(By::new(farm_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let verdict = check::Creatable { client_id, farm_id }
            .verify(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !verdict.is_proceed() {
            return Err(tracerr::new!(E::Rejected(verdict)));
        }

        let transaction = tx
            .execute(Insert(transaction::New {
                client_id,
                farm_id,
                date,
                amount,
            }))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(Some(FARM_SOLD_ONCE)) {
                    tracing::warn!(
                        farm_id = %farm_id,
                        "`Farm` is sold concurrently",
                    );
                    tracerr::new!(E::Rejected(Verdict::FarmAlreadySold(
                        farm_id
                    )))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(transaction)
    }
}

/// Error of [`CreateTransaction`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Transaction`] business rules are violated.
    #[display("`Transaction` is rejected: {_0}")]
    #[from(ignore)]
    Rejected(#[error(not(source))] Verdict),
}

#[cfg(test)]
mod spec {
    use crate::{
        check::Verdict,
        domain::{client, transaction},
        fixture,
        query::transactions,
        read::transaction::list,
        Command as _, Query as _,
    };

    use super::{CreateTransaction, ExecutionError};

    #[tokio::test]
    async fn sells_farm() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;

        let sale = fixture::sell(&svc, client.id, farm.id).await;

        assert_eq!(sale.client_id, client.id);
        assert_eq!(sale.farm_id, farm.id);
        let page = svc
            .execute(transactions::List::by(
                list::Arguments::new(None, None, 10).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(page.nodes, vec![sale]);
    }

    #[tokio::test]
    async fn rejects_second_sale_of_farm() {
        let svc = fixture::service();
        let john = fixture::client(&svc, "John").await;
        let jane = fixture::client(&svc, "Jane").await;
        let farm = fixture::farm(&svc, "Sunny").await;
        _ = fixture::sell(&svc, john.id, farm.id).await;

        let err = svc
            .execute(CreateTransaction {
                client_id: jane.id,
                farm_id: farm.id,
                date: transaction::Date::parse("2023-10-02").unwrap(),
                amount: fixture::positive(1).into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Rejected(Verdict::FarmAlreadySold(id))
                if *id == farm.id,
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_client() {
        let svc = fixture::service();
        let farm = fixture::farm(&svc, "Sunny").await;

        let err = svc
            .execute(CreateTransaction {
                client_id: client::Id::from(42),
                farm_id: farm.id,
                date: transaction::Date::parse("2023-10-01").unwrap(),
                amount: fixture::positive(1).into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Rejected(Verdict::ClientNotExists(id))
                if *id == client::Id::from(42),
        ));
    }
}
