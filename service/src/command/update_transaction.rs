//! [`Command`] for updating an existing [`Transaction`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    check::{self, Verdict},
    domain::{client, farm, transaction, Client, Farm, Transaction},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Transaction`].
///
/// All the fields of the [`Transaction`] are replaced. Whether the new
/// [`Farm`] is sold already is not checked.
#[derive(Clone, Debug)]
pub struct UpdateTransaction {
    /// ID of the [`Transaction`] to update.
    pub id: transaction::Id,

    /// ID of the [`Client`] buying the [`Farm`].
    pub client_id: client::Id,

    /// ID of the [`Farm`] being sold.
    pub farm_id: farm::Id,

    /// New [`transaction::Date`] of the sale.
    pub date: transaction::Date,

    /// New [`transaction::Amount`] of the sale.
    pub amount: transaction::Amount,
}

impl<Db> Command<UpdateTransaction> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Transaction, transaction::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Transaction>, transaction::Id>>,
            Ok = Option<Transaction>,
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
            Update<Transaction>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateTransaction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateTransaction {
            id,
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

        // Avoid concurrent actions upon the same `Transaction`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let verdict = check::Updatable {
            transaction_id: id,
            client_id,
            farm_id,
        }
        .verify(&tx)
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !verdict.is_proceed() {
            return Err(tracerr::new!(E::Rejected(verdict)));
        }

        let transaction = Transaction {
            id,
            client_id,
            farm_id,
            date,
            amount,
        };
        tx.execute(Update(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(transaction)
    }
}

/// Error of [`UpdateTransaction`] [`Command`] execution.
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
        domain::transaction,
        fixture,
        query::transaction::ById,
        Command as _, Query as _,
    };

    use super::{ExecutionError, UpdateTransaction};

    #[tokio::test]
    async fn replaces_all_fields() {
        let svc = fixture::service();
        let john = fixture::client(&svc, "John").await;
        let jane = fixture::client(&svc, "Jane").await;
        let farm = fixture::farm(&svc, "Sunny").await;
        let sale = fixture::sell(&svc, john.id, farm.id).await;

        let updated = svc
            .execute(UpdateTransaction {
                id: sale.id,
                client_id: jane.id,
                farm_id: farm.id,
                date: transaction::Date::parse("2024-01-01").unwrap(),
                amount: fixture::positive(7).into(),
            })
            .await
            .unwrap();

        assert_eq!(updated.client_id, jane.id);
        assert_eq!(
            svc.execute(ById::by(sale.id)).await.unwrap(),
            Some(updated),
        );
    }

    #[tokio::test]
    async fn does_not_recheck_sold_farm() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;
        let sale = fixture::sell(&svc, client.id, farm.id).await;

        let res = svc
            .execute(UpdateTransaction {
                id: sale.id,
                client_id: client.id,
                farm_id: farm.id,
                date: sale.date,
                amount: sale.amount,
            })
            .await;

        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn reports_unique_violation_when_moving_to_sold_farm() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let first = fixture::farm(&svc, "Sunny").await;
        let second = fixture::farm(&svc, "Rainy").await;
        _ = fixture::sell(&svc, client.id, first.id).await;
        let sale = fixture::sell(&svc, client.id, second.id).await;

        let err = svc
            .execute(UpdateTransaction {
                id: sale.id,
                client_id: client.id,
                farm_id: first.id,
                date: sale.date,
                amount: sale.amount,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Db(e) if e.is_constraint_violation(),
        ));
    }

    #[tokio::test]
    async fn rejects_missing_transaction() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;

        let err = svc
            .execute(UpdateTransaction {
                id: transaction::Id::from(5),
                client_id: client.id,
                farm_id: farm.id,
                date: transaction::Date::parse("2024-01-01").unwrap(),
                amount: fixture::positive(7).into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Rejected(Verdict::TransactionNotExists(_)),
        ));
    }
}
