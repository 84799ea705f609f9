//! Business rules of [`Transaction`]s.
//!
//! Checks only read from a [`Database`] and never modify it. Their order is
//! significant: the first violated rule determines the [`Verdict`].

use common::operations::{By, Select};
use derive_more::Display;
use tracerr::Traced;

use crate::{
    domain::{client, farm, transaction, Client, Farm, Transaction},
    infra::{database, Database},
    read::farm::IsSold,
};

/// Verdict of a [`Transaction`] business rules check.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Verdict {
    /// All the rules are satisfied.
    #[display("all rules are satisfied")]
    Proceed,

    /// [`Client`] doesn't exist.
    #[display("`Client(id: {_0})` does not exist")]
    ClientNotExists(client::Id),

    /// [`Farm`] doesn't exist.
    #[display("`Farm(id: {_0})` does not exist")]
    FarmNotExists(farm::Id),

    /// [`Farm`] is referred by another [`Transaction`] already.
    #[display("`Farm(id: {_0})` is sold already")]
    FarmAlreadySold(farm::Id),

    /// [`Transaction`] doesn't exist.
    #[display("`Transaction(id: {_0})` does not exist")]
    TransactionNotExists(transaction::Id),
}

impl Verdict {
    /// Indicates whether this [`Verdict`] allows to proceed.
    #[must_use]
    pub fn is_proceed(self) -> bool {
        self == Self::Proceed
    }
}

/// Check whether a new [`Transaction`] can be created.
#[derive(Clone, Copy, Debug)]
pub struct Creatable {
    /// ID of the [`Client`] buying the [`Farm`].
    pub client_id: client::Id,

    /// ID of the [`Farm`] being sold.
    pub farm_id: farm::Id,
}

impl Creatable {
    /// Verifies this [`Creatable`] check against the provided [`Database`].
    ///
    /// The [`Client`] is checked to exist, then the [`Farm`], and then the
    /// [`Farm`] is checked to be not sold yet.
    ///
    /// # Errors
    ///
    /// If failed to read from the [`Database`].
    pub async fn verify<Db>(
        self,
        db: &Db,
    ) -> Result<Verdict, Traced<database::Error>>
    where
        Db: Database<
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
            >,
    {
        let Self { client_id, farm_id } = self;

        let verdict = parties_exist(db, client_id, farm_id)
            .await
            .map_err(tracerr::wrap!())?;
        if !verdict.is_proceed() {
            return Ok(verdict);
        }

        let is_sold = db
            .execute(Select(By::<IsSold, _>::new(farm_id)))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(if *is_sold {
            Verdict::FarmAlreadySold(farm_id)
        } else {
            Verdict::Proceed
        })
    }
}

/// Check whether an existing [`Transaction`] can be updated.
///
/// Unlike [`Creatable`], whether the [`Farm`] is sold already is not checked.
#[derive(Clone, Copy, Debug)]
pub struct Updatable {
    /// ID of the [`Transaction`] to be updated.
    pub transaction_id: transaction::Id,

    /// ID of the [`Client`] the [`Transaction`] should refer to.
    pub client_id: client::Id,

    /// ID of the [`Farm`] the [`Transaction`] should refer to.
    pub farm_id: farm::Id,
}

impl Updatable {
    /// Verifies this [`Updatable`] check against the provided [`Database`].
    ///
    /// The [`Transaction`] is checked to exist, then the [`Client`], and then
    /// the [`Farm`].
    ///
    /// # Errors
    ///
    /// If failed to read from the [`Database`].
    pub async fn verify<Db>(
        self,
        db: &Db,
    ) -> Result<Verdict, Traced<database::Error>>
    where
        Db: Database<
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
            >,
    {
        let Self {
            transaction_id,
            client_id,
            farm_id,
        } = self;

        let transaction = db
            .execute(Select(By::<Option<Transaction>, _>::new(transaction_id)))
            .await
            .map_err(tracerr::wrap!())?;
        if transaction.is_none() {
            return Ok(Verdict::TransactionNotExists(transaction_id));
        }

        parties_exist(db, client_id, farm_id)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Checks that the [`Client`] and the [`Farm`] of a [`Transaction`] exist, in
/// this order.
async fn parties_exist<Db>(
    db: &Db,
    client_id: client::Id,
    farm_id: farm::Id,
) -> Result<Verdict, Traced<database::Error>>
where
    Db: Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Farm>, farm::Id>>,
            Ok = Option<Farm>,
            Err = Traced<database::Error>,
        >,
{
    let client = db
        .execute(Select(By::<Option<Client>, _>::new(client_id)))
        .await
        .map_err(tracerr::wrap!())?;
    if client.is_none() {
        return Ok(Verdict::ClientNotExists(client_id));
    }

    let farm = db
        .execute(Select(By::<Option<Farm>, _>::new(farm_id)))
        .await
        .map_err(tracerr::wrap!())?;
    if farm.is_none() {
        return Ok(Verdict::FarmNotExists(farm_id));
    }

    Ok(Verdict::Proceed)
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{client, farm, transaction},
        fixture,
    };

    use super::{Creatable, Updatable, Verdict};

    #[tokio::test]
    async fn proceeds_with_existing_parties() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;

        let verdict = Creatable {
            client_id: client.id,
            farm_id: farm.id,
        }
        .verify(svc.database())
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::Proceed);
    }

    #[tokio::test]
    async fn checks_client_before_farm() {
        let svc = fixture::service();

        let verdict = Creatable {
            client_id: client::Id::from(999),
            farm_id: farm::Id::from(999),
        }
        .verify(svc.database())
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::ClientNotExists(999.into()));
    }

    #[tokio::test]
    async fn checks_farm_existence() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;

        let verdict = Creatable {
            client_id: client.id,
            farm_id: farm::Id::from(999),
        }
        .verify(svc.database())
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::FarmNotExists(999.into()));
    }

    #[tokio::test]
    async fn rejects_sold_farm() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;
        _ = fixture::sell(&svc, client.id, farm.id).await;

        let verdict = Creatable {
            client_id: client.id,
            farm_id: farm.id,
        }
        .verify(svc.database())
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::FarmAlreadySold(farm.id));
    }

    #[tokio::test]
    async fn checks_transaction_first_on_update() {
        let svc = fixture::service();

        let verdict = Updatable {
            transaction_id: transaction::Id::from(7),
            client_id: client::Id::from(999),
            farm_id: farm::Id::from(999),
        }
        .verify(svc.database())
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::TransactionNotExists(7.into()));
    }

    #[tokio::test]
    async fn ignores_sold_farm_on_update() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;
        let sale = fixture::sell(&svc, client.id, farm.id).await;

        let verdict = Updatable {
            transaction_id: sale.id,
            client_id: client.id,
            farm_id: farm.id,
        }
        .verify(svc.database())
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::Proceed);
    }

    #[tokio::test]
    async fn checks_parties_on_update() {
        let svc = fixture::service();
        let client = fixture::client(&svc, "John").await;
        let farm = fixture::farm(&svc, "Sunny").await;
        let sale = fixture::sell(&svc, client.id, farm.id).await;

        let no_client = Updatable {
            transaction_id: sale.id,
            client_id: client::Id::from(999),
            farm_id: farm::Id::from(999),
        }
        .verify(svc.database())
        .await
        .unwrap();
        let no_farm = Updatable {
            transaction_id: sale.id,
            client_id: client.id,
            farm_id: farm::Id::from(999),
        }
        .verify(svc.database())
        .await
        .unwrap();

        assert_eq!(no_client, Verdict::ClientNotExists(999.into()));
        assert_eq!(no_farm, Verdict::FarmNotExists(999.into()));
    }

    #[tokio::test]
    async fn fails_when_database_unavailable() {
        let svc = fixture::service();
        svc.database().set_unavailable(true).await;

        let res = Creatable {
            client_id: client::Id::from(1),
            farm_id: farm::Id::from(1),
        }
        .verify(svc.database())
        .await;

        assert!(res.is_err());
    }
}
