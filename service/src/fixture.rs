//! Fixtures for [`Service`] tests.

use common::Positive;

use crate::{
    command::{CreateClient, CreateFarm, CreateTransaction},
    domain::{client, farm, transaction, Client, Farm, Transaction},
    infra::Memory,
    Command as _, Config, Service,
};

/// Creates a new [`Service`] backed by an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(Config::default(), Memory::new())
}

/// Creates a new [`Positive`] out of the provided integer.
pub(crate) fn positive(val: i64) -> Positive {
    val.to_string().parse().unwrap()
}

/// Creates a new [`Client`] with the provided name.
pub(crate) async fn client(svc: &Service<Memory>, name: &str) -> Client {
    svc.execute(CreateClient {
        name: client::Name::new(name).unwrap(),
        email: client::Email::new("john@example.com").unwrap(),
        phone: None,
    })
    .await
    .unwrap()
}

/// Creates a new [`Farm`] with the provided name.
pub(crate) async fn farm(svc: &Service<Memory>, name: &str) -> Farm {
    svc.execute(CreateFarm {
        name: farm::Name::new(name).unwrap(),
        location: farm::Location::new("POINT(1 1)").unwrap(),
        area: positive(100).into(),
    })
    .await
    .unwrap()
}

/// Sells the [`Farm`] to the [`Client`].
pub(crate) async fn sell(
    svc: &Service<Memory>,
    client_id: client::Id,
    farm_id: farm::Id,
) -> Transaction {
    svc.execute(CreateTransaction {
        client_id,
        farm_id,
        date: transaction::Date::parse("2023-10-01").unwrap(),
        amount: positive(500_000).into(),
    })
    .await
    .unwrap()
}
