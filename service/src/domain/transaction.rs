//! [`Transaction`] definitions.

use common::{DateTimeOf, Positive};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::Serialize;

use crate::domain::{client, farm};
#[cfg(doc)]
use crate::domain::{Client, Farm};

/// Sale of a [`Farm`] to a [`Client`].
///
/// A [`Farm`] can be sold only once, so at most one [`Transaction`] may refer
/// to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    pub id: Id,

    /// ID of the [`Client`] who bought the [`Farm`].
    pub client_id: client::Id,

    /// ID of the sold [`Farm`].
    pub farm_id: farm::Id,

    /// [`Date`] when the [`Farm`] was sold.
    pub date: Date,

    /// [`Amount`] the [`Farm`] was sold for.
    pub amount: Amount,
}

/// [`Transaction`] which is not persisted yet, so has no [`Id`] assigned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct New {
    /// ID of the [`Client`] buying the [`Farm`].
    pub client_id: client::Id,

    /// ID of the [`Farm`] being sold.
    pub farm_id: farm::Id,

    /// [`Date`] of the sale.
    pub date: Date,

    /// [`Amount`] of the sale.
    pub amount: Amount,
}

impl New {
    /// Turns this [`New`] into a [`Transaction`] with the provided [`Id`].
    #[must_use]
    pub fn with_id(self, id: Id) -> Transaction {
        let Self {
            client_id,
            farm_id,
            date,
            amount,
        } = self;
        Transaction {
            id,
            client_id,
            farm_id,
            date,
            amount,
        }
    }
}

/// ID of a [`Transaction`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[serde(transparent)]
pub struct Id(i32);

/// [`DateTimeOf`] when a [`Transaction`] took place.
pub type Date = DateTimeOf<Transaction>;

/// Amount of money a [`Farm`] is sold for.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Into, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Amount(Positive);
