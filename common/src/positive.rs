//! [`Positive`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Strictly positive decimal number.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Positive(Decimal);

impl Positive {
    /// Creates a new [`Positive`] by checking the provided value is greater
    /// than `0`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (val > Decimal::ZERO).then_some(Self(val))
    }

    /// Returns the underlying [`Decimal`] value.
    #[must_use]
    pub const fn get(self) -> Decimal {
        self.0
    }
}

impl FromStr for Positive {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok()
            .and_then(Self::new)
            .ok_or("invalid positive value")
    }
}

impl From<Positive> for Decimal {
    fn from(val: Positive) -> Self {
        val.0
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use rust_decimal::prelude::ToPrimitive as _;
    use serde::{ser::Error as _, Serialize, Serializer};

    use super::Positive;

    /// Serializes as a JSON-friendly number: integral values become integers,
    /// the rest become floats.
    impl Serialize for Positive {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let val = self.0.normalize();
            if val.is_integer() {
                if let Some(i) = val.to_i64() {
                    return serializer.serialize_i64(i);
                }
            }
            serializer.serialize_f64(val.to_f64().ok_or_else(|| {
                S::Error::custom(format!("`{val}` is not representable"))
            })?)
        }
    }
}
