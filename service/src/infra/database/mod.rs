//! [`Database`]-related implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(any(test, feature = "memory"))]
    /// [`Memory`] error.
    Memory(memory::Error),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    ///
    /// Any unique constraint matches, if [`None`] is specified.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_unique_violation(constraint),
            #[cfg(any(test, feature = "memory"))]
            Self::Memory(ref e) => e.is_unique_violation(constraint),
        }
    }

    /// Checks if the error is a foreign key violation.
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_foreign_key_violation(),
            #[cfg(any(test, feature = "memory"))]
            Self::Memory(ref e) => e.is_foreign_key_violation(),
        }
    }

    /// Checks if the error is a violation of any integrity constraint.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_constraint_violation(),
            #[cfg(any(test, feature = "memory"))]
            Self::Memory(ref e) => e.is_constraint_violation(),
        }
    }
}
