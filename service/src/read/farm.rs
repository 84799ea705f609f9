//! [`Farm`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{Farm, Transaction};

/// Indicator whether a [`Farm`] is sold already, meaning that some
/// [`Transaction`] refers to it.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsSold(pub bool);

pub mod list {
    //! [`Farm`] list definitions.

    use common::define_pagination;

    use crate::domain::Farm;

    define_pagination!(Farm);
}
