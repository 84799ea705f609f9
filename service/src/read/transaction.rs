//! [`Transaction`]-related read definitions.

#[cfg(doc)]
use crate::domain::Transaction;

pub mod list {
    //! [`Transaction`] list definitions.

    use common::define_pagination;

    use crate::domain::Transaction;

    define_pagination!(Transaction);
}
