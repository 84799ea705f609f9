//! [`Client`]-related read definitions.

#[cfg(doc)]
use crate::domain::Client;

pub mod list {
    //! [`Client`] list definitions.

    use common::define_pagination;

    use crate::domain::Client;

    define_pagination!(Client);
}
