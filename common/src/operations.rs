//! Abstract storage operations, executed by [`Handler`]s.

use std::marker::PhantomData;

use crate::Handler;

/// Persists a new row.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Replaces an existing row.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Removes an existing row.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Reads one or more rows.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Locks a row until the end of the current database transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Begins a database transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handle of a database transaction begun by a [`Transact`].
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a database transaction begun by a [`Transact`].
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B`y key (an ID or list arguments, for example).
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<fn() -> W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector with the provided key.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
