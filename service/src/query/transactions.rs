//! [`Query`] collection related to the multiple [`Transaction`]s.

use common::operations::By;

use crate::read::transaction::list;
#[cfg(doc)]
use crate::{domain::Transaction, Query};

use super::DatabaseQuery;

/// Queries a [`list::Page`] of [`Transaction`]s ordered by their IDs.
pub type List = DatabaseQuery<By<list::Page, list::Arguments>>;
