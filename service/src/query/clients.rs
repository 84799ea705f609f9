//! [`Query`] collection related to the multiple [`Client`]s.

use common::operations::By;

use crate::read::client::list;
#[cfg(doc)]
use crate::{domain::Client, Query};

use super::DatabaseQuery;

/// Queries a [`list::Page`] of [`Client`]s ordered by their IDs.
pub type List = DatabaseQuery<By<list::Page, list::Arguments>>;
