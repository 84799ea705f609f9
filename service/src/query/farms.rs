//! [`Query`] collection related to the multiple [`Farm`]s.

use common::operations::By;

use crate::read::farm::list;
#[cfg(doc)]
use crate::{domain::Farm, Query};

use super::DatabaseQuery;

/// Queries a [`list::Page`] of [`Farm`]s ordered by their IDs.
pub type List = DatabaseQuery<By<list::Page, list::Arguments>>;
