//! [`Query`] collection related to a single [`Farm`].

use common::operations::By;

use crate::domain::{farm, Farm};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Farm`] by its [`farm::Id`].
pub type ById = DatabaseQuery<By<Option<Farm>, farm::Id>>;
