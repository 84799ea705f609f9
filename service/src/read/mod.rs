//! Read entities definitions.

pub mod client;
pub mod farm;
pub mod transaction;
