//! Domain definitions.

pub mod client;
pub mod farm;
pub mod transaction;

pub use self::{client::Client, farm::Farm, transaction::Transaction};
