//! [`Command`] definition.

pub mod create_client;
pub mod create_farm;
pub mod create_transaction;
pub mod delete_client;
pub mod delete_farm;
pub mod delete_transaction;
pub mod update_client;
pub mod update_farm;
pub mod update_transaction;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_client::CreateClient, create_farm::CreateFarm,
    create_transaction::CreateTransaction, delete_client::DeleteClient,
    delete_farm::DeleteFarm, delete_transaction::DeleteTransaction,
    update_client::UpdateClient, update_farm::UpdateFarm,
    update_transaction::UpdateTransaction,
};
