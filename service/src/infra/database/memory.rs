//! In-memory [`Database`] implementation.
//!
//! Mirrors the integrity constraints of the relational schema, so it can
//! stand in for a real [`Database`] in tests.
//!
//! [`Database`]: crate::infra::Database

use std::{collections::BTreeMap, sync::Arc};

use common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    pagination,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracerr::Traced;

use crate::{
    domain::{client, farm, transaction, Client, Farm, Transaction},
    infra::{database, Database},
    read,
};

/// Name of the unique constraint allowing a single [`Transaction`] per
/// [`Farm`].
const FARM_SOLD_ONCE: &str = "transacoes_fazenda_id_key";

/// Name of the foreign key constraint from a [`Transaction`] to a [`Client`].
const TRANSACTION_CLIENT: &str = "transacoes_cliente_id_fkey";

/// Name of the foreign key constraint from a [`Transaction`] to a [`Farm`].
const TRANSACTION_FARM: &str = "transacoes_fazenda_id_fkey";

/// In-memory [`Database`].
///
/// [`Transact`]ing shares the same storage, so changes are visible
/// immediately and are never rolled back.
///
/// [`Database`]: crate::infra::Database
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Shared [`State`] of this [`Memory`] database.
    state: Arc<RwLock<State>>,
}

/// Stored data of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Indicator whether every operation should fail with
    /// [`Error::Unavailable`].
    unavailable: bool,

    /// Stored [`Client`]s.
    clients: BTreeMap<client::Id, Client>,

    /// Stored [`Farm`]s.
    farms: BTreeMap<farm::Id, Farm>,

    /// Stored [`Transaction`]s.
    transactions: BTreeMap<transaction::Id, Transaction>,

    /// Last assigned [`client::Id`].
    last_client_id: i32,

    /// Last assigned [`farm::Id`].
    last_farm_id: i32,

    /// Last assigned [`transaction::Id`].
    last_transaction_id: i32,
}

impl State {
    /// Checks that the provided [`Transaction`] refers to existing entities
    /// and doesn't sell a [`Farm`] twice.
    fn check_transaction(&self, tx: &Transaction) -> Result<(), Error> {
        if !self.clients.contains_key(&tx.client_id) {
            return Err(Error::ForeignKeyViolation(TRANSACTION_CLIENT));
        }
        if !self.farms.contains_key(&tx.farm_id) {
            return Err(Error::ForeignKeyViolation(TRANSACTION_FARM));
        }
        if self
            .transactions
            .values()
            .any(|t| t.farm_id == tx.farm_id && t.id != tx.id)
        {
            return Err(Error::UniqueViolation(FARM_SOLD_ONCE));
        }
        Ok(())
    }
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes this [`Memory`] database (un)available, so every operation
    /// fails with [`Error::Unavailable`] while it's unavailable.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Acquires the [`State`] for reading.
    async fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, State>, Traced<database::Error>> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(tracerr::new!(Error::Unavailable))
                .map_err(tracerr::map_from);
        }
        Ok(state)
    }

    /// Acquires the [`State`] for writing.
    async fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, State>, Traced<database::Error>> {
        let state = self.state.write().await;
        if state.unavailable {
            return Err(tracerr::new!(Error::Unavailable))
                .map_err(tracerr::map_from);
        }
        Ok(state)
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Database cannot be reached.
    #[display("database is unavailable")]
    Unavailable,

    /// Unique constraint is violated.
    #[display("duplicate key value violates unique constraint \"{_0}\"")]
    UniqueViolation(#[error(not(source))] &'static str),

    /// Foreign key constraint is violated.
    #[display("violates foreign key constraint \"{_0}\"")]
    ForeignKeyViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |n| n == *c),
            Self::Unavailable | Self::ForeignKeyViolation(_) => false,
        }
    }

    /// Checks if the error is a foreign key violation.
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation(_))
    }

    /// Checks if the error is a violation of any integrity constraint.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::UniqueViolation(_) | Self::ForeignKeyViolation(_) => true,
            Self::Unavailable => false,
        }
    }
}

/// Selects a [`pagination::Page`] out of the provided `items`.
fn page<K, N: Clone>(
    items: &BTreeMap<K, N>,
    args: pagination::Arguments,
) -> pagination::Page<N> {
    let offset = usize::try_from(args.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(args.limit()).unwrap_or(usize::MAX);
    pagination::Page::new(args, items.values().skip(offset).take(limit).cloned())
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        drop(self.read().await.map_err(tracerr::wrap!())?);
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.read().await.map_err(tracerr::wrap!()).map(drop)
    }
}

/// Implements reading [`Database`] operations of an entity stored in the
/// specified [`State`] field.
macro_rules! impl_reads {
    ($entity:ty, $module:ident, $field:ident) => {
        impl Database<Select<By<Option<$entity>, $module::Id>>> for Memory {
            type Ok = Option<$entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$entity>, $module::Id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self
                    .read()
                    .await
                    .map_err(tracerr::wrap!())?
                    .$field
                    .get(&id)
                    .cloned())
            }
        }

        impl
            Database<
                Select<
                    By<
                        read::$module::list::Page,
                        read::$module::list::Arguments,
                    >,
                >,
            > for Memory
        {
            type Ok = read::$module::list::Page;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<
                    By<
                        read::$module::list::Page,
                        read::$module::list::Arguments,
                    >,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                let args = by.into_inner();
                Ok(page(
                    &self.read().await.map_err(tracerr::wrap!())?.$field,
                    args,
                ))
            }
        }

        impl Database<Lock<By<$entity, $module::Id>>> for Memory {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                _: Lock<By<$entity, $module::Id>>,
            ) -> Result<Self::Ok, Self::Err> {
                // Writes are serialized by the `State` lock already.
                self.read().await.map_err(tracerr::wrap!()).map(drop)
            }
        }
    };
}

impl_reads!(Client, client, clients);
impl_reads!(Farm, farm, farms);
impl_reads!(Transaction, transaction, transactions);

impl Database<Insert<client::New>> for Memory {
    type Ok = Client;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<client::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        state.last_client_id += 1;
        let client = new.with_id(state.last_client_id.into());
        drop(state.clients.insert(client.id, client.clone()));
        Ok(client)
    }
}

impl Database<Update<Client>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(client): Update<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        if let Some(existing) = state.clients.get_mut(&client.id) {
            *existing = client;
        }
        Ok(())
    }
}

impl Database<Delete<By<Client, client::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Client, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        if state.transactions.values().any(|t| t.client_id == id) {
            return Err(tracerr::new!(Error::ForeignKeyViolation(
                TRANSACTION_CLIENT
            )))
            .map_err(tracerr::map_from);
        }
        drop(state.clients.remove(&id));
        Ok(())
    }
}

impl Database<Insert<farm::New>> for Memory {
    type Ok = Farm;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<farm::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        state.last_farm_id += 1;
        let farm = new.with_id(state.last_farm_id.into());
        drop(state.farms.insert(farm.id, farm.clone()));
        Ok(farm)
    }
}

impl Database<Update<Farm>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(farm): Update<Farm>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        if let Some(existing) = state.farms.get_mut(&farm.id) {
            *existing = farm;
        }
        Ok(())
    }
}

impl Database<Delete<By<Farm, farm::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Farm, farm::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        if state.transactions.values().any(|t| t.farm_id == id) {
            return Err(tracerr::new!(Error::ForeignKeyViolation(
                TRANSACTION_FARM
            )))
            .map_err(tracerr::map_from);
        }
        drop(state.farms.remove(&id));
        Ok(())
    }
}

impl Database<Select<By<read::farm::IsSold, farm::Id>>> for Memory {
    type Ok = read::farm::IsSold;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::farm::IsSold, farm::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(read::farm::IsSold(
            self.read()
                .await
                .map_err(tracerr::wrap!())?
                .transactions
                .values()
                .any(|t| t.farm_id == id),
        ))
    }
}

impl Database<Insert<transaction::New>> for Memory {
    type Ok = Transaction;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<transaction::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        let transaction = new.with_id((state.last_transaction_id + 1).into());
        state
            .check_transaction(&transaction)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;

        state.last_transaction_id += 1;
        drop(
            state
                .transactions
                .insert(transaction.id, transaction.clone()),
        );
        Ok(transaction)
    }
}

impl Database<Update<Transaction>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transaction): Update<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.write().await.map_err(tracerr::wrap!())?;
        if !state.transactions.contains_key(&transaction.id) {
            return Ok(());
        }
        state
            .check_transaction(&transaction)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;

        drop(state.transactions.insert(transaction.id, transaction));
        Ok(())
    }
}

impl Database<Delete<By<Transaction, transaction::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Transaction, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        drop(
            self.write()
                .await
                .map_err(tracerr::wrap!())?
                .transactions
                .remove(&id),
        );
        Ok(())
    }
}
