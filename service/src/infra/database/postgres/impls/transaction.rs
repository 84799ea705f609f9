//! [`Transaction`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{transaction, Transaction},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl From<Row> for Transaction {
    fn from(row: Row) -> Self {
        Self {
            id: row.get("id"),
            client_id: row.get("cliente_id"),
            farm_id: row.get("fazenda_id"),
            date: row.get("data_transacao"),
            amount: row.get("valor"),
        }
    }
}

impl<C> Database<Select<By<Option<Transaction>, transaction::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Transaction>, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: transaction::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, cliente_id, fazenda_id, data_transacao, valor \
            FROM transacoes \
            WHERE id = $1::INT4";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(Transaction::from))
    }
}

impl<C>
    Database<
        Select<
            By<
                read::transaction::list::Page,
                read::transaction::list::Arguments,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::transaction::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::transaction::list::Page,
                read::transaction::list::Arguments,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let args = by.into_inner();
        let limit = i64::from(args.limit());
        let offset = i64::try_from(args.offset()).unwrap_or(i64::MAX);

        const SQL: &str = "\
            SELECT id, cliente_id, fazenda_id, data_transacao, valor \
            FROM transacoes \
            ORDER BY id \
            LIMIT $1::INT8 OFFSET $2::INT8";
        Ok(read::transaction::list::Page::new(
            args,
            self.query(SQL, &[&limit, &offset])
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(Transaction::from),
        ))
    }
}

impl<C> Database<Insert<transaction::New>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Transaction;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<transaction::New>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO transacoes (cliente_id, fazenda_id, \
                                    data_transacao, valor) \
            VALUES ($1::INT4, $2::INT4, $3::TIMESTAMPTZ, $4::NUMERIC) \
            RETURNING id";
        let row = self
            .query_one(
                SQL,
                &[&new.client_id, &new.farm_id, &new.date, &new.amount],
            )
            .await
            .map_err(tracerr::wrap!())?;
        Ok(new.with_id(row.get("id")))
    }
}

impl<C> Database<Update<Transaction>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transaction): Update<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        let Transaction {
            id,
            client_id,
            farm_id,
            date,
            amount,
        } = transaction;

        const SQL: &str = "\
            UPDATE transacoes \
            SET cliente_id = $2::INT4, \
                fazenda_id = $3::INT4, \
                data_transacao = $4::TIMESTAMPTZ, \
                valor = $5::NUMERIC \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id, &client_id, &farm_id, &date, &amount])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Transaction, transaction::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Transaction, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: transaction::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM transacoes \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Transaction, transaction::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Transaction, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: transaction::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM transacoes \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
