//! [`Client`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl From<Row> for Client {
    fn from(row: Row) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("nome"),
            email: row.get("email"),
            phone: row.get("telefone"),
        }
    }
}

impl<C> Database<Select<By<Option<Client>, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: client::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, nome, email, telefone \
            FROM clientes \
            WHERE id = $1::INT4";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(Client::from))
    }
}

impl<C> Database<Select<By<read::client::list::Page, read::client::list::Arguments>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::client::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::client::list::Page, read::client::list::Arguments>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let args = by.into_inner();
        let limit = i64::from(args.limit());
        let offset = i64::try_from(args.offset()).unwrap_or(i64::MAX);

        const SQL: &str = "\
            SELECT id, nome, email, telefone \
            FROM clientes \
            ORDER BY id \
            LIMIT $1::INT8 OFFSET $2::INT8";
        Ok(read::client::list::Page::new(
            args,
            self.query(SQL, &[&limit, &offset])
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(Client::from),
        ))
    }
}

impl<C> Database<Insert<client::New>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Client;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<client::New>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO clientes (nome, email, telefone) \
            VALUES ($1::VARCHAR, $2::VARCHAR, $3::VARCHAR) \
            RETURNING id";
        let row = self
            .query_one(SQL, &[&new.name, &new.email, &new.phone])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(new.with_id(row.get("id")))
    }
}

impl<C> Database<Update<Client>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(client): Update<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        let Client {
            id,
            name,
            email,
            phone,
        } = client;

        const SQL: &str = "\
            UPDATE clientes \
            SET nome = $2::VARCHAR, \
                email = $3::VARCHAR, \
                telefone = $4::VARCHAR \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id, &name, &email, &phone])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Client, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Client, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: client::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM clientes \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Client, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Client, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: client::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM clientes \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
