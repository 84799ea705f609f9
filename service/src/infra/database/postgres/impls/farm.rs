//! [`Farm`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{farm, Farm},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl From<Row> for Farm {
    fn from(row: Row) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("nome"),
            location: row.get("localizacao"),
            area: row.get("area"),
        }
    }
}

impl<C> Database<Select<By<Option<Farm>, farm::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Farm>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Farm>, farm::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: farm::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, nome, ST_AsText(localizacao) AS localizacao, area \
            FROM fazendas \
            WHERE id = $1::INT4";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(Farm::from))
    }
}

impl<C> Database<Select<By<read::farm::list::Page, read::farm::list::Arguments>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::farm::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::farm::list::Page, read::farm::list::Arguments>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let args = by.into_inner();
        let limit = i64::from(args.limit());
        let offset = i64::try_from(args.offset()).unwrap_or(i64::MAX);

        const SQL: &str = "\
            SELECT id, nome, ST_AsText(localizacao) AS localizacao, area \
            FROM fazendas \
            ORDER BY id \
            LIMIT $1::INT8 OFFSET $2::INT8";
        Ok(read::farm::list::Page::new(
            args,
            self.query(SQL, &[&limit, &offset])
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(Farm::from),
        ))
    }
}

impl<C> Database<Select<By<read::farm::IsSold, farm::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::farm::IsSold;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::farm::IsSold, farm::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: farm::Id = by.into_inner();

        const SQL: &str = "\
            SELECT EXISTS (SELECT 1 \
                           FROM transacoes \
                           WHERE fazenda_id = $1::INT4) AS is_sold";
        Ok(read::farm::IsSold(
            self.query_one(SQL, &[&id])
                .await
                .map_err(tracerr::wrap!())?
                .get("is_sold"),
        ))
    }
}

impl<C> Database<Insert<farm::New>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Farm;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<farm::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let srid = farm::Location::SRID;

        const SQL: &str = "\
            INSERT INTO fazendas (nome, localizacao, area) \
            VALUES ($1::VARCHAR, \
                    ST_GeomFromText($2::TEXT, $3::INT4), \
                    $4::NUMERIC) \
            RETURNING id";
        let row = self
            .query_one(SQL, &[&new.name, &new.location, &srid, &new.area])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(new.with_id(row.get("id")))
    }
}

impl<C> Database<Update<Farm>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(farm): Update<Farm>,
    ) -> Result<Self::Ok, Self::Err> {
        let Farm {
            id,
            name,
            location,
            area,
        } = farm;
        let srid = farm::Location::SRID;

        const SQL: &str = "\
            UPDATE fazendas \
            SET nome = $2::VARCHAR, \
                localizacao = ST_GeomFromText($3::TEXT, $4::INT4), \
                area = $5::NUMERIC \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id, &name, &location, &srid, &area])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Farm, farm::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Farm, farm::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: farm::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM fazendas \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Farm, farm::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Farm, farm::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: farm::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM fazendas \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
