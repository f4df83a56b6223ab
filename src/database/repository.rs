use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool};
use std::marker::PhantomData;
use tracing::{debug, info};
use uuid::Uuid;

use super::collection::{Collection, Document};
use super::DatabaseError;
use crate::filter::Filter;

/// PostgreSQL repository storing one JSONB document per row.
pub struct PgCollection<T> {
    pool: PgPool,
    _phantom: PhantomData<T>,
}

impl<T: Document> PgCollection<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    fn unique_index_name(field: &str) -> String {
        format!("{}_{}_key", T::COLLECTION, field)
    }

    /// Idempotent table and index creation.
    pub async fn bootstrap(&self) -> Result<(), DatabaseError> {
        let table = T::COLLECTION;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\
                id UUID PRIMARY KEY, \
                doc JSONB NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now())",
            table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS \"{0}_doc_idx\" ON \"{0}\" USING GIN (doc jsonb_path_ops)",
            table
        ))
        .execute(&self.pool)
        .await?;

        for field in T::UNIQUE_FIELDS {
            sqlx::query(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"{}\" ON \"{}\" (lower(doc->>'{}'))",
                Self::unique_index_name(field),
                table,
                field
            ))
            .execute(&self.pool)
            .await?;
        }

        info!("Collection ready: {}", table);
        Ok(())
    }

    /// Unique violations become `Conflict` naming the offending field.
    fn map_write_error(err: sqlx::Error) -> DatabaseError {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or_default();
                let field = T::UNIQUE_FIELDS
                    .iter()
                    .find(|f| Self::unique_index_name(f) == constraint)
                    .copied()
                    .unwrap_or("id");
                return DatabaseError::Conflict(T::conflict_message(field));
            }
        }
        DatabaseError::Sqlx(err)
    }

    fn decode(value: Value) -> Result<T, DatabaseError> {
        Ok(serde_json::from_value(value)?)
    }
}

fn bind_param<'q>(
    q: sqlx::query::QueryScalar<'q, sqlx::Postgres, Value, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, Value, PgArguments> {
    match v {
        Value::String(s) => q.bind(s.as_str()),
        other => q.bind(other),
    }
}

fn bind_count_param<'q>(
    q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, PgArguments> {
    match v {
        Value::String(s) => q.bind(s.as_str()),
        other => q.bind(other),
    }
}

#[async_trait]
impl<T: Document> Collection<T> for PgCollection<T> {
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        let sql = filter.to_sql(T::COLLECTION);
        debug!("{} {:?}", sql.query, sql.params);
        let mut q = sqlx::query_scalar::<_, Value>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::decode).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let row = sqlx::query_scalar::<_, Value>(&format!(
            "SELECT doc FROM \"{}\" WHERE id = $1",
            T::COLLECTION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::decode).transpose()
    }

    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql = filter.to_count_sql(T::COLLECTION);
        let mut q = sqlx::query_scalar::<_, i64>(&sql.query);
        for p in sql.params.iter() {
            q = bind_count_param(q, p);
        }
        let count = q.fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn insert(&self, doc: T) -> Result<T, DatabaseError> {
        let value = serde_json::to_value(&doc)?;
        sqlx::query(&format!(
            "INSERT INTO \"{}\" (id, doc) VALUES ($1, $2)",
            T::COLLECTION
        ))
        .bind(doc.id())
        .bind(&value)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;
        Ok(doc)
    }

    async fn replace(&self, doc: T) -> Result<T, DatabaseError> {
        let value = serde_json::to_value(&doc)?;
        let result = sqlx::query(&format!(
            "UPDATE \"{}\" SET doc = $2, updated_at = now() WHERE id = $1",
            T::COLLECTION
        ))
        .bind(doc.id())
        .bind(&value)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "{} {} not found",
                T::COLLECTION,
                doc.id()
            )));
        }
        Ok(doc)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query(&format!("DELETE FROM \"{}\" WHERE id = $1", T::COLLECTION))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
