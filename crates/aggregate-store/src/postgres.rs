use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{AggregateId, AggregateRecord, Result, store::AggregateStore};

/// PostgreSQL-backed aggregate store implementation.
#[derive(Clone)]
pub struct PostgresAggregateStore {
    pool: PgPool,
}

impl PostgresAggregateStore {
    /// Creates a new PostgreSQL aggregate store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("aggregate store migrations applied");
        Ok(())
    }

    fn row_to_record(row: PgRow) -> Result<AggregateRecord> {
        Ok(AggregateRecord {
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id")?),
            aggregate_type: row.try_get("aggregate_type")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            state: row.try_get("state")?,
        })
    }
}

#[async_trait]
impl AggregateStore for PostgresAggregateStore {
    #[tracing::instrument(
        skip(self, record),
        fields(aggregate_id = %record.aggregate_id, aggregate_type = %record.aggregate_type)
    )]
    async fn save(&self, record: AggregateRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO aggregates (aggregate_id, aggregate_type, updated_at, state)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (aggregate_id) DO UPDATE SET
                aggregate_type = EXCLUDED.aggregate_type,
                updated_at = EXCLUDED.updated_at,
                state = EXCLUDED.state
            "#,
        )
        .bind(record.aggregate_id.as_uuid())
        .bind(&record.aggregate_type)
        .bind(record.updated_at)
        .bind(&record.state)
        .execute(&self.pool)
        .await?;

        metrics::counter!("aggregate_store_writes_total").increment(1);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, aggregate_id: AggregateId) -> Result<Option<AggregateRecord>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT aggregate_id, aggregate_type, updated_at, state
            FROM aggregates
            WHERE aggregate_id = $1
            "#,
        )
        .bind(aggregate_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn load_all(&self, aggregate_type: &str) -> Result<Vec<AggregateRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT aggregate_id, aggregate_type, updated_at, state
            FROM aggregates
            WHERE aggregate_type = $1
            ORDER BY aggregate_id ASC
            "#,
        )
        .bind(aggregate_type)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }
}
