use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AggregateId, DomainEvent, EventEnvelope, EventId, EventQuery, EventRegistry, EventStoreError,
    Principal, RecordedEvent, Result, StoredEvent, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

/// PostgreSQL-backed event store.
///
/// Events land in the `events` table; every append also writes an
/// `events_outbox` row in the same transaction, which is what gives the
/// outbox relay a crash-safe record of what still needs delivering.
pub struct PostgresEventStore<E> {
    pool: PgPool,
    registry: Arc<EventRegistry<E>>,
}

impl<E> Clone for PostgresEventStore<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> PostgresEventStore<E> {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool, registry: Arc<EventRegistry<E>>) -> Self {
        Self { pool, registry }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_envelope(row: &PgRow) -> Result<EventEnvelope> {
        let issued_by_raw: String = row.try_get("event_issued_by")?;
        let issued_by: Principal = serde_json::from_str(&issued_by_raw)?;

        Ok(EventEnvelope {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("event_id")?),
            event_type: row.try_get("event_type")?,
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id")?),
            aggregate_type: row.try_get("aggregate_type")?,
            version: Version::new(row.try_get("aggregate_version")?),
            issued_at: row.try_get::<DateTime<Utc>, _>("event_issued_at")?,
            issued_by,
            payload: row.try_get("event_data")?,
        })
    }
}

#[async_trait]
impl<E: DomainEvent> EventStore<E> for PostgresEventStore<E> {
    async fn append(&self, events: Vec<RecordedEvent<E>>, options: AppendOptions) -> Result<()> {
        validate_events_for_append(&events, &options)?;

        let envelopes = events
            .iter()
            .map(RecordedEvent::to_envelope)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let aggregate_id = events[0].aggregate_id;

        let mut tx = self.pool.begin().await?;

        if let Some(expected) = options.expected_version {
            let current: Option<i64> = sqlx::query_scalar(
                "SELECT MAX(aggregate_version) FROM events WHERE aggregate_id = $1",
            )
            .bind(aggregate_id.as_uuid())
            .fetch_one(&mut *tx)
            .await?;

            let actual = Version::new(current.unwrap_or(0));
            if actual != expected {
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id,
                    expected,
                    actual,
                });
            }
        }

        for envelope in &envelopes {
            let issued_by = serde_json::to_string(&envelope.issued_by)?;

            sqlx::query(
                r#"
                INSERT INTO events
                    (event_id, event_type, event_issued_at, event_issued_by, event_data,
                     aggregate_id, aggregate_type, aggregate_version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(envelope.event_id.as_uuid())
            .bind(&envelope.event_type)
            .bind(envelope.issued_at)
            .bind(issued_by)
            .bind(&envelope.payload)
            .bind(envelope.aggregate_id.as_uuid())
            .bind(&envelope.aggregate_type)
            .bind(envelope.version.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // A unique violation here means another writer appended the
                // same version first.
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("unique_aggregate_version")
                {
                    return EventStoreError::ConcurrencyConflict {
                        aggregate_id,
                        expected: options.expected_version.unwrap_or(Version::initial()),
                        actual: envelope.version,
                    };
                }
                EventStoreError::Database(e)
            })?;

            sqlx::query(
                r#"
                INSERT INTO events_outbox (event_id, published, aggregate_version)
                VALUES ($1, FALSE, $2)
                "#,
            )
            .bind(envelope.event_id.as_uuid())
            .bind(envelope.version.as_i64())
            .execute(&mut *tx)
            .await?;

            tracing::debug!(
                event_type = %envelope.event_type,
                aggregate_id = %envelope.aggregate_id,
                version = %envelope.version,
                "stored event"
            );
        }

        tx.commit().await?;
        metrics::counter!("event_store_events_appended").increment(envelopes.len() as u64);
        Ok(())
    }

    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
    ) -> Result<Vec<RecordedEvent<E>>> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, event_type, event_issued_at, event_issued_by, event_data,
                   aggregate_id, aggregate_type, aggregate_version
            FROM events
            WHERE aggregate_type = $1 AND aggregate_id = $2
            ORDER BY aggregate_version ASC
            "#,
        )
        .bind(aggregate_type)
        .bind(aggregate_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| self.registry.hydrate(Self::row_to_envelope(row)?))
            .collect()
    }

    async fn load_unpublished(&self, batch_size: usize) -> Result<Vec<RecordedEvent<E>>> {
        let rows = sqlx::query(
            r#"
            SELECT e.event_id, e.event_type, e.event_issued_at, e.event_issued_by, e.event_data,
                   e.aggregate_id, e.aggregate_type, e.aggregate_version
            FROM events e
            JOIN events_outbox o ON o.event_id = e.event_id
            WHERE o.published = FALSE
            ORDER BY o.aggregate_version ASC
            LIMIT $1
            "#,
        )
        .bind(batch_size as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| self.registry.hydrate(Self::row_to_envelope(row)?))
            .collect()
    }

    async fn mark_published(&self, event_ids: &[EventId]) -> Result<()> {
        if event_ids.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = event_ids.iter().map(EventId::as_uuid).collect();
        let result = sqlx::query("UPDATE events_outbox SET published = TRUE WHERE event_id = ANY($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await?;

        metrics::counter!("event_store_events_marked_published").increment(result.rows_affected());
        Ok(())
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<StoredEvent<E>>> {
        let mut sql = String::from(
            "SELECT e.event_id, e.event_type, e.event_issued_at, e.event_issued_by, e.event_data, \
             e.aggregate_id, e.aggregate_type, e.aggregate_version, o.published \
             FROM events e JOIN events_outbox o ON o.event_id = e.event_id WHERE 1=1",
        );
        let mut param_count = 0;

        if query.aggregate_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND e.aggregate_id = ${param_count}"));
        }
        if query.aggregate_type.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND e.aggregate_type = ${param_count}"));
        }
        if query.published.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND o.published = ${param_count}"));
        }

        sql.push_str(" ORDER BY e.event_issued_at ASC, e.aggregate_version ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);
        if let Some(id) = query.aggregate_id {
            sqlx_query = sqlx_query.bind(id.as_uuid());
        }
        if let Some(aggregate_type) = query.aggregate_type {
            sqlx_query = sqlx_query.bind(aggregate_type);
        }
        if let Some(published) = query.published {
            sqlx_query = sqlx_query.bind(published);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                Ok(StoredEvent {
                    event: self.registry.hydrate(Self::row_to_envelope(row)?)?,
                    published: row.try_get("published")?,
                })
            })
            .collect()
    }
}
