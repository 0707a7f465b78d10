//! Persistence boundary.
//!
//! The `Store` trait is the unit-of-work seam the pipeline and the query
//! routes talk to: room administration, the atomic multi-record write of one
//! ingested reading, and the range queries behind history, statistics, and
//! evolution. `PgStore` is the Postgres implementation; tests run the
//! pipeline against an in-memory double instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Alert, ComfortIndex, Measurement, ParamKind, ReadingBundle, Room, Severity};

// ---

/// Default cap on listing queries.
const DEFAULT_LIMIT: i64 = 1000;

/// Optional closed time window; an unset bound is unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Filters for measurement listings.
#[derive(Debug, Clone, Default)]
pub struct MeasurementFilter {
    pub room_id: Option<Uuid>,
    pub window: TimeWindow,
    pub limit: Option<i64>,
}

/// Filters for alert listings.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub room_id: Option<Uuid>,
    pub parameter: Option<ParamKind>,
    pub severity: Option<Severity>,
    pub window: TimeWindow,
    pub limit: Option<i64>,
}

// ---

/// Data store contract used by the pipeline and the read paths.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_room(&self, name: &str, description: &str) -> Result<Room, StoreError>;

    async fn room(&self, id: Uuid) -> Result<Option<Room>, StoreError>;

    async fn rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Administrative rename; returns `None` for an unknown room.
    async fn update_room(
        &self,
        id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Option<Room>, StoreError>;

    /// Atomically persist one reading's measurement, comfort index, and
    /// alert set. Either all records become durably visible together or
    /// none do.
    async fn record_reading(&self, bundle: &ReadingBundle) -> Result<(), StoreError>;

    async fn measurements(&self, filter: &MeasurementFilter)
        -> Result<Vec<Measurement>, StoreError>;

    /// Comfort indices for one room within a window, ascending by timestamp.
    async fn comfort_indices(
        &self,
        room_id: Uuid,
        window: TimeWindow,
    ) -> Result<Vec<ComfortIndex>, StoreError>;

    async fn alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StoreError>;

    async fn alert_count(&self, room_id: Uuid, window: TimeWindow) -> Result<u64, StoreError>;

    /// Timestamp of the room's earliest comfort index, if any.
    async fn earliest_index_timestamp(
        &self,
        room_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;
}

// ---

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn index_from_row(row: sqlx::postgres::PgRow) -> Result<ComfortIndex, StoreError> {
    // ---
    let status: String = row.try_get("status")?;
    Ok(ComfortIndex {
        id: row.try_get("id")?,
        measurement_id: row.try_get("measurement_id")?,
        global_score: row.try_get("global_score")?,
        status: status.parse().map_err(StoreError::Decode)?,
        score_temperature: row.try_get("score_temperature")?,
        score_humidity: row.try_get("score_humidity")?,
        score_air: row.try_get("score_air")?,
        score_noise: row.try_get("score_noise")?,
        score_light: row.try_get("score_light")?,
        timestamp: row.try_get("timestamp")?,
    })
}

fn alert_from_row(row: sqlx::postgres::PgRow) -> Result<Alert, StoreError> {
    // ---
    let parameter: String = row.try_get("parameter")?;
    let severity: String = row.try_get("severity")?;
    Ok(Alert {
        id: row.try_get("id")?,
        measurement_id: row.try_get("measurement_id")?,
        parameter: parameter.parse().map_err(StoreError::Decode)?,
        value: row.try_get("value")?,
        threshold: row.try_get("threshold")?,
        severity: severity.parse().map_err(StoreError::Decode)?,
        message: row.try_get("message")?,
        timestamp: row.try_get("timestamp")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn create_room(&self, name: &str, description: &str) -> Result<Room, StoreError> {
        // ---
        let room = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(room)
    }

    async fn room(&self, id: Uuid) -> Result<Option<Room>, StoreError> {
        // ---
        let room =
            sqlx::query_as::<_, Room>("SELECT id, name, description FROM rooms WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(room)
    }

    async fn rooms(&self) -> Result<Vec<Room>, StoreError> {
        // ---
        let rooms =
            sqlx::query_as::<_, Room>("SELECT id, name, description FROM rooms ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rooms)
    }

    async fn update_room(
        &self,
        id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Option<Room>, StoreError> {
        // ---
        let room = sqlx::query_as::<_, Room>(
            r#"
            UPDATE rooms SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    async fn record_reading(&self, bundle: &ReadingBundle) -> Result<(), StoreError> {
        // ---
        let mut tx = self.pool.begin().await?;

        let m = &bundle.measurement;
        sqlx::query(
            r#"
            INSERT INTO measurements (
                id, room_id, temperature, humidity, air, noise, light, timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(m.id)
        .bind(m.room_id)
        .bind(m.temperature)
        .bind(m.humidity)
        .bind(m.air)
        .bind(m.noise)
        .bind(m.light)
        .bind(m.timestamp)
        .execute(&mut *tx)
        .await?;

        let ci = &bundle.comfort_index;
        sqlx::query(
            r#"
            INSERT INTO comfort_indices (
                id, measurement_id, global_score, status,
                score_temperature, score_humidity, score_air, score_noise, score_light,
                timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(ci.id)
        .bind(ci.measurement_id)
        .bind(ci.global_score)
        .bind(ci.status.as_str())
        .bind(ci.score_temperature)
        .bind(ci.score_humidity)
        .bind(ci.score_air)
        .bind(ci.score_noise)
        .bind(ci.score_light)
        .bind(ci.timestamp)
        .execute(&mut *tx)
        .await?;

        for alert in &bundle.alerts {
            sqlx::query(
                r#"
                INSERT INTO alerts (
                    id, measurement_id, parameter, value, threshold, severity, message, timestamp
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(alert.id)
            .bind(alert.measurement_id)
            .bind(alert.parameter.as_str())
            .bind(alert.value)
            .bind(alert.threshold)
            .bind(alert.severity.as_str())
            .bind(&alert.message)
            .bind(alert.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<Measurement>, StoreError> {
        // ---
        let rows = sqlx::query_as::<_, Measurement>(
            r#"
            SELECT id, room_id, temperature, humidity, air, noise, light, timestamp
            FROM measurements
            WHERE ($1::uuid IS NULL OR room_id = $1)
              AND ($2::timestamptz IS NULL OR timestamp >= $2)
              AND ($3::timestamptz IS NULL OR timestamp <= $3)
            ORDER BY timestamp DESC
            LIMIT $4
            "#,
        )
        .bind(filter.room_id)
        .bind(filter.window.start)
        .bind(filter.window.end)
        .bind(filter.limit.unwrap_or(DEFAULT_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn comfort_indices(
        &self,
        room_id: Uuid,
        window: TimeWindow,
    ) -> Result<Vec<ComfortIndex>, StoreError> {
        // ---
        let rows = sqlx::query(
            r#"
            SELECT ci.id, ci.measurement_id, ci.global_score, ci.status,
                   ci.score_temperature, ci.score_humidity, ci.score_air,
                   ci.score_noise, ci.score_light, ci.timestamp
            FROM comfort_indices ci
            JOIN measurements m ON m.id = ci.measurement_id
            WHERE m.room_id = $1
              AND ($2::timestamptz IS NULL OR ci.timestamp >= $2)
              AND ($3::timestamptz IS NULL OR ci.timestamp <= $3)
            ORDER BY ci.timestamp ASC
            "#,
        )
        .bind(room_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(index_from_row).collect()
    }

    async fn alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StoreError> {
        // ---
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.measurement_id, a.parameter, a.value, a.threshold,
                   a.severity, a.message, a.timestamp
            FROM alerts a
            JOIN measurements m ON m.id = a.measurement_id
            WHERE ($1::uuid IS NULL OR m.room_id = $1)
              AND ($2::text IS NULL OR a.parameter = $2)
              AND ($3::text IS NULL OR a.severity = $3)
              AND ($4::timestamptz IS NULL OR a.timestamp >= $4)
              AND ($5::timestamptz IS NULL OR a.timestamp <= $5)
            ORDER BY a.timestamp DESC
            LIMIT $6
            "#,
        )
        .bind(filter.room_id)
        .bind(filter.parameter.map(|p| p.as_str()))
        .bind(filter.severity.map(|s| s.as_str()))
        .bind(filter.window.start)
        .bind(filter.window.end)
        .bind(filter.limit.unwrap_or(DEFAULT_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(alert_from_row).collect()
    }

    async fn alert_count(&self, room_id: Uuid, window: TimeWindow) -> Result<u64, StoreError> {
        // ---
        let row = sqlx::query(
            r#"
            SELECT COUNT(*)
            FROM alerts a
            JOIN measurements m ON m.id = a.measurement_id
            WHERE m.room_id = $1
              AND ($2::timestamptz IS NULL OR a.timestamp >= $2)
              AND ($3::timestamptz IS NULL OR a.timestamp <= $3)
            "#,
        )
        .bind(room_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn earliest_index_timestamp(
        &self,
        room_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        // ---
        let row = sqlx::query(
            r#"
            SELECT MIN(ci.timestamp)
            FROM comfort_indices ci
            JOIN measurements m ON m.id = ci.measurement_id
            WHERE m.room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get(0)?)
    }
}

// ---
