//! Database schema management for `roomsense`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the room, measurement, comfort index, and alert tables. Deletion
/// cascades down the derivation chain: removing a room removes its
/// measurements, and removing a measurement removes its index and alerts.
/// Safe to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id          UUID PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS measurements (
            id          UUID             PRIMARY KEY,
            room_id     UUID             NOT NULL REFERENCES rooms (id) ON DELETE CASCADE,
            temperature DOUBLE PRECISION NOT NULL,
            humidity    DOUBLE PRECISION NOT NULL,
            air         DOUBLE PRECISION NOT NULL,
            noise       DOUBLE PRECISION NOT NULL,
            light       DOUBLE PRECISION NOT NULL,
            timestamp   TIMESTAMPTZ      NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // One comfort index per measurement, enforced by the unique reference
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comfort_indices (
            id                UUID             PRIMARY KEY,
            measurement_id    UUID             NOT NULL UNIQUE
                              REFERENCES measurements (id) ON DELETE CASCADE,
            global_score      DOUBLE PRECISION NOT NULL,
            status            TEXT             NOT NULL,
            score_temperature DOUBLE PRECISION NOT NULL,
            score_humidity    DOUBLE PRECISION NOT NULL,
            score_air         DOUBLE PRECISION NOT NULL,
            score_noise       DOUBLE PRECISION NOT NULL,
            score_light       DOUBLE PRECISION NOT NULL,
            timestamp         TIMESTAMPTZ      NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id             UUID             PRIMARY KEY,
            measurement_id UUID             NOT NULL
                           REFERENCES measurements (id) ON DELETE CASCADE,
            parameter      TEXT             NOT NULL,
            value          DOUBLE PRECISION NOT NULL,
            threshold      DOUBLE PRECISION NOT NULL,
            severity       TEXT             NOT NULL,
            message        TEXT             NOT NULL,
            timestamp      TIMESTAMPTZ      NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Indexes for the room/time-window queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_measurements_room_ts
            ON measurements (room_id, timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_comfort_indices_ts
            ON comfort_indices (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_alerts_ts
            ON alerts (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
