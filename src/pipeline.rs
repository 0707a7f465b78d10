//! Ingestion pipeline.
//!
//! Orchestrates one reading end to end: validate, derive the comfort index
//! and alerts, persist everything as one atomic unit, then publish the
//! bundle to the room's subscribers. Persistence failure means the whole
//! reading is un-ingested; each resubmission creates fresh records, so
//! callers needing exactly-once semantics dedupe upstream.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::alerts::AlertEngine;
use crate::comfort::{ScoreEngine, WeightTable, ZoneTable};
use crate::error::IngestError;
use crate::models::{ComfortIndex, Measurement, NewReading, ReadingBundle};
use crate::notify::Notifier;
use crate::store::Store;

// ---

pub struct IngestionPipeline<S> {
    store: Arc<S>,
    scorer: ScoreEngine,
    detector: AlertEngine,
    notifier: Notifier,
}

impl<S: Store> IngestionPipeline<S> {
    /// Pipeline with the standard zone and weight tables.
    pub fn new(store: Arc<S>, notifier: Notifier) -> Self {
        Self::with_tables(store, notifier, ZoneTable::default(), WeightTable::default())
    }

    /// Pipeline with substituted tables; both engines share the zone table.
    pub fn with_tables(
        store: Arc<S>,
        notifier: Notifier,
        zones: ZoneTable,
        weights: WeightTable,
    ) -> Self {
        Self {
            store,
            scorer: ScoreEngine::new(zones, weights),
            detector: AlertEngine::new(zones),
            notifier,
        }
    }

    /// Ingest one reading.
    ///
    /// Validation happens before any write; the measurement, its comfort
    /// index, and its alerts are persisted atomically; notification is
    /// fire-and-forget after the write commits.
    pub async fn ingest(&self, reading: NewReading) -> Result<ReadingBundle, IngestError> {
        // ---
        if let Some(param) = reading.non_finite_field() {
            return Err(IngestError::InvalidReading(format!(
                "{param} must be a finite number"
            )));
        }

        let room = self
            .store
            .room(reading.room_id)
            .await?
            .ok_or(IngestError::RoomNotFound(reading.room_id))?;

        let timestamp = reading.timestamp.unwrap_or_else(Utc::now);
        let measurement = Measurement {
            id: Uuid::new_v4(),
            room_id: room.id,
            temperature: reading.temperature,
            humidity: reading.humidity,
            air: reading.air,
            noise: reading.noise,
            light: reading.light,
            timestamp,
        };

        let scores = self.scorer.score_measurement(&measurement);
        let global_score = self.scorer.global_score(&scores);
        let comfort_index = ComfortIndex {
            id: Uuid::new_v4(),
            measurement_id: measurement.id,
            global_score,
            status: self.scorer.classify_status(global_score),
            score_temperature: scores.temperature,
            score_humidity: scores.humidity,
            score_air: scores.air,
            score_noise: scores.noise,
            score_light: scores.light,
            timestamp,
        };

        let alerts = self.detector.detect(&measurement);

        let bundle = ReadingBundle {
            measurement,
            comfort_index,
            alerts,
        };

        self.store.record_reading(&bundle).await?;

        tracing::debug!(
            room = %room.id,
            score = bundle.comfort_index.global_score,
            status = bundle.comfort_index.status.as_str(),
            alerts = bundle.alerts.len(),
            "reading ingested"
        );

        self.notifier.publish(room.id, &bundle);

        Ok(bundle)
    }
}
