//! Per-room fan-out of ingested reading bundles.
//!
//! Each room gets a broadcast channel on first subscription. Publishing is
//! fire-and-forget: a room with no live subscribers drops the bundle, a
//! lagging subscriber loses the oldest buffered bundles. Subscribers that
//! need a complete record poll the persisted history instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::ReadingBundle;

// ---

type Channels = HashMap<Uuid, broadcast::Sender<Arc<ReadingBundle>>>;

#[derive(Clone)]
pub struct Notifier {
    capacity: usize,
    channels: Arc<Mutex<Channels>>,
}

impl Notifier {
    /// `capacity` bounds the per-room buffer of undelivered bundles.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        // A poisoned map is still usable; the payload is plain data.
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish a bundle to the room's subscribers, if any. Never fails and
    /// never blocks; an undeliverable bundle is logged and dropped.
    pub fn publish(&self, room_id: Uuid, bundle: &ReadingBundle) {
        let mut channels = self.lock();
        let Some(tx) = channels.get(&room_id) else {
            return;
        };
        if tx.send(Arc::new(bundle.clone())).is_err() {
            // Last subscriber is gone; drop the channel with the bundle.
            channels.remove(&room_id);
            tracing::debug!(%room_id, "no live subscribers, bundle dropped");
        }
    }

    /// Subscribe to a room's bundle feed, creating the channel on demand.
    pub fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<Arc<ReadingBundle>> {
        self.lock()
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{ComfortIndex, Measurement, Status};
    use chrono::Utc;

    fn bundle(room_id: Uuid) -> ReadingBundle {
        // ---
        let now = Utc::now();
        let measurement_id = Uuid::new_v4();
        ReadingBundle {
            measurement: Measurement {
                id: measurement_id,
                room_id,
                temperature: 24.0,
                humidity: 50.0,
                air: 500.0,
                noise: 45.0,
                light: 400.0,
                timestamp: now,
            },
            comfort_index: ComfortIndex {
                id: Uuid::new_v4(),
                measurement_id,
                global_score: 100.0,
                status: Status::Comfort,
                score_temperature: 100.0,
                score_humidity: 100.0,
                score_air: 100.0,
                score_noise: 100.0,
                score_light: 100.0,
                timestamp: now,
            },
            alerts: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_bundle() {
        // ---
        let notifier = Notifier::new(8);
        let room_id = Uuid::new_v4();
        let mut rx = notifier.subscribe(room_id);

        notifier.publish(room_id, &bundle(room_id));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.measurement.room_id, room_id);
        assert_eq!(received.comfort_index.status, Status::Comfort);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_no_op() {
        // ---
        let notifier = Notifier::new(8);
        let room_id = Uuid::new_v4();

        // No channel yet
        notifier.publish(room_id, &bundle(room_id));

        // Channel existed but the only receiver is gone
        drop(notifier.subscribe(room_id));
        notifier.publish(room_id, &bundle(room_id));
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        // ---
        let notifier = Notifier::new(8);
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();
        let mut rx_a = notifier.subscribe(room_a);

        notifier.publish(room_b, &bundle(room_b));
        notifier.publish(room_a, &bundle(room_a));

        let received = rx_a.recv().await.unwrap();
        assert_eq!(received.measurement.room_id, room_a);
        assert!(rx_a.try_recv().is_err());
    }
}
