//! Time-bucketed comfort trend aggregation.
//!
//! Projects an ordered comfort index history onto fixed hour or day buckets
//! for chart rendering. One linear scan fills per-bucket accumulators keyed
//! by the truncated timestamp; each bucket tracks min/max/avg and the value
//! carried by the latest record it contains, for each of the six signals
//! (global score plus the five parameter scores).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ComfortIndex;

// ---

const SIGNALS: usize = 6;

/// Bucket width for trend aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    #[default]
    Day,
}

impl Granularity {
    fn step_secs(&self) -> i64 {
        match self {
            Granularity::Hour => 3_600,
            Granularity::Day => 86_400,
        }
    }

    /// Truncate a timestamp to its bucket key (UTC hour or day boundary).
    pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let step = self.step_secs();
        let floored = ts.timestamp().div_euclid(step) * step;
        DateTime::from_timestamp(floored, 0).unwrap_or(ts)
    }
}

/// Aggregates for a single signal within one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Value on the chronologically latest record in the bucket.
    pub current: f64,
}

/// One emitted bucket: aggregates for the global score and each parameter.
#[derive(Debug, Clone, Serialize)]
pub struct TrendBucket {
    /// Bucket key: the timestamp truncated to the granularity.
    pub period: DateTime<Utc>,
    pub count: usize,
    pub global: SignalSummary,
    pub temperature: SignalSummary,
    pub humidity: SignalSummary,
    pub air: SignalSummary,
    pub noise: SignalSummary,
    pub light: SignalSummary,
}

// ---

struct Accumulator {
    count: usize,
    latest: DateTime<Utc>,
    sum: [f64; SIGNALS],
    min: [f64; SIGNALS],
    max: [f64; SIGNALS],
    current: [f64; SIGNALS],
}

impl Accumulator {
    fn seed(ts: DateTime<Utc>, values: [f64; SIGNALS]) -> Self {
        Self {
            count: 1,
            latest: ts,
            sum: values,
            min: values,
            max: values,
            current: values,
        }
    }

    fn absorb(&mut self, ts: DateTime<Utc>, values: [f64; SIGNALS]) {
        self.count += 1;
        for i in 0..SIGNALS {
            self.sum[i] += values[i];
            self.min[i] = self.min[i].min(values[i]);
            self.max[i] = self.max[i].max(values[i]);
        }
        // All six current values come from the same latest record; on a
        // timestamp tie the later-scanned record wins.
        if ts >= self.latest {
            self.latest = ts;
            self.current = values;
        }
    }

    fn summary(&self, i: usize) -> SignalSummary {
        SignalSummary {
            min: self.min[i],
            max: self.max[i],
            avg: self.sum[i] / self.count as f64,
            current: self.current[i],
        }
    }

    fn into_bucket(self, period: DateTime<Utc>) -> TrendBucket {
        TrendBucket {
            period,
            count: self.count,
            global: self.summary(0),
            temperature: self.summary(1),
            humidity: self.summary(2),
            air: self.summary(3),
            noise: self.summary(4),
            light: self.summary(5),
        }
    }
}

fn signal_values(index: &ComfortIndex) -> [f64; SIGNALS] {
    [
        index.global_score,
        index.score_temperature,
        index.score_humidity,
        index.score_air,
        index.score_noise,
        index.score_light,
    ]
}

/// Bucket a comfort index history into fixed intervals.
///
/// Buckets are emitted in ascending chronological order; intervals never
/// overlap and empty ones are omitted. An empty history yields an empty
/// result. Pure and deterministic for a fixed history snapshot.
pub fn aggregate(history: &[ComfortIndex], granularity: Granularity) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<DateTime<Utc>, Accumulator> = BTreeMap::new();

    for index in history {
        let period = granularity.truncate(index.timestamp);
        let values = signal_values(index);
        buckets
            .entry(period)
            .and_modify(|acc| acc.absorb(index.timestamp, values))
            .or_insert_with(|| Accumulator::seed(index.timestamp, values));
    }

    buckets
        .into_iter()
        .map(|(period, acc)| acc.into_bucket(period))
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::Status;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn index_at(ts: DateTime<Utc>, global: f64, temperature: f64) -> ComfortIndex {
        // ---
        ComfortIndex {
            id: Uuid::new_v4(),
            measurement_id: Uuid::new_v4(),
            global_score: global,
            status: Status::Comfort,
            score_temperature: temperature,
            score_humidity: 90.0,
            score_air: 80.0,
            score_noise: 70.0,
            score_light: 60.0,
            timestamp: ts,
        }
    }

    fn ts(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, min, 0).unwrap()
    }

    #[test]
    fn test_empty_history_yields_empty_result() {
        // ---
        assert!(aggregate(&[], Granularity::Hour).is_empty());
        assert!(aggregate(&[], Granularity::Day).is_empty());
    }

    #[test]
    fn test_single_record_min_max_avg_current_coincide() {
        // ---
        let history = [index_at(ts(10, 30), 85.0, 95.0)];
        let buckets = aggregate(&history, Granularity::Hour);

        assert_eq!(buckets.len(), 1);
        let bucket = &buckets[0];
        assert_eq!(bucket.period, ts(10, 0));
        assert_eq!(bucket.count, 1);

        for summary in [
            bucket.global,
            bucket.temperature,
            bucket.humidity,
            bucket.air,
            bucket.noise,
            bucket.light,
        ] {
            assert_eq!(summary.min, summary.max);
            assert_eq!(summary.min, summary.avg);
            assert_eq!(summary.min, summary.current);
        }
        assert_eq!(bucket.global.current, 85.0);
        assert_eq!(bucket.temperature.current, 95.0);
    }

    #[test]
    fn test_current_is_latest_record_in_bucket() {
        // ---
        let history = [
            index_at(ts(10, 5), 50.0, 40.0),
            index_at(ts(10, 25), 90.0, 100.0),
            index_at(ts(10, 45), 70.0, 60.0),
        ];
        let buckets = aggregate(&history, Granularity::Hour);

        assert_eq!(buckets.len(), 1);
        let bucket = &buckets[0];
        assert_eq!(bucket.count, 3);
        assert_eq!(bucket.global.min, 50.0);
        assert_eq!(bucket.global.max, 90.0);
        assert_eq!(bucket.global.avg, 70.0);
        // Latest record at 10:45 carries every current value
        assert_eq!(bucket.global.current, 70.0);
        assert_eq!(bucket.temperature.current, 60.0);
    }

    #[test]
    fn test_hour_buckets_split_what_day_buckets_merge() {
        // ---
        let history = [
            index_at(ts(9, 10), 80.0, 80.0),
            index_at(ts(9, 50), 60.0, 60.0),
            index_at(ts(14, 0), 40.0, 40.0),
        ];

        let hourly = aggregate(&history, Granularity::Hour);
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].period, ts(9, 0));
        assert_eq!(hourly[0].count, 2);
        assert_eq!(hourly[1].period, ts(14, 0));
        assert_eq!(hourly[1].count, 1);

        let daily = aggregate(&history, Granularity::Day);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].period, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(daily[0].count, 3);
        assert_eq!(daily[0].global.avg, 60.0);
        assert_eq!(daily[0].global.current, 40.0);
    }

    #[test]
    fn test_buckets_ascend_and_partition_records() {
        // ---
        let history = [
            index_at(Utc.with_ymd_and_hms(2025, 6, 3, 8, 0, 0).unwrap(), 10.0, 10.0),
            index_at(ts(23, 59), 20.0, 20.0),
            index_at(Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(), 30.0, 30.0),
            index_at(ts(0, 0), 40.0, 40.0),
        ];
        let buckets = aggregate(&history, Granularity::Day);

        assert_eq!(buckets.len(), 3);
        for pair in buckets.windows(2) {
            assert!(pair[0].period < pair[1].period);
        }
        // Every record lands in exactly one bucket
        let total: usize = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, history.len());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        // ---
        let history = [
            index_at(ts(10, 5), 50.0, 40.0),
            index_at(ts(11, 25), 90.0, 100.0),
        ];
        let first = aggregate(&history, Granularity::Hour);
        let second = aggregate(&history, Granularity::Hour);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.period, b.period);
            assert_eq!(a.global, b.global);
        }
    }
}
