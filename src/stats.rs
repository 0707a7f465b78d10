//! Windowed comfort statistics.
//!
//! Read-only summary over the comfort indices of one room in a trailing
//! window: score aggregates, status distribution, and the share of time the
//! room spent out of comfort.

use serde::Serialize;

use crate::models::{ComfortIndex, Status};

// ---

/// Occurrence counts per status label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusHistogram {
    pub comfort: u64,
    pub warning: u64,
    pub danger: u64,
}

impl StatusHistogram {
    fn record(&mut self, status: Status) {
        match status {
            Status::Comfort => self.comfort += 1,
            Status::Warning => self.warning += 1,
            Status::Danger => self.danger += 1,
        }
    }

    /// Records whose status is warning or danger.
    pub fn discomfort(&self) -> u64 {
        self.warning + self.danger
    }
}

/// Summary of a room's comfort over a trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct ComfortSummary {
    pub period_days: u32,
    /// Score aggregates are absent when the window holds no records.
    pub average_score: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub total_measurements: usize,
    pub status_distribution: StatusHistogram,
    /// Percentage of records with status warning or danger; 0.0 for an
    /// empty window.
    pub discomfort_percentage: f64,
    pub alert_count: u64,
}

/// Summarize the comfort indices already filtered to the room and window.
pub fn summarize(indices: &[ComfortIndex], alert_count: u64, period_days: u32) -> ComfortSummary {
    let mut histogram = StatusHistogram::default();
    let mut sum = 0.0;
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;

    for index in indices {
        histogram.record(index.status);
        sum += index.global_score;
        min = Some(min.map_or(index.global_score, |m| m.min(index.global_score)));
        max = Some(max.map_or(index.global_score, |m| m.max(index.global_score)));
    }

    let total = indices.len();
    let discomfort_percentage = if total == 0 {
        0.0
    } else {
        histogram.discomfort() as f64 / total as f64 * 100.0
    };

    ComfortSummary {
        period_days,
        average_score: (total > 0).then(|| sum / total as f64),
        min_score: min,
        max_score: max,
        total_measurements: total,
        status_distribution: histogram,
        discomfort_percentage,
        alert_count,
    }
}
