//! Domain records for the room comfort pipeline.
//!
//! Everything here is immutable once created: a `Measurement` is the raw
//! event, its `ComfortIndex` is derived exactly once during ingestion, and
//! `Alert`s are derived threshold violations tied to the same measurement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---

/// The five monitored environmental parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Temperature,
    Humidity,
    Air,
    Noise,
    Light,
}

impl ParamKind {
    /// All parameters, in the order they are reported.
    pub const ALL: [ParamKind; 5] = [
        ParamKind::Temperature,
        ParamKind::Humidity,
        ParamKind::Air,
        ParamKind::Noise,
        ParamKind::Light,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Temperature => "temperature",
            ParamKind::Humidity => "humidity",
            ParamKind::Air => "air",
            ParamKind::Noise => "noise",
            ParamKind::Light => "light",
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(ParamKind::Temperature),
            "humidity" => Ok(ParamKind::Humidity),
            "air" => Ok(ParamKind::Air),
            "noise" => Ok(ParamKind::Noise),
            "light" => Ok(ParamKind::Light),
            other => Err(format!("unknown parameter '{other}'")),
        }
    }
}

/// Comfort classification derived from the global score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Comfort,
    Warning,
    Danger,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Comfort => "comfort",
            Status::Warning => "warning",
            Status::Danger => "danger",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comfort" => Ok(Status::Comfort),
            "warning" => Ok(Status::Warning),
            "danger" => Ok(Status::Danger),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Alert urgency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Severity::Warning),
            "danger" => Ok(Severity::Danger),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

// ---

/// A monitored room.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Raw reading submitted by a sensor node.
///
/// The timestamp is optional; ingestion time is used when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReading {
    pub room_id: Uuid,
    pub temperature: f64,
    pub humidity: f64,
    pub air: f64,
    pub noise: f64,
    pub light: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewReading {
    pub fn value(&self, param: ParamKind) -> f64 {
        match param {
            ParamKind::Temperature => self.temperature,
            ParamKind::Humidity => self.humidity,
            ParamKind::Air => self.air,
            ParamKind::Noise => self.noise,
            ParamKind::Light => self.light,
        }
    }

    /// First field holding a non-finite value, if any.
    pub fn non_finite_field(&self) -> Option<ParamKind> {
        ParamKind::ALL
            .into_iter()
            .find(|p| !self.value(*p).is_finite())
    }
}

/// A persisted environmental measurement.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Measurement {
    pub id: Uuid,
    pub room_id: Uuid,
    pub temperature: f64,
    pub humidity: f64,
    pub air: f64,
    pub noise: f64,
    pub light: f64,
    pub timestamp: DateTime<Utc>,
}

impl Measurement {
    pub fn value(&self, param: ParamKind) -> f64 {
        match param {
            ParamKind::Temperature => self.temperature,
            ParamKind::Humidity => self.humidity,
            ParamKind::Air => self.air,
            ParamKind::Noise => self.noise,
            ParamKind::Light => self.light,
        }
    }
}

/// Per-parameter comfort scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterScores {
    pub temperature: f64,
    pub humidity: f64,
    pub air: f64,
    pub noise: f64,
    pub light: f64,
}

/// Comfort index derived from exactly one measurement.
///
/// The timestamp is copied from the measurement so time-series queries never
/// need the join.
#[derive(Debug, Clone, Serialize)]
pub struct ComfortIndex {
    pub id: Uuid,
    pub measurement_id: Uuid,
    pub global_score: f64,
    pub status: Status,
    pub score_temperature: f64,
    pub score_humidity: f64,
    pub score_air: f64,
    pub score_noise: f64,
    pub score_light: f64,
    pub timestamp: DateTime<Utc>,
}

/// A threshold violation attached to a measurement.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub measurement_id: Uuid,
    pub parameter: ParamKind,
    pub value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything produced by one ingested reading, published to subscribers and
/// returned to the submitting client.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingBundle {
    pub measurement: Measurement,
    pub comfort_index: ComfortIndex,
    pub alerts: Vec<Alert>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn reading(temperature: f64) -> NewReading {
        // ---
        NewReading {
            room_id: Uuid::new_v4(),
            temperature,
            humidity: 50.0,
            air: 500.0,
            noise: 45.0,
            light: 400.0,
            timestamp: None,
        }
    }

    #[test]
    fn test_param_kind_round_trip() {
        // ---
        for param in ParamKind::ALL {
            assert_eq!(param.as_str().parse::<ParamKind>().unwrap(), param);
        }
        assert!("pressure".parse::<ParamKind>().is_err());
    }

    #[test]
    fn test_status_round_trip() {
        // ---
        for status in [Status::Comfort, Status::Warning, Status::Danger] {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert!("ok".parse::<Status>().is_err());
    }

    #[test]
    fn test_non_finite_field_detection() {
        // ---
        assert_eq!(reading(23.0).non_finite_field(), None);
        assert_eq!(
            reading(f64::NAN).non_finite_field(),
            Some(ParamKind::Temperature)
        );

        let mut bad_noise = reading(23.0);
        bad_noise.noise = f64::INFINITY;
        assert_eq!(bad_noise.non_finite_field(), Some(ParamKind::Noise));
    }
}
