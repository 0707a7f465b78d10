//! Threshold alert detection.
//!
//! Shares the comfort zone table with the scoring engine. Each out-of-zone
//! parameter yields one alert candidate; the severity split depends on how
//! far beyond the violated boundary the value sits.

use uuid::Uuid;

use crate::comfort::ZoneTable;
use crate::models::{Alert, Measurement, ParamKind, Severity};

// ---

/// Pure alert detector over an injected zone table.
#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    zones: ZoneTable,
}

impl AlertEngine {
    pub fn new(zones: ZoneTable) -> Self {
        Self { zones }
    }

    /// Detect threshold violations on a measurement.
    ///
    /// Produces zero to five independent alerts, one per out-of-zone
    /// parameter. A value strictly inside its zone never alerts, no matter
    /// how close to the boundary. Excursions within the zone's warning band
    /// are `warning`, beyond it `danger`. The recorded threshold is the
    /// boundary that was violated; the timestamp is the measurement's.
    pub fn detect(&self, measurement: &Measurement) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for param in ParamKind::ALL {
            let value = measurement.value(param);
            let zone = self.zones.get(param);

            let Some(threshold) = zone.violated_boundary(value) else {
                continue;
            };

            let severity = if zone.deviation(value) <= zone.warning_band() {
                Severity::Warning
            } else {
                Severity::Danger
            };

            alerts.push(Alert {
                id: Uuid::new_v4(),
                measurement_id: measurement.id,
                parameter: param,
                value,
                threshold,
                severity,
                message: format!("{param} value {value} outside threshold {threshold}"),
                timestamp: measurement.timestamp,
            });
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    fn measurement(temperature: f64, humidity: f64, air: f64, noise: f64, light: f64) -> Measurement {
        // ---
        Measurement {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            temperature,
            humidity,
            air,
            noise,
            light,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    fn comfortable() -> Measurement {
        measurement(24.0, 50.0, 500.0, 45.0, 400.0)
    }

    #[test]
    fn test_comfortable_reading_produces_no_alerts() {
        // ---
        let engine = AlertEngine::default();
        assert!(engine.detect(&comfortable()).is_empty());

        // Zone boundaries are still comfortable
        let on_edge = measurement(22.0, 60.0, 1000.0, 60.0, 300.0);
        assert!(engine.detect(&on_edge).is_empty());
    }

    #[test]
    fn test_range_parameter_warning_within_band() {
        // ---
        let engine = AlertEngine::default();

        // 1 degree below min 22: within the 5-unit band
        let m = measurement(21.0, 50.0, 500.0, 45.0, 400.0);
        let alerts = engine.detect(&m);
        assert_eq!(alerts.len(), 1);

        let alert = &alerts[0];
        assert_eq!(alert.parameter, ParamKind::Temperature);
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.threshold, 22.0);
        assert_eq!(alert.value, 21.0);
        assert_eq!(alert.measurement_id, m.id);
        assert_eq!(alert.timestamp, m.timestamp);
    }

    #[test]
    fn test_range_parameter_danger_beyond_band() {
        // ---
        let engine = AlertEngine::default();

        // 12 degrees below min 22
        let alerts = engine.detect(&measurement(10.0, 50.0, 500.0, 45.0, 400.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Danger);
        assert_eq!(alerts[0].threshold, 22.0);

        // 10 lux below min 300 exceeds the 5-unit band on the low side too
        let alerts = engine.detect(&measurement(24.0, 50.0, 500.0, 45.0, 290.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, ParamKind::Light);
        assert_eq!(alerts[0].severity, Severity::Danger);
        assert_eq!(alerts[0].threshold, 300.0);
    }

    #[test]
    fn test_bound_only_parameter_uses_wider_band() {
        // ---
        let engine = AlertEngine::default();

        // 5 dB above max 60: within the 10-unit band
        let alerts = engine.detect(&measurement(24.0, 50.0, 500.0, 65.0, 400.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, ParamKind::Noise);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].threshold, 60.0);

        // 15 dB above: danger
        let alerts = engine.detect(&measurement(24.0, 50.0, 500.0, 75.0, 400.0));
        assert_eq!(alerts[0].severity, Severity::Danger);
    }

    #[test]
    fn test_multiple_independent_violations() {
        // ---
        let engine = AlertEngine::default();

        // Temperature low, noise high, air high
        let m = measurement(15.0, 50.0, 1200.0, 80.0, 400.0);
        let mut alerts = engine.detect(&m);
        alerts.sort_by_key(|a| a.parameter.as_str());

        assert_eq!(alerts.len(), 3);
        let params: Vec<_> = alerts.iter().map(|a| a.parameter).collect();
        assert!(params.contains(&ParamKind::Temperature));
        assert!(params.contains(&ParamKind::Air));
        assert!(params.contains(&ParamKind::Noise));
    }

    #[test]
    fn test_message_names_parameter_value_and_threshold() {
        // ---
        let engine = AlertEngine::default();
        let alerts = engine.detect(&measurement(30.0, 50.0, 500.0, 45.0, 400.0));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "temperature value 30 outside threshold 26");
    }
}
