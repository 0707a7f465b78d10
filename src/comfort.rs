//! Comfort scoring engine.
//!
//! Turns a raw measurement into per-parameter scores, a weighted global
//! score, and a status classification. The zone and weight tables are plain
//! immutable values injected at construction so tests can substitute their
//! own without touching shared state.

use crate::models::{Measurement, ParamKind, ParameterScores, Status};

// ---

/// Comfort zone for a single parameter: the band (or bound) within which the
/// parameter contributes a perfect score.
#[derive(Debug, Clone, Copy)]
pub enum ComfortZone {
    Range { min: f64, max: f64 },
    UpperBound { max: f64 },
    LowerBound { min: f64 },
}

impl ComfortZone {
    /// Distance from `value` to the nearest zone boundary; 0.0 inside the
    /// zone (boundaries included).
    pub fn deviation(&self, value: f64) -> f64 {
        match *self {
            ComfortZone::Range { min, max } => {
                if value < min {
                    min - value
                } else if value > max {
                    value - max
                } else {
                    0.0
                }
            }
            ComfortZone::UpperBound { max } => (value - max).max(0.0),
            ComfortZone::LowerBound { min } => (min - value).max(0.0),
        }
    }

    /// The boundary `value` violates, if it lies outside the zone.
    pub fn violated_boundary(&self, value: f64) -> Option<f64> {
        match *self {
            ComfortZone::Range { min, max } => {
                if value < min {
                    Some(min)
                } else if value > max {
                    Some(max)
                } else {
                    None
                }
            }
            ComfortZone::UpperBound { max } => (value > max).then_some(max),
            ComfortZone::LowerBound { min } => (value < min).then_some(min),
        }
    }

    /// Width of the warning band beyond a violated boundary: excursions
    /// within it are warnings, anything further is danger. Range-bounded
    /// parameters use a tighter band than bound-only ones.
    pub fn warning_band(&self) -> f64 {
        match self {
            ComfortZone::Range { .. } => 5.0,
            ComfortZone::UpperBound { .. } | ComfortZone::LowerBound { .. } => 10.0,
        }
    }
}

/// Comfort zones for all five parameters.
#[derive(Debug, Clone, Copy)]
pub struct ZoneTable {
    pub temperature: ComfortZone,
    pub humidity: ComfortZone,
    pub air: ComfortZone,
    pub noise: ComfortZone,
    pub light: ComfortZone,
}

impl ZoneTable {
    pub fn get(&self, param: ParamKind) -> ComfortZone {
        match param {
            ParamKind::Temperature => self.temperature,
            ParamKind::Humidity => self.humidity,
            ParamKind::Air => self.air,
            ParamKind::Noise => self.noise,
            ParamKind::Light => self.light,
        }
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            temperature: ComfortZone::Range {
                min: 22.0,
                max: 26.0,
            },
            humidity: ComfortZone::Range {
                min: 40.0,
                max: 60.0,
            },
            air: ComfortZone::UpperBound { max: 1000.0 },
            noise: ComfortZone::UpperBound { max: 60.0 },
            light: ComfortZone::Range {
                min: 300.0,
                max: 500.0,
            },
        }
    }
}

/// Weights of the global score's convex combination. Must sum to 1.0 for
/// the global score to stay in [0, 100].
#[derive(Debug, Clone, Copy)]
pub struct WeightTable {
    pub temperature: f64,
    pub humidity: f64,
    pub air: f64,
    pub noise: f64,
    pub light: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            temperature: 0.25,
            humidity: 0.20,
            air: 0.25,
            noise: 0.20,
            light: 0.10,
        }
    }
}

// ---

/// Pure scoring engine over an injected zone/weight configuration.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    zones: ZoneTable,
    weights: WeightTable,
}

impl ScoreEngine {
    pub fn new(zones: ZoneTable, weights: WeightTable) -> Self {
        Self { zones, weights }
    }

    /// Score a single parameter value: 100.0 inside the comfort zone,
    /// otherwise a linear penalty of 10 points per unit of deviation,
    /// floored at 0.
    pub fn score_parameter(&self, value: f64, param: ParamKind) -> f64 {
        let deviation = self.zones.get(param).deviation(value);
        if deviation <= 0.0 {
            100.0
        } else {
            (100.0 - deviation * 10.0).max(0.0)
        }
    }

    /// Score all five parameters of a measurement.
    pub fn score_measurement(&self, m: &Measurement) -> ParameterScores {
        ParameterScores {
            temperature: self.score_parameter(m.temperature, ParamKind::Temperature),
            humidity: self.score_parameter(m.humidity, ParamKind::Humidity),
            air: self.score_parameter(m.air, ParamKind::Air),
            noise: self.score_parameter(m.noise, ParamKind::Noise),
            light: self.score_parameter(m.light, ParamKind::Light),
        }
    }

    /// Weighted global score. With scores in [0, 100] and convex weights the
    /// result stays in [0, 100].
    pub fn global_score(&self, scores: &ParameterScores) -> f64 {
        let w = &self.weights;
        scores.temperature * w.temperature
            + scores.humidity * w.humidity
            + scores.air * w.air
            + scores.noise * w.noise
            + scores.light * w.light
    }

    /// Status bands, lower-inclusive: >=70 comfort, >=40 warning, else
    /// danger. Exact comparisons, no epsilon.
    pub fn classify_status(&self, global_score: f64) -> Status {
        if global_score >= 70.0 {
            Status::Comfort
        } else if global_score >= 40.0 {
            Status::Warning
        } else {
            Status::Danger
        }
    }
}
