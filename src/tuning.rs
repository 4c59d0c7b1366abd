//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. Defaults reproduce the classic
//! feel; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};

/// Rejected tuning documents
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("Failed to parse tuning document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Tuning value `{field}` must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("Jump impulse must point upward (negative), got {0}")]
    JumpImpulseNotUpward(f32),

    #[error("Spawn interval range is empty: [{min}, {max})")]
    EmptySpawnRange { min: f32, max: f32 },

    #[error("Duck height ratio must be within (0, 1], got {0}")]
    DuckRatioOutOfRange(f32),
}

/// Gameplay constants. Distances are pixels, times are milliseconds and
/// physics values are per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Scroll speed at multiplier 1.0 (pixels per tick)
    pub base_speed: f32,
    /// Downward velocity added each tick while airborne
    pub gravity: f32,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_impulse: f32,

    /// Actor sprite box
    pub actor_width: f32,
    pub actor_height: f32,
    /// Ducking sprite height as a fraction of standing height
    pub duck_height_ratio: f32,

    /// Delay before the first obstacle of a run
    pub initial_spawn_interval_ms: f32,
    /// Next interval is drawn from [min, max) and divided by the speed multiplier
    pub spawn_interval_min_ms: f32,
    pub spawn_interval_max_ms: f32,

    /// Score distance between stage advances (thresholds accumulate)
    pub stage_score_step: f64,
    /// Multiplier bonus granted each time the five-stage cycle wraps
    pub wrap_speed_bonus: f32,
    /// Score gained per `score_divisor_ms` of play at multiplier 1.0
    pub score_divisor_ms: f64,

    /// Flying obstacles sit this far above their grounded position
    pub flying_height: f32,
    /// Vertical bob of flying obstacles
    pub float_amplitude: f32,
    /// Bob angular frequency (radians per millisecond of obstacle age)
    pub float_frequency: f32,

    /// Largest frame delta the session feeds into a tick
    pub max_frame_dt_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 4.0,
            gravity: 0.8,
            jump_impulse: -16.0,

            actor_width: 60.0,
            actor_height: 80.0,
            duck_height_ratio: 0.6,

            initial_spawn_interval_ms: 2000.0,
            spawn_interval_min_ms: 1500.0,
            spawn_interval_max_ms: 3000.0,

            stage_score_step: 500.0,
            wrap_speed_bonus: 0.5,
            score_divisor_ms: 100.0,

            flying_height: 60.0,
            float_amplitude: 10.0,
            float_frequency: 0.005,

            max_frame_dt_ms: 100.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse a tuning document, falling back to defaults when it is rejected
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning override: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive: [(&'static str, f64); 10] = [
            ("base_speed", self.base_speed as f64),
            ("gravity", self.gravity as f64),
            ("actor_width", self.actor_width as f64),
            ("actor_height", self.actor_height as f64),
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms as f64),
            ("spawn_interval_min_ms", self.spawn_interval_min_ms as f64),
            ("stage_score_step", self.stage_score_step),
            ("score_divisor_ms", self.score_divisor_ms),
            ("max_frame_dt_ms", self.max_frame_dt_ms as f64),
            ("float_frequency", self.float_frequency as f64),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        if !(self.jump_impulse < 0.0) {
            return Err(TuningError::JumpImpulseNotUpward(self.jump_impulse));
        }

        if !(self.spawn_interval_max_ms > self.spawn_interval_min_ms) {
            return Err(TuningError::EmptySpawnRange {
                min: self.spawn_interval_min_ms,
                max: self.spawn_interval_max_ms,
            });
        }

        if !(self.duck_height_ratio > 0.0 && self.duck_height_ratio <= 1.0) {
            return Err(TuningError::DuckRatioOutOfRange(self.duck_height_ratio));
        }

        if self.wrap_speed_bonus < 0.0 {
            return Err(TuningError::NotPositive {
                field: "wrap_speed_bonus",
                value: self.wrap_speed_bonus as f64,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_speed": 6.0 }"#).unwrap();
        assert_eq!(tuning.base_speed, 6.0);
        assert_eq!(tuning.gravity, 0.8);
        assert_eq!(tuning.stage_score_step, 500.0);
    }

    #[test]
    fn test_rejects_empty_spawn_range() {
        let err = Tuning::from_json(
            r#"{ "spawn_interval_min_ms": 3000.0, "spawn_interval_max_ms": 1500.0 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TuningError::EmptySpawnRange { .. }));
    }

    #[test]
    fn test_rejects_downward_jump() {
        let err = Tuning::from_json(r#"{ "jump_impulse": 16.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::JumpImpulseNotUpward(_)));
    }

    #[test]
    fn test_rejects_bad_duck_ratio() {
        let err = Tuning::from_json(r#"{ "duck_height_ratio": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::DuckRatioOutOfRange(_)));
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let tuning = Tuning::from_json_or_default("{ not json");
        assert_eq!(tuning, Tuning::default());

        let tuning = Tuning::from_json_or_default(r#"{ "base_speed": -1.0 }"#);
        assert_eq!(tuning, Tuning::default());
    }
}
