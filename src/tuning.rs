//! Data-driven game balance
//!
//! Every gameplay constant and the level table live in [`Tuning`]. The
//! defaults reproduce the shipped game; a JSON document can override any
//! subset of fields, and [`Tuning::validate`] rejects tables the simulation
//! cannot run.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::ThresholdPreset;

/// Where the paddle sits vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddleAnchor {
    /// `paddle_bottom_offset` above the arena bottom
    Bottom,
    /// Vertical centre of the arena
    Middle,
}

/// Which edges balls may enter from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginPolicy {
    TopOnly,
    /// Coin flip between top and bottom
    Dual,
}

/// Sign applied to each tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationPolicy {
    Forward,
    Reversed,
}

impl RotationPolicy {
    pub fn sign(&self) -> i64 {
        match self {
            RotationPolicy::Forward => 1,
            RotationPolicy::Reversed => -1,
        }
    }
}

/// One row of the level table. Each row is a complete rule set; a later row
/// fully overrides an earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Score at which this level begins
    pub threshold: u32,
    /// Banner text
    pub name: String,
    /// Paddle segments (3 or 4)
    pub segments: u8,
    pub paddle: PaddleAnchor,
    pub origins: OriginPolicy,
    /// Balls recolor once mid-flight
    #[serde(default)]
    pub ghost_balls: bool,
    #[serde(default = "default_rotation")]
    pub rotation: RotationPolicy,
    /// Reaching this threshold resets speed to base
    #[serde(default)]
    pub speed_reset: bool,
}

fn default_rotation() -> RotationPolicy {
    RotationPolicy::Forward
}

impl LevelSpec {
    fn new(threshold: u32, name: &str, segments: u8) -> Self {
        Self {
            threshold,
            name: name.to_string(),
            segments,
            paddle: PaddleAnchor::Bottom,
            origins: OriginPolicy::TopOnly,
            ghost_balls: false,
            rotation: RotationPolicy::Forward,
            speed_reset: false,
        }
    }
}

/// Build the level table for a threshold preset
pub fn levels_for(preset: ThresholdPreset) -> Vec<LevelSpec> {
    let [hard, ghost, dual, reversed] = preset.thresholds();

    let level1 = LevelSpec::new(0, "LEVEL 1", 3);

    let mut level2 = LevelSpec::new(hard, "LEVEL 2", 4);
    level2.speed_reset = true;

    let mut level3 = LevelSpec::new(ghost, "LEVEL 3", 4);
    level3.ghost_balls = true;

    let mut level4 = LevelSpec::new(dual, "LEVEL 4", 4);
    level4.paddle = PaddleAnchor::Middle;
    level4.origins = OriginPolicy::Dual;

    let mut level5 = LevelSpec::new(reversed, "LEVEL 5", 4);
    level5.origins = OriginPolicy::Dual;
    level5.rotation = RotationPolicy::Reversed;

    vec![level1, level2, level3, level4, level5]
}

/// Tunable game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena (supplied by the shell's screen discovery) ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Paddle diameter
    pub paddle_size: f32,
    pub ball_size: f32,
    /// Distance from arena bottom to paddle centre for `PaddleAnchor::Bottom`
    pub paddle_bottom_offset: f32,

    // === Pacing ===
    /// Spawn interval at speed 1.0
    pub spawn_interval_ms: f64,
    /// Full travel time at speed 1.0
    pub reference_travel_ms: f64,
    pub base_speed: f32,
    pub speed_increment: f32,
    pub speed_cap: f32,
    /// Level banner pause
    pub banner_ms: f64,
    /// Fraction of travel at which ghost balls recolor
    pub ghost_switch_fraction: f32,
    /// Retime in-flight balls when session speed changes
    pub in_flight_follows_speed: bool,

    pub levels: Vec<LevelSpec>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from_preset(ThresholdPreset::default())
    }
}

impl Tuning {
    /// Default balance with the given threshold set
    pub fn from_preset(preset: ThresholdPreset) -> Self {
        Self {
            arena_width: 390.0,
            arena_height: 844.0,
            paddle_size: 120.0,
            ball_size: 20.0,
            paddle_bottom_offset: 150.0,

            spawn_interval_ms: 1500.0,
            reference_travel_ms: 3000.0,
            base_speed: 1.0,
            speed_increment: 0.05,
            speed_cap: 5.0,
            banner_ms: 2000.0,
            ghost_switch_fraction: 0.5,
            in_flight_follows_speed: false,

            levels: levels_for(preset),
        }
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path).map_err(|e| TuningError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {} ({} levels)", path.display(), tuning.levels.len());
        Ok(tuning)
    }

    /// Paddle centre Y for an anchor
    pub fn paddle_y(&self, anchor: PaddleAnchor) -> f32 {
        match anchor {
            PaddleAnchor::Bottom => self.arena_height - self.paddle_bottom_offset,
            PaddleAnchor::Middle => self.arena_height / 2.0,
        }
    }

    /// Check the table and constants are usable
    pub fn validate(&self) -> Result<(), TuningError> {
        let Some(first) = self.levels.first() else {
            return Err(TuningError::EmptyLevelTable);
        };
        if first.threshold != 0 {
            return Err(TuningError::FirstThresholdNotZero(first.threshold));
        }

        for pair in self.levels.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(TuningError::ThresholdsNotAscending {
                    previous: pair[0].threshold,
                    next: pair[1].threshold,
                });
            }
        }

        for level in &self.levels {
            if level.segments != 3 && level.segments != 4 {
                return Err(TuningError::BadSegmentCount {
                    level: level.name.clone(),
                    segments: level.segments,
                });
            }
            if level.origins == OriginPolicy::Dual && level.segments != 4 {
                return Err(TuningError::DualOriginNeedsFourSegments(level.name.clone()));
            }
        }

        let positive = [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("reference_travel_ms", self.reference_travel_ms),
            ("base_speed", self.base_speed as f64),
            ("arena_width", self.arena_width as f64),
            ("arena_height", self.arena_height as f64),
            ("paddle_size", self.paddle_size as f64),
            ("ball_size", self.ball_size as f64),
        ];
        for (name, value) in positive {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { name, value });
            }
            if value <= 0.0 {
                return Err(TuningError::NotPositive { name, value });
            }
        }

        let non_negative = [
            ("banner_ms", self.banner_ms),
            ("speed_increment", self.speed_increment as f64),
            ("speed_cap", self.speed_cap as f64),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { name, value });
            }
            if value < 0.0 {
                return Err(TuningError::NotPositive { name, value });
            }
        }
        if self.speed_cap < self.base_speed {
            return Err(TuningError::CapBelowBase {
                cap: self.speed_cap,
                base: self.base_speed,
            });
        }
        if !(self.ghost_switch_fraction > 0.0 && self.ghost_switch_fraction < 1.0) {
            return Err(TuningError::GhostFraction(self.ghost_switch_fraction));
        }

        Ok(())
    }
}

/// Rejected tuning
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// File could not be read
    Io { path: String, message: String },
    /// JSON did not match the schema
    Parse(String),
    EmptyLevelTable,
    /// Level 1 must start at score 0 so every score has a rule set
    FirstThresholdNotZero(u32),
    ThresholdsNotAscending { previous: u32, next: u32 },
    BadSegmentCount { level: String, segments: u8 },
    /// Bottom contact uses the opposite segment, which only exists with 4
    DualOriginNeedsFourSegments(String),
    NotPositive { name: &'static str, value: f64 },
    /// NaN or infinite; comparisons against these silently pass
    NotFinite { name: &'static str, value: f64 },
    CapBelowBase { cap: f32, base: f32 },
    GhostFraction(f32),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io { path, message } => write!(f, "cannot read {}: {}", path, message),
            TuningError::Parse(msg) => write!(f, "invalid tuning JSON: {}", msg),
            TuningError::EmptyLevelTable => write!(f, "level table is empty"),
            TuningError::FirstThresholdNotZero(t) => {
                write!(f, "first level must start at score 0, got {}", t)
            }
            TuningError::ThresholdsNotAscending { previous, next } => write!(
                f,
                "level thresholds must strictly ascend: {} followed by {}",
                previous, next
            ),
            TuningError::BadSegmentCount { level, segments } => write!(
                f,
                "{}: paddle must have 3 or 4 segments, got {}",
                level, segments
            ),
            TuningError::DualOriginNeedsFourSegments(level) => {
                write!(f, "{}: dual-origin spawning requires 4 segments", level)
            }
            TuningError::NotPositive { name, value } => {
                write!(f, "{} must be positive, got {}", name, value)
            }
            TuningError::NotFinite { name, value } => {
                write!(f, "{} must be a finite number, got {}", name, value)
            }
            TuningError::CapBelowBase { cap, base } => {
                write!(f, "speed cap {} is below base speed {}", cap, base)
            }
            TuningError::GhostFraction(v) => {
                write!(f, "ghost switch fraction must be in (0, 1), got {}", v)
            }
        }
    }
}

impl std::error::Error for TuningError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
        assert_eq!(Tuning::from_preset(ThresholdPreset::Standard).validate(), Ok(()));
    }

    #[test]
    fn test_presets_differ_only_in_thresholds() {
        let quick = levels_for(ThresholdPreset::Quick);
        let standard = levels_for(ThresholdPreset::Standard);
        assert_eq!(quick[1].threshold, 10);
        assert_eq!(standard[1].threshold, 20);
        assert_eq!(quick[2].threshold, 25);
        assert_eq!(standard[2].threshold, 50);
        for (q, s) in quick.iter().zip(&standard) {
            assert_eq!(q.segments, s.segments);
            assert_eq!(q.origins, s.origins);
        }
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        let mut tuning = Tuning::default();
        tuning.levels.swap(1, 2);
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::ThresholdsNotAscending { .. })
        ));
    }

    #[test]
    fn test_rejects_dual_origin_on_three_segments() {
        let mut tuning = Tuning::default();
        tuning.levels[0].origins = OriginPolicy::Dual;
        assert_eq!(
            tuning.validate(),
            Err(TuningError::DualOriginNeedsFourSegments("LEVEL 1".to_string()))
        );
    }

    #[test]
    fn test_rejects_nonzero_first_threshold() {
        let mut tuning = Tuning::default();
        tuning.levels[0].threshold = 1;
        assert_eq!(tuning.validate(), Err(TuningError::FirstThresholdNotZero(1)));
    }

    #[test]
    fn test_rejects_cap_below_base() {
        let tuning = Tuning {
            speed_cap: 0.5,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::CapBelowBase { .. })));
    }

    #[test]
    fn test_rejects_nan_cap() {
        let tuning = Tuning {
            speed_cap: f32::NAN,
            speed_increment: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NotFinite { name: "speed_cap", .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite_fields() {
        let cases = [
            Tuning {
                speed_increment: f32::NAN,
                ..Default::default()
            },
            Tuning {
                banner_ms: f64::INFINITY,
                ..Default::default()
            },
            Tuning {
                arena_width: f32::NAN,
                ..Default::default()
            },
            Tuning {
                spawn_interval_ms: f64::INFINITY,
                ..Default::default()
            },
        ];
        for tuning in cases {
            assert!(matches!(tuning.validate(), Err(TuningError::NotFinite { .. })));
        }
    }

    #[test]
    fn test_rejects_zero_arena_width() {
        let tuning = Tuning {
            arena_width: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NotPositive { name: "arena_width", .. })
        ));
    }

    #[test]
    fn test_json_partial_override() {
        let tuning = Tuning::from_json_str(r#"{ "speed_cap": 3.0, "banner_ms": 500 }"#).unwrap();
        assert_eq!(tuning.speed_cap, 3.0);
        assert_eq!(tuning.banner_ms, 500.0);
        assert_eq!(tuning.levels.len(), 5);
    }

    #[test]
    fn test_json_custom_levels() {
        let json = r#"{
            "levels": [
                { "threshold": 0, "name": "EASY", "segments": 3, "paddle": "Bottom", "origins": "TopOnly" },
                { "threshold": 5, "name": "HARD", "segments": 4, "paddle": "Middle", "origins": "Dual",
                  "speed_reset": true }
            ]
        }"#;
        let tuning = Tuning::from_json_str(json).unwrap();
        assert_eq!(tuning.levels.len(), 2);
        assert_eq!(tuning.levels[1].rotation, RotationPolicy::Forward);
        assert!(tuning.levels[1].speed_reset);
    }

    #[test]
    fn test_json_garbage_is_parse_error() {
        assert!(matches!(Tuning::from_json_str("{ nope"), Err(TuningError::Parse(_))));
    }

    #[test]
    fn test_paddle_y_anchors() {
        let tuning = Tuning::default();
        assert_eq!(tuning.paddle_y(PaddleAnchor::Bottom), 694.0);
        assert_eq!(tuning.paddle_y(PaddleAnchor::Middle), 422.0);
    }
}
