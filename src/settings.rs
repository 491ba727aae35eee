//! Game settings and preferences
//!
//! Held by the shell; not part of the simulation.

use serde::{Deserialize, Serialize};

/// Which set of level thresholds to play with.
///
/// Both sets exist in the shipped game behind a debug switch. Neither is
/// treated as canonical here; pick one explicitly or supply a full table via
/// [`crate::Tuning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThresholdPreset {
    /// Short ramp: levels at 10 / 25 / 70 / 100
    #[default]
    Quick,
    /// Long ramp: levels at 20 / 50 / 70 / 100
    Standard,
}

impl ThresholdPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdPreset::Quick => "Quick",
            ThresholdPreset::Standard => "Standard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quick" | "debug" => Some(ThresholdPreset::Quick),
            "standard" | "std" => Some(ThresholdPreset::Standard),
            _ => None,
        }
    }

    /// Thresholds for hard mode, ghost balls, dual origin and reversed rotation
    pub fn thresholds(&self) -> [u32; 4] {
        match self {
            ThresholdPreset::Quick => [10, 25, 70, 100],
            ThresholdPreset::Standard => [20, 50, 70, 100],
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: ThresholdPreset,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: ThresholdPreset::default(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    pub fn from_preset(preset: ThresholdPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Volume actually applied to effects
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }
}
