//! Color Switcher - a reflex color-matching game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (session state machine, timers, judging)
//! - `tuning`: Data-driven game balance and level table
//! - `settings`: Player preferences
//! - `audio`: Fire-and-forget sound collaborator

pub mod audio;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{Settings, ThresholdPreset};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Simulation ticks per second
    pub const TICKS_PER_SEC: u64 = 120;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Convert a millisecond duration to whole ticks, rounding up.
///
/// Anything positive lasts at least one tick so a scheduled timer never
/// fires on the tick that scheduled it.
#[inline]
pub fn ms_to_ticks(ms: f64) -> u64 {
    if ms <= 0.0 {
        return 0;
    }
    let ticks = (ms * consts::TICKS_PER_SEC as f64 / 1000.0).ceil() as u64;
    ticks.max(1)
}

/// Convert ticks back to milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> f64 {
    ticks as f64 * 1000.0 / consts::TICKS_PER_SEC as f64
}

/// Floored modulo: maps any signed index onto `0..n`.
///
/// `floor_mod(-1, 4) == 3`, unlike `%` which would give `-1`.
#[inline]
pub fn floor_mod(index: i64, n: usize) -> usize {
    index.rem_euclid(n as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks_rounds_up() {
        assert_eq!(ms_to_ticks(0.0), 0);
        assert_eq!(ms_to_ticks(1.0), 1);
        assert_eq!(ms_to_ticks(1000.0), 120);
        assert_eq!(ms_to_ticks(2000.0), 240);
        assert_eq!(ms_to_ticks(1500.0 / 2.0_f64.sqrt()), 128);
    }

    #[test]
    fn test_floor_mod_negative() {
        assert_eq!(floor_mod(-1, 4), 3);
        assert_eq!(floor_mod(-4, 4), 0);
        assert_eq!(floor_mod(-5, 3), 1);
        assert_eq!(floor_mod(7, 3), 1);
    }
}
