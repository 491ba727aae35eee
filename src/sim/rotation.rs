//! Paddle orientation and contact-zone color resolution

use serde::Serialize;

use super::color::{Color, Origin, top_sequence};
use crate::floor_mod;
use crate::tuning::RotationPolicy;

/// Discrete paddle orientation.
///
/// The index is never wrapped in storage; it is reduced with a floored
/// modulo only when a color is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationState {
    pub index: i64,
    /// +1 or -1
    pub direction: i64,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            index: 0,
            direction: 1,
        }
    }
}

impl RotationState {
    /// Advance one segment in the current direction
    pub fn step(&mut self) {
        self.index += self.direction;
    }

    /// Align direction with a level's policy. Returns true if the sign flipped.
    pub fn apply_policy(&mut self, policy: RotationPolicy) -> bool {
        let sign = policy.sign();
        if self.direction != sign {
            self.direction = sign;
            true
        } else {
            false
        }
    }

    /// Segment slot facing the top contact zone
    pub fn top_slot(&self, segment_count: u8) -> usize {
        floor_mod(self.index, segment_count as usize)
    }

    /// Segment slot facing `origin`'s contact zone.
    ///
    /// The bottom zone is the diametrically opposite segment, which only
    /// exists on a 4-segment paddle.
    pub fn slot_for(&self, origin: Origin, segment_count: u8) -> usize {
        let top = self.top_slot(segment_count);
        match origin {
            Origin::Top => top,
            Origin::Bottom => (top + 2) % segment_count as usize,
        }
    }

    /// Color currently in `origin`'s contact zone
    pub fn active_color(&self, origin: Origin, segment_count: u8) -> Color {
        top_sequence(segment_count)[self.slot_for(origin, segment_count)]
    }

    /// Steps in the current direction until `color` faces `origin`.
    ///
    /// `None` if the color is not on the paddle.
    pub fn steps_to(&self, color: Color, origin: Origin, segment_count: u8) -> Option<usize> {
        let n = segment_count as usize;
        let seq = top_sequence(segment_count);
        let want_slot = seq.iter().position(|c| *c == color)?;
        let want_top = match origin {
            Origin::Top => want_slot,
            Origin::Bottom => (want_slot + 2) % n,
        };
        let delta = want_top as i64 - self.top_slot(segment_count) as i64;
        Some(floor_mod(delta * self.direction, n))
    }
}
