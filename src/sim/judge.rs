//! Contact judgment

use serde::Serialize;

use super::color::{Color, Origin};
use super::rotation::RotationState;

/// Outcome of a ball meeting the paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// Colors match: score
    Hit,
    /// Colors differ: game over
    Miss { expected: Color },
}

/// Compare a ball's color with the segment in its origin's contact zone
pub fn judge(rotation: &RotationState, segment_count: u8, color: Color, origin: Origin) -> Verdict {
    let active = rotation.active_color(origin, segment_count);
    if active == color {
        Verdict::Hit
    } else {
        Verdict::Miss { expected: active }
    }
}
