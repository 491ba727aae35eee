//! Score and speed progression

use serde::Serialize;

use super::rules::LevelTable;

/// Score/speed pair owned by the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSpeed {
    pub score: u32,
    pub speed: f32,
}

/// Result of one increment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreChange {
    pub prev_score: u32,
    pub score: u32,
    pub prev_speed: f32,
    pub speed: f32,
}

impl ScoreChange {
    pub fn speed_changed(&self) -> bool {
        self.speed != self.prev_speed
    }
}

/// Speed ramp constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedCurve {
    pub base: f32,
    pub increment: f32,
    pub cap: f32,
}

impl ScoreSpeed {
    pub fn new(base_speed: f32) -> Self {
        Self {
            score: 0,
            speed: base_speed,
        }
    }

    /// One correct hit: +1 score, then either ramp speed toward the cap or,
    /// on a speed-reset level, drop back to base.
    pub fn increment(&mut self, curve: SpeedCurve, levels: &LevelTable) -> ScoreChange {
        let prev_score = self.score;
        let prev_speed = self.speed;

        self.score += 1;
        self.speed = if levels.resets_speed(prev_score, self.score) {
            curve.base
        } else {
            (self.speed + curve.increment).min(curve.cap)
        };

        ScoreChange {
            prev_score,
            score: self.score,
            prev_speed,
            speed: self.speed,
        }
    }
}
