//! Ball spawn cadence and draws
//!
//! The spawn timer is armed only from the session's `playing`/`paused` flags
//! and the current speed. Score never re-arms it directly.

use rand::Rng;
use rand_pcg::Pcg32;

use super::color::{Color, Origin};
use super::rules::RuleSet;
use super::timer::{TimerEvent, TimerId, TimerQueue};
use crate::ms_to_ticks;

/// Periodic spawn timer
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    timer: Option<TimerId>,
}

/// Spawn interval for a speed: `base / sqrt(speed)`
pub fn interval_ticks(base_interval_ms: f64, speed: f32) -> u64 {
    let speed = (speed as f64).max(f64::EPSILON);
    ms_to_ticks(base_interval_ms / speed.sqrt()).max(1)
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start the cadence from `now`, replacing any pending spawn
    pub fn arm(&mut self, timers: &mut TimerQueue, now: u64, base_interval_ms: f64, speed: f32) {
        self.disarm(timers);
        let due = now + interval_ticks(base_interval_ms, speed);
        self.timer = Some(timers.schedule(due, TimerEvent::Spawn));
    }

    /// Cancel the pending spawn, if any
    pub fn disarm(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
    }

    /// Called when the spawn timer fired, before re-arming
    pub fn fired(&mut self) {
        self.timer = None;
    }

    /// Forget the timer after the queue was cleared wholesale
    pub fn reset(&mut self) {
        self.timer = None;
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }
}

/// Pick a color and origin for a new ball under `rules`.
///
/// A rule set claiming dual origins below its own threshold means the table
/// and the score disagree; that is logged and treated as top-only.
pub fn draw_ball(rng: &mut Pcg32, rules: &RuleSet, score: u32) -> (Color, Origin) {
    let pool = &rules.color_pool;
    let color = pool[rng.random_range(0..pool.len())];

    let mut dual = rules.allow_dual_origin;
    if dual && score < rules.threshold {
        log::error!(
            "Rule set '{}' allows dual origins but score {} is below its threshold {}; spawning top only",
            rules.name,
            score,
            rules.threshold
        );
        dual = false;
    }

    let origin = if dual && rng.random_bool(0.5) {
        Origin::Bottom
    } else {
        Origin::Top
    };
    (color, origin)
}

/// Pick a different color from `pool` for a ghost ball
pub fn draw_recolor(rng: &mut Pcg32, pool: &[Color], current: Color) -> Color {
    let candidates: Vec<Color> = pool.iter().copied().filter(|c| *c != current).collect();
    if candidates.is_empty() {
        return current;
    }
    candidates[rng.random_range(0..candidates.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rules::LevelTable;
    use crate::tuning::Tuning;
    use rand::SeedableRng;

    #[test]
    fn test_interval_shrinks_sublinearly() {
        assert_eq!(interval_ticks(1500.0, 1.0), 180);
        assert_eq!(interval_ticks(1500.0, 4.0), 90);
        assert!(interval_ticks(1500.0, 2.0) > 90);
    }

    #[test]
    fn test_arm_replaces_pending_spawn() {
        let mut timers = TimerQueue::new();
        let mut spawner = Spawner::new();
        spawner.arm(&mut timers, 0, 1500.0, 1.0);
        spawner.arm(&mut timers, 10, 1500.0, 4.0);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_due(100).map(|(id, _)| id.due()), Some(100));
        spawner.fired();
        assert!(!spawner.is_armed());
    }

    #[test]
    fn test_top_only_below_dual_level() {
        let levels = LevelTable::new(&Tuning::default());
        let rules = levels.rule_for(0);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let (color, origin) = draw_ball(&mut rng, rules, 0);
            assert_eq!(origin, Origin::Top);
            assert!(rules.color_pool.contains(&color));
        }
    }

    #[test]
    fn test_dual_level_uses_both_origins() {
        let levels = LevelTable::new(&Tuning::default());
        let rules = levels.rule_for(70);
        let mut rng = Pcg32::seed_from_u64(7);
        let bottoms = (0..400)
            .filter(|_| draw_ball(&mut rng, rules, 70).1 == Origin::Bottom)
            .count();
        assert!(bottoms > 120 && bottoms < 280, "bottoms = {}", bottoms);
    }

    #[test]
    fn test_inconsistent_rules_fall_back_to_top() {
        let levels = LevelTable::new(&Tuning::default());
        let rules = levels.rule_for(70).clone();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(draw_ball(&mut rng, &rules, 5).1, Origin::Top);
        }
    }

    #[test]
    fn test_recolor_always_differs() {
        let mut rng = Pcg32::seed_from_u64(11);
        for current in crate::sim::color::POOL_4 {
            for _ in 0..50 {
                assert_ne!(draw_recolor(&mut rng, &crate::sim::color::POOL_4, current), current);
            }
        }
    }
}
