//! Level/rule table
//!
//! All score-derived modifiers come from [`LevelTable::rule_for`]. Nothing
//! else in the simulation compares the score against a threshold.

use serde::Serialize;

use super::color::color_pool;
use crate::tuning::{LevelSpec, OriginPolicy, RotationPolicy, Tuning};

/// Active modifiers for a score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    /// 1-based level number
    pub level: u32,
    /// Score at which this rule set began
    pub threshold: u32,
    pub name: String,
    pub segment_count: u8,
    pub color_pool: Vec<super::Color>,
    pub paddle_y: f32,
    pub allow_dual_origin: bool,
    pub ghost_balls: bool,
    pub rotation: RotationPolicy,
    pub speed_reset: bool,
}

/// Ordered level table resolved against the arena
#[derive(Debug, Clone)]
pub struct LevelTable {
    rules: Vec<RuleSet>,
}

impl LevelTable {
    /// Build from validated tuning
    pub fn new(tuning: &Tuning) -> Self {
        let rules = tuning
            .levels
            .iter()
            .enumerate()
            .map(|(i, spec)| Self::resolve(i, spec, tuning))
            .collect();
        Self { rules }
    }

    fn resolve(index: usize, spec: &LevelSpec, tuning: &Tuning) -> RuleSet {
        RuleSet {
            level: index as u32 + 1,
            threshold: spec.threshold,
            name: spec.name.clone(),
            segment_count: spec.segments,
            color_pool: color_pool(spec.segments).to_vec(),
            paddle_y: tuning.paddle_y(spec.paddle),
            allow_dual_origin: spec.origins == OriginPolicy::Dual,
            ghost_balls: spec.ghost_balls,
            rotation: spec.rotation,
            speed_reset: spec.speed_reset,
        }
    }

    /// Rule set in force at `score`: the last level whose threshold is reached
    pub fn rule_for(&self, score: u32) -> &RuleSet {
        let idx = self
            .rules
            .partition_point(|r| r.threshold <= score)
            .saturating_sub(1);
        &self.rules[idx]
    }

    /// Levels entered when the score moves from `prev` to `next`, ascending.
    ///
    /// Every threshold in `(prev, next]` is returned, so a jump of more than
    /// one point still fires each intervening level in order.
    pub fn crossed(&self, prev: u32, next: u32) -> impl Iterator<Item = &RuleSet> {
        self.rules
            .iter()
            .filter(move |r| r.threshold > prev && r.threshold <= next)
    }

    /// True if moving from `prev` to `next` lands on or passes a speed-reset level
    pub fn resets_speed(&self, prev: u32, next: u32) -> bool {
        self.crossed(prev, next).any(|r| r.speed_reset)
    }

    /// The first level
    pub fn first(&self) -> &RuleSet {
        &self.rules[0]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Color;

    fn table() -> LevelTable {
        LevelTable::new(&Tuning::default())
    }

    #[test]
    fn test_rule_for_boundaries() {
        let t = table();
        assert_eq!(t.rule_for(0).level, 1);
        assert_eq!(t.rule_for(9).level, 1);
        assert_eq!(t.rule_for(10).level, 2);
        assert_eq!(t.rule_for(24).level, 2);
        assert_eq!(t.rule_for(25).level, 3);
        assert_eq!(t.rule_for(70).level, 4);
        assert_eq!(t.rule_for(100).level, 5);
        assert_eq!(t.rule_for(u32::MAX).level, 5);
    }

    #[test]
    fn test_modes_per_level() {
        let t = table();
        let l1 = t.rule_for(0);
        assert_eq!(l1.segment_count, 3);
        assert_eq!(l1.color_pool, vec![Color::Red, Color::Green, Color::Blue]);
        assert!(!l1.allow_dual_origin);

        let l3 = t.rule_for(30);
        assert_eq!(l3.segment_count, 4);
        assert!(l3.ghost_balls);

        let l4 = t.rule_for(80);
        assert!(l4.allow_dual_origin);
        assert!(!l4.ghost_balls);
        assert_eq!(l4.paddle_y, 422.0);

        // Level 5 moves the paddle back down and reverses taps
        let l5 = t.rule_for(150);
        assert_eq!(l5.paddle_y, t.rule_for(0).paddle_y);
        assert_eq!(l5.rotation, RotationPolicy::Reversed);
    }

    #[test]
    fn test_crossed_single_step() {
        let t = table();
        let levels: Vec<u32> = t.crossed(9, 10).map(|r| r.level).collect();
        assert_eq!(levels, vec![2]);
        assert_eq!(t.crossed(10, 11).count(), 0);
        // Re-entering the same score never re-fires
        assert_eq!(t.crossed(10, 10).count(), 0);
    }

    #[test]
    fn test_crossed_jump_fires_all_in_order() {
        let t = table();
        let levels: Vec<u32> = t.crossed(5, 80).map(|r| r.level).collect();
        assert_eq!(levels, vec![2, 3, 4]);
    }

    #[test]
    fn test_resets_speed_only_at_reset_level() {
        let t = table();
        assert!(t.resets_speed(9, 10));
        assert!(t.resets_speed(0, 30));
        assert!(!t.resets_speed(10, 11));
        assert!(!t.resets_speed(24, 25));
    }
}
