//! Ball lifecycle and timed motion
//!
//! A ball moves at constant velocity along a straight lane from just
//! off-screen to the paddle edge. Motion is stored as a "leg": the tick and
//! distance where the current velocity took effect. Retiming starts a new leg
//! from the current position, so time-to-contact is always
//! `remaining distance / current velocity`.

use glam::Vec2;
use serde::Serialize;

use super::color::{Color, Origin};
use super::timer::TimerId;
use crate::tuning::Tuning;

/// Start and end point of a ball's travel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lane {
    pub start: Vec2,
    pub target: Vec2,
}

impl Lane {
    /// Lane for an origin with the paddle centred at `paddle_y`.
    ///
    /// Coordinates are the ball's top-left corner: a top ball stops when its
    /// bottom edge touches the paddle top, a bottom ball when its top edge
    /// touches the paddle bottom.
    pub fn for_origin(origin: Origin, tuning: &Tuning, paddle_y: f32) -> Self {
        let x = (tuning.arena_width - tuning.ball_size) / 2.0;
        let half_paddle = tuning.paddle_size / 2.0;
        match origin {
            Origin::Top => Self {
                start: Vec2::new(x, -tuning.ball_size),
                target: Vec2::new(x, paddle_y - half_paddle - tuning.ball_size),
            },
            Origin::Bottom => Self {
                start: Vec2::new(x, tuning.arena_height),
                target: Vec2::new(x, paddle_y + half_paddle),
            },
        }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.target)
    }
}

/// Whole ticks needed to cover `distance` at `velocity`.
///
/// The epsilon keeps float noise from rounding an exact tick count up by one.
fn ticks_for(distance: f64, velocity: f64) -> u64 {
    if distance <= 0.0 || velocity <= 0.0 {
        return 0;
    }
    ((distance / velocity) - 1e-6).ceil().max(1.0) as u64
}

/// An in-flight ball
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: u32,
    /// Color judged at contact (may change once for ghost balls)
    pub color: Color,
    pub speed: f32,
    pub origin: Origin,
    pub spawn_tick: u64,
    pub lane: Lane,
    pub color_switched: bool,
    /// Distance per tick at speed 1.0
    base_velocity: f64,
    leg_tick: u64,
    leg_distance: f64,
    pub(crate) contact_timer: Option<TimerId>,
    pub(crate) switch_timer: Option<TimerId>,
}

impl Ball {
    /// A ball at the start of its lane. `reference_ticks` is the full-travel
    /// time at speed 1.0.
    pub fn new(
        id: u32,
        color: Color,
        origin: Origin,
        speed: f32,
        lane: Lane,
        now: u64,
        reference_ticks: u64,
    ) -> Self {
        let base_velocity = lane.length() as f64 / reference_ticks.max(1) as f64;
        Self {
            id,
            color,
            speed,
            origin,
            spawn_tick: now,
            lane,
            color_switched: false,
            base_velocity,
            leg_tick: now,
            leg_distance: 0.0,
            contact_timer: None,
            switch_timer: None,
        }
    }

    pub fn travel(&self) -> f64 {
        self.lane.length() as f64
    }

    /// Distance per tick at the ball's current speed
    pub fn velocity(&self) -> f64 {
        self.base_velocity * self.speed as f64
    }

    /// Distance covered at `tick`, clamped to the lane
    pub fn distance_at(&self, tick: u64) -> f64 {
        let elapsed = tick.saturating_sub(self.leg_tick) as f64;
        (self.leg_distance + self.velocity() * elapsed).min(self.travel())
    }

    /// Fraction of the lane covered at `tick` (0.0 - 1.0)
    pub fn progress_at(&self, tick: u64) -> f32 {
        let travel = self.travel();
        if travel <= 0.0 {
            return 1.0;
        }
        (self.distance_at(tick) / travel) as f32
    }

    pub fn position_at(&self, tick: u64) -> Vec2 {
        self.lane.start.lerp(self.lane.target, self.progress_at(tick))
    }

    /// Tick at which the ball reaches the paddle on the current leg
    pub fn contact_tick(&self) -> u64 {
        self.leg_tick + ticks_for(self.travel() - self.leg_distance, self.velocity())
    }

    /// Tick at which the ball crosses `fraction` of its lane, or `None` if it
    /// already has.
    pub fn switch_tick(&self, fraction: f32) -> Option<u64> {
        let point = self.travel() * fraction as f64;
        if self.leg_distance >= point {
            return None;
        }
        Some(self.leg_tick + ticks_for(point - self.leg_distance, self.velocity()))
    }

    /// Change speed at `now`, continuing from the current position
    pub fn retime(&mut self, now: u64, speed: f32) {
        self.leg_distance = self.distance_at(now);
        self.leg_tick = now;
        self.speed = speed;
    }

    /// One-shot recolor. Returns false if the ball already switched.
    pub fn switch_color(&mut self, color: Color) -> bool {
        if self.color_switched {
            return false;
        }
        self.color = color;
        self.color_switched = true;
        true
    }
}
