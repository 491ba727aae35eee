//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable timer order (due tick, then scheduling order)
//! - No rendering, audio or platform dependencies

pub mod ball;
pub mod color;
pub mod judge;
pub mod rotation;
pub mod rules;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use ball::{Ball, Lane};
pub use color::{Color, Origin};
pub use judge::{Verdict, judge};
pub use rotation::RotationState;
pub use rules::{LevelTable, RuleSet};
pub use scoring::{ScoreSpeed, SpeedCurve};
pub use state::{BallView, GameEvent, GamePhase, GameState, Snapshot};
pub use tick::{Command, TickInput, autopilot, tick};
pub use timer::{TimerEvent, TimerId, TimerQueue};
