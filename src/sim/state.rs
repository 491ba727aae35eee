//! Session controller
//!
//! Owns every piece of mutable game state and is the only place it changes.
//! Inbound events (tap, contact, start) and fired timers all funnel through
//! `&mut GameState`, so there is exactly one writer.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::ball::{Ball, Lane};
use super::color::{Color, Origin};
use super::judge::{Verdict, judge};
use super::rotation::RotationState;
use super::rules::{LevelTable, RuleSet};
use super::scoring::{ScoreSpeed, SpeedCurve};
use super::spawner::{Spawner, draw_ball, draw_recolor};
use super::timer::{TimerEvent, TimerId, TimerQueue};
use crate::tuning::{Tuning, TuningError};
use crate::{ms_to_ticks, ticks_to_ms};

/// Top-level session phase. `paused` is tracked separately and only
/// meaningful while `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Before the first game
    NotPlaying,
    Playing,
    /// Last game ended on a mismatch
    GameOver,
}

/// Things that happened during a step, for audio and presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Started,
    LevelEntered {
        level: u32,
        name: String,
        threshold: u32,
        direction_flipped: bool,
    },
    Resumed,
    BallSpawned {
        id: u32,
        color: Color,
        origin: Origin,
    },
    ColorSwitched {
        id: u32,
        from: Color,
        to: Color,
    },
    CorrectHit {
        id: u32,
        score: u32,
    },
    IncorrectHit {
        id: u32,
        color: Color,
        expected: Color,
    },
    GameOver {
        score: u32,
    },
}

/// Read-only view of a ball for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub id: u32,
    pub color: Color,
    /// Display color for `color`
    pub hex: &'static str,
    pub origin: Origin,
    pub speed: f32,
    pub spawn_time_ms: f64,
    pub color_switched: bool,
    pub position: Vec2,
    pub target: Vec2,
    pub progress: f32,
    /// Time left until contact at the current speed
    pub contact_in_ms: f64,
}

/// Read-only view of the session for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub time_ms: f64,
    pub playing: bool,
    pub game_over: bool,
    pub paused: bool,
    pub level_banner: Option<String>,
    pub score: u32,
    pub speed: f32,
    pub level: u32,
    pub rotation_index: i64,
    pub rotation_direction: i64,
    pub segment_count: u8,
    pub paddle_y: f32,
    pub balls: Vec<BallView>,
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    tuning: Tuning,
    levels: LevelTable,
    rng: Pcg32,
    time_ticks: u64,
    phase: GamePhase,
    paused: bool,
    level_banner: Option<String>,
    progress: ScoreSpeed,
    rotation: RotationState,
    /// In-flight balls, sorted by id
    balls: Vec<Ball>,
    timers: TimerQueue,
    spawner: Spawner,
    resume_timer: Option<TimerId>,
    events: Vec<GameEvent>,
    /// Never reset between games, so a stale contact for an old ball can
    /// never match a new one.
    next_id: u32,
}

impl GameState {
    /// Session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(Tuning::default(), seed)
    }

    /// Session with custom tuning
    pub fn with_tuning(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(tuning, seed))
    }

    fn build(tuning: Tuning, seed: u64) -> Self {
        let levels = LevelTable::new(&tuning);
        let progress = ScoreSpeed::new(tuning.base_speed);
        Self {
            seed,
            tuning,
            levels,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            phase: GamePhase::NotPlaying,
            paused: false,
            level_banner: None,
            progress,
            rotation: RotationState::default(),
            balls: Vec::new(),
            timers: TimerQueue::new(),
            spawner: Spawner::new(),
            resume_timer: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    // === Queries ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn level_banner(&self) -> Option<&str> {
        self.level_banner.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn speed(&self) -> f32 {
        self.progress.speed
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    /// Rule set for the current score
    pub fn rules(&self) -> &RuleSet {
        self.levels.rule_for(self.progress.score)
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Timers still scheduled (spawn, contacts, recolors, resume)
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Color in `origin`'s contact zone right now
    pub fn active_color(&self, origin: Origin) -> Color {
        self.rotation.active_color(origin, self.rules().segment_count)
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        let rules = self.rules();
        let now = self.time_ticks;
        Snapshot {
            time_ms: ticks_to_ms(now),
            playing: self.is_playing(),
            game_over: self.is_game_over(),
            paused: self.paused,
            level_banner: self.level_banner.clone(),
            score: self.progress.score,
            speed: self.progress.speed,
            level: rules.level,
            rotation_index: self.rotation.index,
            rotation_direction: self.rotation.direction,
            segment_count: rules.segment_count,
            paddle_y: rules.paddle_y,
            balls: self
                .balls
                .iter()
                .map(|b| BallView {
                    id: b.id,
                    color: b.color,
                    hex: b.color.hex(),
                    origin: b.origin,
                    speed: b.speed,
                    spawn_time_ms: ticks_to_ms(b.spawn_tick),
                    color_switched: b.color_switched,
                    position: b.position_at(now),
                    target: b.lane.target,
                    progress: b.progress_at(now),
                    contact_in_ms: ticks_to_ms(b.contact_tick().saturating_sub(now)),
                })
                .collect(),
        }
    }

    // === Inbound events ===

    /// Start a new game (or restart after game over).
    ///
    /// Returns false if a game is already running.
    pub fn start(&mut self) -> bool {
        if self.is_playing() {
            log::warn!("Start ignored: game already running");
            return false;
        }

        self.timers.clear();
        self.spawner.reset();
        self.resume_timer = None;
        self.balls.clear();

        self.progress = ScoreSpeed::new(self.tuning.base_speed);
        self.rotation = RotationState::default();
        let first = self.levels.first().clone();
        self.rotation.apply_policy(first.rotation);
        self.phase = GamePhase::Playing;

        log::info!("Game started (seed {}, tick {})", self.seed, self.time_ticks);
        self.events.push(GameEvent::Started);
        self.events.push(GameEvent::LevelEntered {
            level: first.level,
            name: first.name.clone(),
            threshold: first.threshold,
            direction_flipped: false,
        });
        self.enter_pause(first.name);
        true
    }

    /// Rotate the paddle one segment. Ignored unless playing and unpaused.
    pub fn tap(&mut self) -> bool {
        if !self.is_playing() || self.paused {
            log::debug!("Tap ignored (phase {:?}, paused {})", self.phase, self.paused);
            return false;
        }
        self.rotation.step();
        true
    }

    /// Contact reported by the presentation layer's own motion tracking.
    ///
    /// Safe to call for balls that already resolved; those are ignored.
    pub fn ball_contact(&mut self, ball_id: u32) -> Option<Verdict> {
        self.resolve(ball_id)
    }

    // === Time ===

    /// Advance one tick and fire every timer that came due
    pub fn step(&mut self) {
        self.time_ticks += 1;
        self.run_due_timers();
    }

    /// Fire timers due at the current tick without advancing time
    pub fn run_due_timers(&mut self) {
        while let Some((_, event)) = self.timers.pop_due(self.time_ticks) {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Spawn => {
                self.spawner.fired();
                if self.is_playing() && !self.paused {
                    self.spawn_ball();
                    self.spawner.arm(
                        &mut self.timers,
                        self.time_ticks,
                        self.tuning.spawn_interval_ms,
                        self.progress.speed,
                    );
                }
            }
            TimerEvent::Contact { ball_id } => {
                if let Some(ball) = self.balls.iter_mut().find(|b| b.id == ball_id) {
                    ball.contact_timer = None;
                }
                self.resolve(ball_id);
            }
            TimerEvent::ColorSwitch { ball_id } => self.switch_color(ball_id),
            TimerEvent::Resume => {
                self.resume_timer = None;
                if self.is_playing() && self.paused {
                    self.resume();
                }
            }
        }
    }

    // === Transitions ===

    /// Banner window: spawning stops, the field is cleared, play resumes
    /// after `banner_ms`.
    fn enter_pause(&mut self, banner: String) {
        self.paused = true;
        self.level_banner = Some(banner);
        self.spawner.disarm(&mut self.timers);
        self.clear_balls();

        if let Some(id) = self.resume_timer.take() {
            self.timers.cancel(id);
        }
        let due = self.time_ticks + ms_to_ticks(self.tuning.banner_ms);
        self.resume_timer = Some(self.timers.schedule(due, TimerEvent::Resume));
    }

    fn resume(&mut self) {
        self.paused = false;
        self.level_banner = None;
        self.spawner.arm(
            &mut self.timers,
            self.time_ticks,
            self.tuning.spawn_interval_ms,
            self.progress.speed,
        );
        log::debug!("Resumed at tick {}", self.time_ticks);
        self.events.push(GameEvent::Resumed);
    }

    /// Mismatch: stop everything
    fn end(&mut self) {
        self.timers.clear();
        self.spawner.reset();
        self.resume_timer = None;
        self.balls.clear();
        self.phase = GamePhase::GameOver;
        self.paused = false;
        self.level_banner = None;

        log::info!("Game over with score {}", self.progress.score);
        self.events.push(GameEvent::GameOver {
            score: self.progress.score,
        });
    }

    fn clear_balls(&mut self) {
        for ball in self.balls.drain(..) {
            if let Some(id) = ball.contact_timer {
                self.timers.cancel(id);
            }
            if let Some(id) = ball.switch_timer {
                self.timers.cancel(id);
            }
        }
    }

    // === Judge ===

    fn resolve(&mut self, ball_id: u32) -> Option<Verdict> {
        if !self.is_playing() {
            log::warn!("Contact for ball {} ignored: not playing", ball_id);
            return None;
        }
        let Some(idx) = self.balls.iter().position(|b| b.id == ball_id) else {
            log::debug!("Contact for ball {} ignored: already resolved", ball_id);
            return None;
        };

        let ball = self.balls.remove(idx);
        if let Some(id) = ball.contact_timer {
            self.timers.cancel(id);
        }
        if let Some(id) = ball.switch_timer {
            self.timers.cancel(id);
        }

        let segments = self.rules().segment_count;
        let verdict = judge(&self.rotation, segments, ball.color, ball.origin);
        log::debug!(
            "Ball {} ({:?} from {:?}) at rotation {}: {:?}",
            ball.id,
            ball.color,
            ball.origin,
            self.rotation.index,
            verdict
        );

        match verdict {
            Verdict::Hit => self.score_hit(ball.id),
            Verdict::Miss { expected } => {
                self.events.push(GameEvent::IncorrectHit {
                    id: ball.id,
                    color: ball.color,
                    expected,
                });
                self.end();
            }
        }
        Some(verdict)
    }

    fn score_hit(&mut self, ball_id: u32) {
        let curve = SpeedCurve {
            base: self.tuning.base_speed,
            increment: self.tuning.speed_increment,
            cap: self.tuning.speed_cap,
        };
        let change = self.progress.increment(curve, &self.levels);
        self.events.push(GameEvent::CorrectHit {
            id: ball_id,
            score: change.score,
        });

        if change.speed_changed() {
            if self.tuning.in_flight_follows_speed {
                self.retime_balls(change.speed);
            }
            if self.spawner.is_armed() {
                self.spawner.arm(
                    &mut self.timers,
                    self.time_ticks,
                    self.tuning.spawn_interval_ms,
                    change.speed,
                );
            }
        }

        let entered: Vec<RuleSet> = self
            .levels
            .crossed(change.prev_score, change.score)
            .cloned()
            .collect();
        let Some(last) = entered.last().map(|r| r.name.clone()) else {
            return;
        };
        for rules in &entered {
            let flipped = self.rotation.apply_policy(rules.rotation);
            log::info!(
                "Entering {} at score {} (segments {}, dual origin {}, ghost {}, direction {})",
                rules.name,
                change.score,
                rules.segment_count,
                rules.allow_dual_origin,
                rules.ghost_balls,
                self.rotation.direction
            );
            self.events.push(GameEvent::LevelEntered {
                level: rules.level,
                name: rules.name.clone(),
                threshold: rules.threshold,
                direction_flipped: flipped,
            });
        }
        self.enter_pause(last);
    }

    // === Ball lifecycle ===

    fn spawn_ball(&mut self) {
        let score = self.progress.score;
        let rules = self.levels.rule_for(score);
        let (color, origin) = draw_ball(&mut self.rng, rules, score);
        let paddle_y = rules.paddle_y;
        let ghost = rules.ghost_balls;
        self.launch(color, origin, paddle_y, ghost);
    }

    /// Put a specific ball in flight under the current rules.
    ///
    /// Used by scripted sessions; normal play spawns from the timer. Returns
    /// `None` unless playing and unpaused, or when the current level has no
    /// bottom contact zone and `origin` is `Bottom`.
    pub fn inject_ball(&mut self, color: Color, origin: Origin) -> Option<u32> {
        if !self.is_playing() || self.paused {
            return None;
        }
        let rules = self.rules();
        if origin == Origin::Bottom && !rules.allow_dual_origin {
            log::warn!("Refusing bottom ball: {} has no bottom contact zone", rules.name);
            return None;
        }
        let paddle_y = rules.paddle_y;
        let ghost = rules.ghost_balls;
        Some(self.launch(color, origin, paddle_y, ghost))
    }

    fn launch(&mut self, color: Color, origin: Origin, paddle_y: f32, ghost: bool) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let lane = Lane::for_origin(origin, &self.tuning, paddle_y);
        let mut ball = Ball::new(
            id,
            color,
            origin,
            self.progress.speed,
            lane,
            self.time_ticks,
            ms_to_ticks(self.tuning.reference_travel_ms),
        );
        self.schedule_flight(&mut ball, ghost);

        log::debug!("Spawned ball {} {:?} from {:?} at tick {}", id, color, origin, self.time_ticks);
        self.events.push(GameEvent::BallSpawned { id, color, origin });
        self.balls.push(ball);
        id
    }

    /// Schedule a ball's recolor (if any) and contact for its current leg
    fn schedule_flight(&mut self, ball: &mut Ball, ghost: bool) {
        let now = self.time_ticks;
        if ghost && !ball.color_switched {
            if let Some(due) = ball.switch_tick(self.tuning.ghost_switch_fraction) {
                ball.switch_timer = Some(
                    self.timers
                        .schedule(due.max(now), TimerEvent::ColorSwitch { ball_id: ball.id }),
                );
            }
        }
        let due = ball.contact_tick().max(now);
        ball.contact_timer = Some(self.timers.schedule(due, TimerEvent::Contact { ball_id: ball.id }));
    }

    /// Apply a new speed to every in-flight ball from its current position
    fn retime_balls(&mut self, speed: f32) {
        let now = self.time_ticks;
        let ghost = self.rules().ghost_balls;
        let mut balls = std::mem::take(&mut self.balls);
        for ball in &mut balls {
            if let Some(id) = ball.contact_timer.take() {
                self.timers.cancel(id);
            }
            if let Some(id) = ball.switch_timer.take() {
                self.timers.cancel(id);
            }
            ball.retime(now, speed);
            self.schedule_flight(ball, ghost);
        }
        self.balls = balls;
    }

    fn switch_color(&mut self, ball_id: u32) {
        let pool = self.rules().color_pool.clone();
        let Some(ball) = self.balls.iter_mut().find(|b| b.id == ball_id) else {
            return;
        };
        ball.switch_timer = None;
        let from = ball.color;
        let to = draw_recolor(&mut self.rng, &pool, from);
        if ball.switch_color(to) {
            log::debug!("Ball {} switched {:?} -> {:?}", ball_id, from, to);
            self.events.push(GameEvent::ColorSwitched {
                id: ball_id,
                from,
                to,
            });
        }
    }
}
