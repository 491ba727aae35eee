//! Browser binding
//!
//! Exposes the simulation to a JS presentation layer. JS forwards taps,
//! contacts and start presses, calls `update` once per animation frame, and
//! renders from `snapshot_json`.

use wasm_bindgen::prelude::*;

use crate::audio::{self, WebAudio};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{Command, GameState, TickInput, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Color Switcher starting...");
}

/// Game instance driven by the page's animation loop
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    audio: WebAudio,
    accumulator: f32,
    pending: TickInput,
}

#[wasm_bindgen]
impl WebGame {
    /// New game seeded from the clock
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        Self::with_seed(js_sys::Date::now() as u64)
    }

    /// New game with a fixed seed
    pub fn with_seed(seed: u64) -> WebGame {
        let settings = Settings::default();
        let tuning = Tuning::from_preset(settings.preset);
        let state = match GameState::with_tuning(tuning, seed) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Preset tuning rejected ({}), using defaults", e);
                GameState::new(seed)
            }
        };
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            state,
            audio: WebAudio::new(&settings),
            accumulator: 0.0,
            pending: TickInput::default(),
        }
    }

    /// Replace tuning from a JSON document; takes effect immediately with a
    /// fresh session. Returns the validation error text on failure.
    pub fn load_tuning(&mut self, json: &str) -> Result<(), JsValue> {
        let tuning = Tuning::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let state = GameState::with_tuning(tuning, self.state.seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.state = state;
        self.pending = TickInput::default();
        Ok(())
    }

    pub fn tap(&mut self) {
        self.pending.commands.push(Command::Tap);
    }

    pub fn start_or_restart(&mut self) {
        self.audio.resume();
        self.pending.commands.push(Command::StartOrRestart);
    }

    pub fn ball_contact(&mut self, ball_id: u32) {
        self.pending.commands.push(Command::BallContact(ball_id));
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.pending.idle_mode = idle;
    }

    pub fn set_volume(&mut self, master: f32, sfx: f32, muted: bool) {
        let settings = Settings {
            master_volume: master,
            sfx_volume: sfx,
            muted,
            ..Settings::default()
        };
        self.audio.apply_settings(&settings);
    }

    /// Run simulation ticks for `dt` seconds of wall time
    pub fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.pending);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot commands are consumed by the first substep
            self.pending.commands.clear();

            let events = self.state.drain_events();
            audio::dispatch(&events, &self.audio);
        }
    }

    /// Current state for rendering
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.state.snapshot()).unwrap_or_default()
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
