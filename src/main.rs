//! Color Switcher entry point
//!
//! Native builds run a headless session with the autopilot and report the
//! result. The browser build is driven from `color_switcher::web`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use color_switcher::audio::{self, NullAudio};
    use color_switcher::consts::TICKS_PER_SEC;
    use color_switcher::sim::{Command, GameEvent, GameState, TickInput, tick};
    use color_switcher::{ThresholdPreset, Tuning};

    /// Headless Color Switcher session played by the autopilot
    #[derive(Parser, Debug)]
    #[command(name = "color-switcher", version, about)]
    struct Cli {
        /// RNG seed (defaults to the system clock)
        #[arg(long)]
        seed: Option<u64>,

        /// JSON tuning file; overrides --preset
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Threshold preset: quick or standard
        #[arg(long, default_value = "quick")]
        preset: String,

        /// Simulated seconds to run before stopping
        #[arg(long, default_value_t = 300)]
        seconds: u64,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let cli = Cli::parse();

        let tuning = match &cli.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("loading tuning from {}", path.display()))?,
            None => {
                let Some(preset) = ThresholdPreset::from_str(&cli.preset) else {
                    bail!("unknown preset '{}' (expected quick or standard)", cli.preset);
                };
                Tuning::from_preset(preset)
            }
        };

        let seed = cli.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        let mut state = GameState::with_tuning(tuning, seed).context("invalid tuning")?;
        log::info!("Color Switcher (native) starting with seed {}", seed);

        tick(&mut state, &TickInput::with(&[Command::StartOrRestart]));
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let total_ticks = cli.seconds * TICKS_PER_SEC;
        let mut spawned = 0u32;
        for _ in 0..total_ticks {
            tick(&mut state, &idle);
            let events = state.drain_events();
            audio::dispatch(&events, &NullAudio);
            for event in &events {
                match event {
                    GameEvent::LevelEntered { name, threshold, .. } => {
                        log::info!("{} (threshold {})", name, threshold);
                    }
                    GameEvent::BallSpawned { .. } => spawned += 1,
                    _ => {}
                }
            }
            if !state.is_playing() {
                break;
            }
        }

        let snapshot = state.snapshot();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            println!(
                "score {} | level {} | speed {:.2} | balls spawned {} | {:.1}s | {}",
                snapshot.score,
                snapshot.level,
                snapshot.speed,
                spawned,
                snapshot.time_ms / 1000.0,
                if snapshot.game_over { "game over" } else { "still playing" }
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}
