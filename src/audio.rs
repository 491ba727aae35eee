//! Audio collaborator
//!
//! The simulation never talks to audio directly. Shells drain
//! [`GameEvent`]s and hand them to [`dispatch`], which fires one-shot
//! effects at an [`AudioSink`]. Sinks own their own failures: `play` never
//! returns an error and must not block.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball matched the contact zone
    CorrectHit,
    /// Ball did not match; the game is over
    IncorrectHit,
}

/// Anything that can play a sound effect
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);
}

/// Sink that drops everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&self, _effect: SoundEffect) {}
}

/// Sound for an event, if it has one
pub fn effect_for(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::CorrectHit { .. } => Some(SoundEffect::CorrectHit),
        GameEvent::IncorrectHit { .. } => Some(SoundEffect::IncorrectHit),
        _ => None,
    }
}

/// Fire the effects for a batch of events, in order
pub fn dispatch(events: &[GameEvent], sink: &dyn AudioSink) {
    for effect in events.iter().filter_map(effect_for) {
        sink.play(effect);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::WebAudio;

/// Procedurally generated effects on the Web Audio API - no asset files
#[cfg(target_arch = "wasm32")]
mod web_audio {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};
    use crate::settings::Settings;

    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Bright rising blip
        fn play_correct(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 520.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(520.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(880.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Low falling buzz
        fn play_incorrect(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(55.0, t + 0.45)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.55).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::CorrectHit => self.play_correct(ctx, self.volume),
                SoundEffect::IncorrectHit => self.play_incorrect(ctx, self.volume),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Color;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<SoundEffect>>);

    impl AudioSink for Recorder {
        fn play(&self, effect: SoundEffect) {
            self.0.borrow_mut().push(effect);
        }
    }

    #[test]
    fn test_dispatch_maps_hits_only() {
        let events = vec![
            GameEvent::Started,
            GameEvent::CorrectHit { id: 1, score: 1 },
            GameEvent::Resumed,
            GameEvent::IncorrectHit {
                id: 2,
                color: Color::Blue,
                expected: Color::Red,
            },
            GameEvent::GameOver { score: 1 },
        ];
        let sink = Recorder::default();
        dispatch(&events, &sink);
        assert_eq!(
            *sink.0.borrow(),
            vec![SoundEffect::CorrectHit, SoundEffect::IncorrectHit]
        );
    }

    #[test]
    fn test_null_audio_accepts_everything() {
        dispatch(&[GameEvent::CorrectHit { id: 1, score: 1 }], &NullAudio);
    }
}
