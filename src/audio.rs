//! Sound cues for round events
//!
//! Procedurally described tones - no external files needed! The manager only
//! decides *what* to play and how loud; a platform layer drains the queue and
//! synthesizes the tones.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, RoundObserver};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Round started
    RoundStart,
    /// Target appeared
    TargetShown,
    /// Target tapped in time
    Success,
    /// Difficulty stepped up
    SpeedUp,
    /// Wrong tap or missed target
    Failure,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// A single swept tone with an exponential fade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub wave: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration_s: f32,
    /// Peak gain before volume scaling
    pub gain: f32,
}

impl SoundEffect {
    pub fn tone(&self) -> Tone {
        match self {
            // Rising blip
            SoundEffect::RoundStart => Tone {
                wave: Waveform::Triangle,
                start_hz: 330.0,
                end_hz: 660.0,
                duration_s: 0.15,
                gain: 0.4,
            },
            // Short bright ping
            SoundEffect::TargetShown => Tone {
                wave: Waveform::Sine,
                start_hz: 880.0,
                end_hz: 880.0,
                duration_s: 0.06,
                gain: 0.25,
            },
            SoundEffect::Success => Tone {
                wave: Waveform::Sine,
                start_hz: 520.0,
                end_hz: 1040.0,
                duration_s: 0.12,
                gain: 0.5,
            },
            SoundEffect::SpeedUp => Tone {
                wave: Waveform::Square,
                start_hz: 440.0,
                end_hz: 1320.0,
                duration_s: 0.3,
                gain: 0.3,
            },
            // Low descending buzz
            SoundEffect::Failure => Tone {
                wave: Waveform::Sawtooth,
                start_hz: 220.0,
                end_hz: 55.0,
                duration_s: 0.5,
                gain: 0.45,
            },
        }
    }

    /// Cue for a round event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::RoundStarted => Some(SoundEffect::RoundStart),
            GameEvent::TargetShown { .. } => Some(SoundEffect::TargetShown),
            GameEvent::Success { .. } => Some(SoundEffect::Success),
            GameEvent::SpeedUp { .. } => Some(SoundEffect::SpeedUp),
            GameEvent::Failure { .. } => Some(SoundEffect::Failure),
            GameEvent::ColorChanged { .. } | GameEvent::RoundEnded { .. } => None,
        }
    }
}

/// A cue waiting to be played
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedSound {
    pub effect: SoundEffect,
    /// Effective volume (0.0 - 1.0)
    pub volume: f32,
    /// Engine clock when the cue was raised
    pub at_ms: u64,
}

/// Audio manager for the game
#[derive(Debug)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    queue: Vec<QueuedSound>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            queue: Vec::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Queue a sound effect (dropped when silent)
    pub fn play(&mut self, effect: SoundEffect, at_ms: u64) {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        self.queue.push(QueuedSound {
            effect,
            volume,
            at_ms,
        });
    }

    pub fn pending(&self) -> &[QueuedSound] {
        &self.queue
    }

    /// Hand queued cues to the platform layer
    pub fn drain(&mut self) -> Vec<QueuedSound> {
        std::mem::take(&mut self.queue)
    }
}

impl RoundObserver for AudioManager {
    fn on_event(&mut self, event: &GameEvent, now_ms: u64) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect, now_ms);
        }
    }
}
