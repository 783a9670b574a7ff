//! Round state and core simulation types
//!
//! Everything a view needs to draw the circle lives here.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::timer::TimerHandle;
use crate::tuning::Tuning;

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the first start
    #[default]
    Idle,
    /// Colors are cycling
    Playing,
    /// Round ended, waiting for a restart
    GameOver,
}

/// Colors the circle can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircleColor {
    Red,
    Blue,
    Yellow,
    /// The only color that may be tapped
    Green,
}

impl CircleColor {
    /// Non-target colors, picked uniformly while cycling
    pub const DECOYS: [CircleColor; 3] = [CircleColor::Red, CircleColor::Blue, CircleColor::Yellow];

    pub const TARGET: CircleColor = CircleColor::Green;

    pub fn is_target(self) -> bool {
        self == Self::TARGET
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CircleColor::Red => "red",
            CircleColor::Blue => "blue",
            CircleColor::Yellow => "yellow",
            CircleColor::Green => "green",
        }
    }

    /// Uniform draw from the decoy palette (repeats allowed)
    pub fn random_decoy(rng: &mut Pcg32) -> Self {
        Self::DECOYS[rng.random_range(0..Self::DECOYS.len())]
    }
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Tapped a decoy color
    WrongTap,
    /// Target deadline passed without a tap
    Timeout,
}

/// Observable things that happened during a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted,
    ColorChanged { color: CircleColor },
    /// Target is showing; a tap is required before `deadline_ms`
    TargetShown { deadline_ms: u64 },
    Success { score: u32 },
    /// Difficulty stepped up after a score boundary
    SpeedUp { interval_ms: u64 },
    Failure { reason: FailureReason },
    RoundEnded { final_score: u32 },
}

/// Timer slots owned by a round. Each slot holds at most one pending timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerSlots {
    /// Color advance or post-score resume
    pub advance: Option<TimerHandle>,
    pub deadline: Option<TimerHandle>,
    pub grace: Option<TimerHandle>,
}

/// The single mutable entity of the game
#[derive(Debug, Clone)]
pub struct Round {
    pub phase: RoundPhase,
    pub score: u32,
    /// Snapshot of the score taken when the round ended
    pub final_score: Option<u32>,
    pub color: CircleColor,
    /// Decoy changes since the target last appeared
    pub cycle_count: u8,
    pub interval_ms: u64,
    pub grace_active: bool,
    /// Set between a successful tap and the resume timer
    pub paused: bool,
    /// When the current target phase began
    pub target_shown_at: Option<u64>,
    /// Incremented on every start; timers carry it for the stale guard
    pub epoch: u32,
    pub timers: TimerSlots,
}

impl Round {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: RoundPhase::Idle,
            score: 0,
            final_score: None,
            color: CircleColor::Red,
            cycle_count: 0,
            interval_ms: tuning.base_interval_ms,
            grace_active: false,
            paused: false,
            target_shown_at: None,
            epoch: 0,
            timers: TimerSlots::default(),
        }
    }

    /// Fresh playing state for the next epoch
    pub fn reset(&mut self, tuning: &Tuning, color: CircleColor) {
        *self = Self {
            phase: RoundPhase::Playing,
            color,
            epoch: self.epoch.wrapping_add(1),
            ..Self::new(tuning)
        };
    }

    /// Whether a tap right now would score
    pub fn accepts_tap(&self) -> bool {
        self.phase == RoundPhase::Playing && (self.color.is_target() || self.grace_active)
    }

    pub fn snapshot(&self, now_ms: u64) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            score: self.score,
            final_score: self.final_score,
            color: self.color,
            cycle_count: self.cycle_count,
            interval_ms: self.interval_ms,
            grace_active: self.grace_active,
            paused: self.paused,
            now_ms,
        }
    }
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub score: u32,
    pub final_score: Option<u32>,
    pub color: CircleColor,
    pub cycle_count: u8,
    pub interval_ms: u64,
    pub grace_active: bool,
    /// Post-score pause: a decoy is held and no target can appear
    pub paused: bool,
    pub now_ms: u64,
}

impl RoundSnapshot {
    /// Score to display (the frozen final score once the round is over)
    pub fn display_score(&self) -> u32 {
        match self.phase {
            RoundPhase::GameOver => self.final_score.unwrap_or(self.score),
            _ => self.score,
        }
    }
}

/// RNG state wrapper for reproducible rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_decoy_never_target() {
        let mut rng = RngState::new(7).to_rng();
        for _ in 0..1000 {
            assert!(!CircleColor::random_decoy(&mut rng).is_target());
        }
    }

    #[test]
    fn test_random_decoy_covers_palette() {
        let mut rng = RngState::new(42).to_rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(CircleColor::random_decoy(&mut rng));
        }
        assert_eq!(seen.len(), CircleColor::DECOYS.len());
    }

    #[test]
    fn test_reset_bumps_epoch() {
        let tuning = Tuning::default();
        let mut round = Round::new(&tuning);
        round.score = 9;
        round.interval_ms = 500;
        round.final_score = Some(9);
        round.reset(&tuning, CircleColor::Blue);
        assert_eq!(round.phase, RoundPhase::Playing);
        assert_eq!(round.epoch, 1);
        assert_eq!(round.score, 0);
        assert_eq!(round.final_score, None);
        assert_eq!(round.interval_ms, 1000);
        assert_eq!(round.color, CircleColor::Blue);
    }

    #[test]
    fn test_accepts_tap() {
        let tuning = Tuning::default();
        let mut round = Round::new(&tuning);
        round.color = CircleColor::Green;
        assert!(!round.accepts_tap(), "idle rounds ignore taps");

        round.reset(&tuning, CircleColor::Red);
        assert!(!round.accepts_tap());
        round.grace_active = true;
        assert!(round.accepts_tap());
        round.grace_active = false;
        round.color = CircleColor::Green;
        assert!(round.accepts_tap());
    }

    #[test]
    fn test_display_score() {
        let tuning = Tuning::default();
        let mut round = Round::new(&tuning);
        round.reset(&tuning, CircleColor::Red);
        round.score = 4;
        assert_eq!(round.snapshot(0).display_score(), 4);
        round.phase = RoundPhase::GameOver;
        round.final_score = Some(3);
        assert_eq!(round.snapshot(0).display_score(), 3);
    }
}
