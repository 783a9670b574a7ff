//! Green Tap - a tap-on-green reaction game
//!
//! Core modules:
//! - `sim`: Deterministic round engine (state machine, timers, difficulty ramp)
//! - `tuning`: Data-driven game balance
//! - `audio`: Sound cues derived from round events
//! - `highscores`: Per-session leaderboard

pub mod audio;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use audio::{AudioManager, SoundEffect};
pub use highscores::HighScores;
pub use sim::{CircleColor, GameEvent, RoundEngine, RoundObserver, RoundPhase, RoundSnapshot};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants (all durations in milliseconds)
pub mod consts {
    /// Delay between color changes at the start of a round
    pub const BASE_INTERVAL_MS: u64 = 1000;
    /// The color-change interval never drops below this
    pub const MIN_INTERVAL_MS: u64 = 500;
    /// Interval multiplier applied at every score step
    pub const INTERVAL_RATIO: f64 = 0.85;
    /// Difficulty steps up whenever the score is a multiple of this
    pub const SCORE_STEP: u32 = 5;

    /// Decoy changes before the target color appears
    pub const CYCLES_BEFORE_TARGET: u8 = 3;

    /// Target deadline = max(interval * multiplier, floor)
    pub const DEADLINE_MULTIPLIER: f64 = 1.5;
    pub const MIN_DEADLINE_MS: u64 = 750;

    /// Taps are still accepted this long after the target appears
    pub const GRACE_MS: u64 = 200;
    /// Pause after a successful tap before cycling resumes
    pub const SCORE_PAUSE_MS: u64 = 300;
}

/// Speed readout relative to the base interval, in percent
#[inline]
pub fn speed_percent(base_interval_ms: u64, interval_ms: u64) -> u32 {
    if interval_ms == 0 {
        return 0;
    }
    (base_interval_ms as f64 / interval_ms as f64 * 100.0).round() as u32
}

/// Speed multiplier reached by a final score ("you reached Nx speed")
#[inline]
pub fn speed_tier(final_score: u32) -> u32 {
    final_score / consts::SCORE_STEP + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_percent() {
        assert_eq!(speed_percent(1000, 1000), 100);
        assert_eq!(speed_percent(1000, 850), 118);
        assert_eq!(speed_percent(1000, 500), 200);
        assert_eq!(speed_percent(1000, 0), 0);
    }

    #[test]
    fn test_speed_tier() {
        assert_eq!(speed_tier(0), 1);
        assert_eq!(speed_tier(4), 1);
        assert_eq!(speed_tier(5), 2);
        assert_eq!(speed_tier(12), 3);
    }
}
