//! Green Tap entry point
//!
//! Native demo: a simulated player runs a few rounds against the engine so the
//! timing rules can be watched in the log (`RUST_LOG=debug`).
//!
//! Usage: `green-tap [tuning.json]`
//! Environment: `GREEN_TAP_SEED`, `GREEN_TAP_ROUNDS`, `GREEN_TAP_REACTION_MS`

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use green_tap::sim::{GameEvent, RoundEngine, RoundPhase};
use green_tap::{AudioManager, HighScores, Tuning, speed_percent, speed_tier};

/// Simulated player reaction time (ms)
const DEFAULT_REACTION_MS: u64 = 450;
const DEFAULT_ROUNDS: u32 = 3;
/// A perfect player would never lose, so the demo cuts rounds off here
const MAX_ROUND_MS: u64 = 10 * 60 * 1000;

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Round count from the environment, clamped rather than truncated
fn rounds_from(value: Option<u64>) -> u32 {
    value.map_or(DEFAULT_ROUNDS, |r| u32::try_from(r).unwrap_or(u32::MAX))
}

/// How long the simulated player takes to tap once the target shows
fn reaction_delay(player: &mut Pcg32, reaction_ms: u64) -> u64 {
    let jitter = player.random_range(0..=reaction_ms.saturating_mul(2));
    (reaction_ms / 2).saturating_add(jitter)
}

fn load_tuning() -> Tuning {
    let Some(path) = std::env::args().nth(1) else {
        return Tuning::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Could not load tuning from {}: {} - using defaults", path, e);
            Tuning::default()
        }
    }
}

/// Play one round with a player who reacts within 0.5x to 2.5x of `reaction_ms`
fn play_round(engine: &mut RoundEngine, player: &mut Pcg32, reaction_ms: u64) -> u32 {
    engine.start();
    let started = engine.now_ms();
    while engine.phase() == RoundPhase::Playing
        && engine.now_ms().saturating_sub(started) < MAX_ROUND_MS
    {
        if engine.color().is_target() {
            engine.advance_by(reaction_delay(player, reaction_ms));
            engine.tap();
        } else if engine.advance_to_next_timer().is_none() {
            break;
        }

        for event in engine.drain_events() {
            if let GameEvent::SpeedUp { interval_ms } = event {
                println!(
                    "  speed {}% (interval {}ms)",
                    speed_percent(engine.tuning().base_interval_ms, interval_ms),
                    interval_ms
                );
            }
        }
    }
    engine.final_score().unwrap_or(engine.score())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Green Tap (native demo) starting...");

    let seed = env_u64("GREEN_TAP_SEED").unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    let rounds = rounds_from(env_u64("GREEN_TAP_ROUNDS"));
    let reaction_ms = env_u64("GREEN_TAP_REACTION_MS").unwrap_or(DEFAULT_REACTION_MS);
    log::info!("Seed {}, {} rounds, reaction {}ms", seed, rounds, reaction_ms);

    let mut engine = RoundEngine::new(load_tuning(), seed);
    let highscores = Rc::new(RefCell::new(HighScores::new()));
    let audio = Rc::new(RefCell::new(AudioManager::new()));
    engine.subscribe(highscores.clone());
    engine.subscribe(audio.clone());

    let mut player = Pcg32::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);
    for round in 1..=rounds {
        println!("Round {}", round);
        let score = play_round(&mut engine, &mut player, reaction_ms);
        let cues = audio.borrow_mut().drain();
        println!(
            "  final score {} ({}x speed, {} sound cues)",
            score,
            speed_tier(score),
            cues.len()
        );
    }

    let highscores = highscores.borrow();
    println!("\nBest this session: {}", highscores.top_score().unwrap_or(0));
    for (i, entry) in highscores.entries.iter().enumerate() {
        println!("  #{} {} ({}x) at {}ms", i + 1, entry.score, entry.tier, entry.timestamp);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build drives RoundEngine from the page, this is just to satisfy the compiler
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_from_env() {
        assert_eq!(rounds_from(None), DEFAULT_ROUNDS);
        assert_eq!(rounds_from(Some(7)), 7);
        assert_eq!(rounds_from(Some(u64::from(u32::MAX) + 1)), u32::MAX);
    }

    #[test]
    fn test_reaction_delay_bounds() {
        let mut player = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            let delay = reaction_delay(&mut player, 400);
            assert!((200..=1000).contains(&delay));
        }
        // Huge reaction times saturate instead of overflowing
        let delay = reaction_delay(&mut player, u64::MAX);
        assert!(delay >= u64::MAX / 2);
    }

    #[test]
    fn test_demo_round_ends() {
        let mut engine = RoundEngine::new(Tuning::default(), 5);
        let mut player = Pcg32::seed_from_u64(5);
        play_round(&mut engine, &mut player, u64::MAX);
        assert_eq!(engine.phase(), RoundPhase::GameOver);
        assert_eq!(engine.final_score(), Some(0));
    }
}
