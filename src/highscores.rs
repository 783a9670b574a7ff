//! High score leaderboard
//!
//! Kept for the lifetime of the session only, tracks the top 10 final scores.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, RoundObserver};
use crate::speed_tier;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    /// Speed multiplier reached
    pub tier: u32,
    /// Engine clock (ms) when the round ended
    pub timestamp: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Rounds finished this session, qualifying or not
    pub rounds_played: u32,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u32, timestamp: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            tier: speed_tier(score),
            timestamp,
        };

        // Sorted descending by score, ties keep the earlier entry first
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

impl RoundObserver for HighScores {
    fn on_event(&mut self, event: &GameEvent, now_ms: u64) {
        if let GameEvent::RoundEnded { final_score } = *event {
            self.rounds_played += 1;
            if let Some(rank) = self.add_score(final_score, now_ms) {
                log::info!("New high score #{}: {}", rank, final_score);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_ordering_and_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(5, 100), Some(1));
        assert_eq!(scores.add_score(9, 200), Some(1));
        assert_eq!(scores.add_score(7, 300), Some(2));
        assert_eq!(scores.add_score(5, 400), Some(4));
        let ordered: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![9, 7, 5, 5]);
        assert_eq!(scores.top_score(), Some(9));
        assert_eq!(scores.entries[0].tier, 2);
    }

    #[test]
    fn test_truncates_to_max() {
        let mut scores = HighScores::new();
        for s in 1..=15 {
            scores.add_score(s, s as u64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(15));
        assert!(!scores.qualifies(6));
        assert_eq!(scores.potential_rank(16), Some(1));
        assert_eq!(scores.potential_rank(3), None);
    }

    #[test]
    fn test_records_round_end() {
        let mut scores = HighScores::new();
        scores.on_event(&GameEvent::RoundEnded { final_score: 0 }, 10);
        scores.on_event(&GameEvent::RoundEnded { final_score: 4 }, 20);
        scores.on_event(&GameEvent::RoundStarted, 30);
        assert_eq!(scores.rounds_played, 2);
        assert_eq!(scores.entries.len(), 1);
        assert_eq!(scores.entries[0].timestamp, 20);
    }
}
