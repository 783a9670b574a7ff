//! Collaborator hooks
//!
//! Monetization, audio and leaderboards hang off these notifications. The
//! engine never learns anything back from them.

use super::state::{FailureReason, GameEvent};

pub trait RoundObserver {
    fn on_round_started(&mut self) {}

    fn on_round_ended(&mut self, _final_score: u32) {}

    fn on_success(&mut self, _score: u32) {}

    fn on_failure(&mut self, _reason: FailureReason) {}

    /// Every event, including the ones above
    fn on_event(&mut self, _event: &GameEvent, _now_ms: u64) {}
}

/// Route one event to the matching hook
pub(crate) fn dispatch(observer: &mut dyn RoundObserver, event: &GameEvent, now_ms: u64) {
    match *event {
        GameEvent::RoundStarted => observer.on_round_started(),
        GameEvent::RoundEnded { final_score } => observer.on_round_ended(final_score),
        GameEvent::Success { score } => observer.on_success(score),
        GameEvent::Failure { reason } => observer.on_failure(reason),
        _ => {}
    }
    observer.on_event(event, now_ms);
}
