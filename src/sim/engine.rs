//! Round engine
//!
//! Timer-driven state machine. All mutation happens in exactly one of three
//! places: [`RoundEngine::start`], [`RoundEngine::tap`], or a timer firing
//! inside [`RoundEngine::advance_to`]. Time is a virtual millisecond clock
//! driven by the caller, so a round replays identically for a given seed and
//! input schedule.

use std::cell::RefCell;
use std::rc::Rc;

use rand_pcg::Pcg32;

use super::observer::{RoundObserver, dispatch};
use super::state::{
    CircleColor, FailureReason, GameEvent, RngState, Round, RoundPhase, RoundSnapshot,
};
use super::timer::{Fired, TimerHandle, TimerKind, TimerQueue};
use crate::tuning::Tuning;

/// Owns the round, its timers and the virtual clock
pub struct RoundEngine {
    tuning: Tuning,
    round: Round,
    timers: TimerQueue,
    rng: Pcg32,
    now_ms: u64,
    events: Vec<GameEvent>,
    observers: Vec<Rc<RefCell<dyn RoundObserver>>>,
}

impl RoundEngine {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            round: Round::new(&tuning),
            tuning,
            timers: TimerQueue::new(),
            rng: RngState::new(seed).to_rng(),
            now_ms: 0,
            events: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Register a collaborator for round notifications
    pub fn subscribe(&mut self, observer: Rc<RefCell<dyn RoundObserver>>) {
        self.observers.push(observer);
    }

    // === Commands ===

    /// Start a fresh round. Always resets, whatever the current phase.
    /// Undrained events from the previous round are discarded.
    pub fn start(&mut self) {
        // Nothing from the previous round may outlive the reset
        self.timers.clear();
        self.events.clear();

        let color = CircleColor::random_decoy(&mut self.rng);
        self.round.reset(&self.tuning, color);
        let epoch = self.round.epoch;
        self.round.timers.advance =
            Some(self.schedule(self.round.interval_ms, TimerKind::ColorAdvance));

        log::info!("Round {} started at {}ms", epoch, self.now_ms);
        self.emit(GameEvent::RoundStarted);
        self.emit(GameEvent::ColorChanged { color });
    }

    /// Player tapped the circle
    pub fn tap(&mut self) {
        if self.round.phase != RoundPhase::Playing {
            log::trace!("Tap ignored in {:?}", self.round.phase);
            return;
        }

        if self.round.accepts_tap() {
            self.score_tap();
        } else {
            log::debug!("Wrong tap on {} at {}ms", self.round.color.as_str(), self.now_ms);
            self.end_round(FailureReason::WrongTap);
        }
    }

    // === Clock ===

    /// Move the clock forward, firing every timer that comes due on the way
    pub fn advance_to(&mut self, now_ms: u64) {
        if now_ms < self.now_ms {
            log::trace!("Clock cannot go back ({}ms < {}ms)", now_ms, self.now_ms);
            return;
        }
        while let Some(fired) = self.timers.pop_due(now_ms) {
            self.now_ms = fired.due_ms;
            self.on_timer(fired);
        }
        self.now_ms = now_ms;
    }

    pub fn advance_by(&mut self, ms: u64) {
        self.advance_to(self.now_ms.saturating_add(ms));
    }

    /// Jump straight to the next pending timer and fire it.
    /// Returns the new clock time, or None if nothing is scheduled.
    pub fn advance_to_next_timer(&mut self) -> Option<u64> {
        let due = self.timers.next_due()?;
        self.advance_to(due);
        Some(due)
    }

    // === Queries ===

    pub fn snapshot(&self) -> RoundSnapshot {
        self.round.snapshot(self.now_ms)
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn score(&self) -> u32 {
        self.round.score
    }

    pub fn final_score(&self) -> Option<u32> {
        self.round.final_score
    }

    pub fn color(&self) -> CircleColor {
        self.round.color
    }

    pub fn interval_ms(&self) -> u64 {
        self.round.interval_ms
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// When the current target phase began (None outside a target phase)
    pub fn target_shown_at(&self) -> Option<u64> {
        self.round.target_shown_at
    }

    pub fn next_timer_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Events emitted since the last drain (or the last start)
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Transitions ===

    fn score_tap(&mut self) {
        // The deadline goes first so a success and a timeout can never both
        // land on the same target phase
        self.cancel_slot(TimerKind::TargetDeadline);
        self.cancel_slot(TimerKind::GraceClear);
        self.round.grace_active = false;
        self.round.target_shown_at = None;

        self.round.score += 1;
        let score = self.round.score;
        log::debug!("Target hit at {}ms, score {}", self.now_ms, score);
        self.emit(GameEvent::Success { score });

        if self.tuning.is_step_score(score) {
            let next = self.tuning.next_interval(self.round.interval_ms);
            if next < self.round.interval_ms {
                self.round.interval_ms = next;
                log::debug!("Speed up: interval now {}ms", next);
                self.emit(GameEvent::SpeedUp { interval_ms: next });
            }
        }

        // Hold a decoy on screen for the pause, then resume cycling
        self.round.cycle_count = 0;
        self.round.paused = true;
        self.cancel_slot(TimerKind::ColorAdvance);
        let color = CircleColor::random_decoy(&mut self.rng);
        self.round.color = color;
        self.round.timers.advance =
            Some(self.schedule(self.tuning.score_pause_ms, TimerKind::Resume));
        self.emit(GameEvent::ColorChanged { color });
    }

    fn end_round(&mut self, reason: FailureReason) {
        self.cancel_slot(TimerKind::TargetDeadline);
        self.cancel_slot(TimerKind::GraceClear);
        self.cancel_slot(TimerKind::ColorAdvance);

        let round = &mut self.round;
        round.phase = RoundPhase::GameOver;
        round.final_score = Some(round.score);
        round.grace_active = false;
        round.paused = false;
        round.cycle_count = 0;
        round.target_shown_at = None;
        let final_score = round.score;

        log::info!("Round {} over ({:?}), final score {}", round.epoch, reason, final_score);
        self.emit(GameEvent::Failure { reason });
        self.emit(GameEvent::RoundEnded { final_score });
    }

    fn on_timer(&mut self, fired: Fired) {
        if fired.epoch != self.round.epoch || self.round.phase != RoundPhase::Playing {
            log::trace!("Stale {:?} timer from round {} ignored", fired.kind, fired.epoch);
            return;
        }
        let slot = self.slot_mut(fired.kind);
        if *slot != Some(fired.handle) {
            log::trace!("Superseded {:?} timer ignored", fired.kind);
            return;
        }
        *slot = None;

        match fired.kind {
            TimerKind::ColorAdvance => self.advance_color(),
            TimerKind::Resume => {
                self.round.paused = false;
                let color = CircleColor::random_decoy(&mut self.rng);
                self.round.color = color;
                self.round.timers.advance =
                    Some(self.schedule(self.round.interval_ms, TimerKind::ColorAdvance));
                self.emit(GameEvent::ColorChanged { color });
            }
            TimerKind::TargetDeadline => {
                log::debug!("Target missed at {}ms", self.now_ms);
                self.end_round(FailureReason::Timeout);
            }
            TimerKind::GraceClear => {
                self.round.grace_active = false;
            }
        }
    }

    fn advance_color(&mut self) {
        if self.round.cycle_count < self.tuning.cycles_before_target {
            self.round.cycle_count += 1;
            let color = CircleColor::random_decoy(&mut self.rng);
            self.round.color = color;
            self.round.timers.advance =
                Some(self.schedule(self.round.interval_ms, TimerKind::ColorAdvance));
            self.emit(GameEvent::ColorChanged { color });
            return;
        }

        // Target phase: no color advance until the player scores
        let deadline = self.tuning.deadline_for(self.round.interval_ms);
        self.round.color = CircleColor::TARGET;
        self.round.cycle_count = 0;
        self.round.grace_active = true;
        self.round.target_shown_at = Some(self.now_ms);
        self.round.timers.grace = Some(self.schedule(self.tuning.grace_ms, TimerKind::GraceClear));
        self.round.timers.deadline = Some(self.schedule(deadline, TimerKind::TargetDeadline));

        log::debug!(
            "Target shown at {}ms, deadline in {}ms (interval {}ms)",
            self.now_ms,
            deadline,
            self.round.interval_ms
        );
        self.emit(GameEvent::ColorChanged {
            color: CircleColor::TARGET,
        });
        self.emit(GameEvent::TargetShown {
            deadline_ms: self.now_ms.saturating_add(deadline),
        });
    }

    // === Helpers ===

    fn schedule(&mut self, delay_ms: u64, kind: TimerKind) -> TimerHandle {
        self.timers
            .schedule(self.now_ms.saturating_add(delay_ms), kind, self.round.epoch)
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        let slots = &mut self.round.timers;
        match kind {
            TimerKind::ColorAdvance | TimerKind::Resume => &mut slots.advance,
            TimerKind::TargetDeadline => &mut slots.deadline,
            TimerKind::GraceClear => &mut slots.grace,
        }
    }

    /// Cancel whatever occupies the slot for `kind` and null it out
    fn cancel_slot(&mut self, kind: TimerKind) {
        if let Some(handle) = self.slot_mut(kind).take() {
            self.timers.cancel(handle);
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
        for observer in &self.observers {
            match observer.try_borrow_mut() {
                Ok(mut observer) => dispatch(&mut *observer, &event, self.now_ms),
                Err(_) => log::warn!("Observer busy, dropped {:?}", event),
            }
        }
    }
}
