//! Violation scoring: the one piece of state every detector writes.
//!
//! Detectors hand surviving [`DetectionEvent`]s to a [`ViolationSink`]; the
//! bundled [`ViolationTracker`] accumulates a per-player decaying score and
//! fires the escalation callback when it crosses the threshold. Hosts with
//! their own punishment pipeline implement the trait instead.

use crate::checks::DetectionEvent;
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A player's accumulated violation score plus its decay bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct ViolationScore {
    /// Current score. Never negative.
    pub score: f64,
    /// When decay was last applied.
    pub last_decay: Instant,
}

impl ViolationScore {
    /// Fresh zero score.
    #[must_use]
    pub fn new() -> Self {
        Self {
            score: 0.0,
            last_decay: Instant::now(),
        }
    }

    /// Applies decay for the time elapsed since the last sweep.
    /// `amount` is subtracted once per full `interval`, floored at zero.
    pub fn decay(&mut self, amount: f64, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        let steps = self.last_decay.elapsed().as_nanos() / interval.as_nanos();
        if steps == 0 {
            return;
        }
        self.score = (self.score - amount * steps as f64).max(0.0);
        self.last_decay += interval * steps as u32;
    }
}

impl Default for ViolationScore {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives surviving detection events and applies graduated responses.
///
/// `on_always` runs unconditionally (observability, verbose logging);
/// `on_flagged` runs only when the player's score crosses the sink's
/// internal threshold.
pub trait ViolationSink: Send + Sync {
    /// Records one detection event for scoring.
    fn flag(&self, event: &DetectionEvent, on_flagged: &mut dyn FnMut(), on_always: &mut dyn FnMut());
}

/// Default sink: decaying per-player score stored in the session.
///
/// The score update is a single locked increment, so concurrent detectors
/// flagging the same player never lose a write.
pub struct ViolationTracker {
    sessions: Arc<SessionStore>,
    threshold: f64,
    decay_amount: f64,
    decay_interval: Duration,
}

impl ViolationTracker {
    /// Creates a tracker over `sessions`. `on_flagged` fires once the score
    /// reaches `threshold`.
    #[must_use]
    pub const fn new(
        sessions: Arc<SessionStore>,
        threshold: f64,
        decay_amount: f64,
        decay_interval: Duration,
    ) -> Self {
        Self {
            sessions,
            threshold,
            decay_amount,
            decay_interval,
        }
    }

    /// Current score for a player, zero if unknown.
    #[must_use]
    pub fn score(&self, player_id: uuid::Uuid) -> f64 {
        self.sessions
            .existing(player_id)
            .map(|session| session.lock().violation.score)
            .unwrap_or(0.0)
    }

    /// Applies decay to every live session. Intended to be driven
    /// periodically by the host scheduler.
    pub fn decay_all(&self) {
        self.sessions.for_each(|_, session| {
            session
                .lock()
                .violation
                .decay(self.decay_amount, self.decay_interval);
        });
    }
}

impl ViolationSink for ViolationTracker {
    fn flag(
        &self,
        event: &DetectionEvent,
        on_flagged: &mut dyn FnMut(),
        on_always: &mut dyn FnMut(),
    ) {
        on_always();

        let Ok(session) = self.sessions.existing(event.player_id) else {
            // Player left between detection and scoring; nothing to record.
            return;
        };

        let crossed = {
            let mut session = session.lock();
            session.violation.score += f64::from(event.severity_delta);
            session.violation.score >= self.threshold
        };
        if crossed {
            on_flagged();
        }
    }
}
