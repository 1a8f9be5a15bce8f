//! Flags look/position-look packets whose rotation is bit-identical to the
//! previous one.
//!
//! A vanilla client that is actually turning always perturbs yaw/pitch by a
//! sub-epsilon amount, so *exact* floating equality across consecutive
//! packets is itself the signal. The work here is ruling out every
//! legitimate way to repeat a rotation: standing still, teleport snapping,
//! vehicles, and the world-geometry cases the resolver covers.

use crate::checks::{DetectionEvent, DetectorId};
use crate::config::EqualRotationConfig;
use crate::error::CheckError;
use crate::session::{MovementCategory, SessionStore};
use crate::throttle::Throttle;
use crate::violation::ViolationSink;
use crate::world::{EnvironmentResolver, WorldVerdict};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;
use warden_protocol::RotationUpdate;

/// Score increment for one equal-rotation occurrence. Weak evidence on its
/// own; the decaying score needs a stream of them to escalate.
const SEVERITY: u32 = 1;

/// The equal-rotation detector.
pub struct EqualRotationCheck {
    sessions: Arc<SessionStore>,
    resolver: EnvironmentResolver,
    sink: Arc<dyn ViolationSink>,
    config: EqualRotationConfig,
    timeout_warning: Throttle,
    consecutive_timeouts: AtomicU32,
}

impl EqualRotationCheck {
    /// Creates the detector.
    pub fn new(
        sessions: Arc<SessionStore>,
        resolver: EnvironmentResolver,
        sink: Arc<dyn ViolationSink>,
        config: EqualRotationConfig,
    ) -> Self {
        let timeout_warning = Throttle::new(config.timeout_warning_interval());
        Self {
            sessions,
            resolver,
            sink,
            config,
            timeout_warning,
            consecutive_timeouts: AtomicU32::new(0),
        }
    }

    /// How many world queries in a row have timed out. Resets to zero on
    /// the first query that answers.
    #[must_use]
    pub fn consecutive_timeouts(&self) -> u32 {
        self.consecutive_timeouts.load(Ordering::Relaxed)
    }

    /// Evaluates one rotation-carrying packet.
    ///
    /// Returns `Ok(None)` when nothing suspicious happened, `Ok(Some(event))`
    /// for a detection (scored unless `suppressed_reason` is set), and an
    /// error when the evaluation could not complete. The session's rolling
    /// last rotation is updated in every case, including errors, so the
    /// detector always tracks the true packet sequence.
    #[expect(clippy::float_cmp, reason = "exact equality is the detection signal")]
    pub async fn on_rotation(
        &self,
        player_id: Uuid,
        update: &RotationUpdate,
    ) -> Result<Option<DetectionEvent>, CheckError> {
        let session = self.sessions.existing(player_id)?;

        let (was_equal, exempt, name, client_band, hitbox, position) = {
            let mut session = session.lock();
            let was_equal =
                update.yaw() == session.last_yaw && update.pitch() == session.last_pitch;

            // Legitimate stillness/transition conditions, not cheating:
            // teleport snap-back, or no horizontal movement at all.
            let exempt = session.has_teleported_recently(self.config.teleport_grace())
                || !session.has_moved_recently(
                    MovementCategory::Horizontal,
                    self.config.movement_window(),
                );

            let name = session.name.clone();
            let client_band = session.client_band;
            let hitbox = session.hitbox;
            let position = update.position().unwrap_or(session.position);

            session.last_yaw = update.yaw();
            session.last_pitch = update.pitch();

            (was_equal, exempt, name, client_band, hitbox, position)
        };

        if !self.config.enabled || !was_equal || exempt {
            return Ok(None);
        }

        let verdict = match self
            .resolver
            .resolve(
                player_id,
                position,
                hitbox,
                client_band,
                self.config.world_query_timeout(),
            )
            .await
        {
            Ok(verdict) => {
                self.consecutive_timeouts.store(0, Ordering::Relaxed);
                verdict
            }
            Err(error) => {
                self.note_query_failure(&error);
                return Err(error);
            }
        };

        match verdict {
            WorldVerdict::VehicleExempt => Ok(None),
            WorldVerdict::Suppressed => Ok(Some(DetectionEvent {
                player_id,
                detector: DetectorId::EqualRotation,
                severity_delta: 0,
                suppressed_reason: Some("world geometry"),
                evidence: format!("Player: {name} sent equal rotations"),
            })),
            WorldVerdict::NotSuppressed => {
                let session = self.sessions.existing(player_id)?;
                let expected = {
                    let mut session = session.lock();
                    let expected = session.equal_rotation_expected;
                    // One-shot: consumes exactly one flaggable occurrence.
                    session.equal_rotation_expected = false;
                    expected
                };
                if expected {
                    return Ok(Some(DetectionEvent {
                        player_id,
                        detector: DetectorId::EqualRotation,
                        severity_delta: 0,
                        suppressed_reason: Some("expected equal rotation"),
                        evidence: format!("Player: {name} sent equal rotations"),
                    }));
                }

                let event = DetectionEvent {
                    player_id,
                    detector: DetectorId::EqualRotation,
                    severity_delta: SEVERITY,
                    suppressed_reason: None,
                    evidence: format!("Player: {name} sent equal rotations"),
                };
                self.sink.flag(&event, &mut || {}, &mut || {
                    log::debug!("Packet-Analysis | {}", event.evidence);
                });
                Ok(Some(event))
            }
        }
    }

    /// Logs a dropped evaluation, rate limited, and escalates once per
    /// timeout streak when coverage is degrading.
    fn note_query_failure(&self, error: &CheckError) {
        match error {
            CheckError::WorldQueryTimedOut(deadline) => {
                let streak = self.consecutive_timeouts.fetch_add(1, Ordering::Relaxed) + 1;
                if self.timeout_warning.allow() {
                    log::warn!(
                        "Discarded an equal-rotation evaluation: world query missed its \
                         {deadline:?} deadline. The main context is overloaded."
                    );
                }
                if self.config.degraded_after_timeouts > 0
                    && streak == self.config.degraded_after_timeouts
                {
                    tracing::warn!(
                        consecutive_timeouts = streak,
                        "Equal-rotation coverage degraded: every recent world query timed out"
                    );
                }
            }
            CheckError::WorldQueryFailed(reason) => {
                log::error!("Unable to complete the equal-rotation calculation: {reason}");
            }
            CheckError::UnsupportedVersion(_) | CheckError::InvalidPlayerState(_) => {}
        }
    }
}
