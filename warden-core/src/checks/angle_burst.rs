//! Flags cumulative rotation bursts during rapid block placement.
//!
//! Legit bridging sweeps the crosshair smoothly; scaffold cheats snap it
//! between placement targets, producing large summed angle changes inside a
//! short activity window.

use crate::checks::{DetectionEvent, DetectorId};
use crate::config::AngleBurstConfig;
use crate::error::CheckError;
use crate::math::angle_distance;
use crate::session::SessionStore;
use crate::violation::ViolationSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use uuid::Uuid;

/// Score increment for one burst. Stronger evidence than an equal rotation.
const SEVERITY: u32 = 2;

/// The angle-burst detector.
///
/// Toggled as a unit: when disabled it still accepts every call and is a
/// guaranteed no-op, so call sites stay branch-free.
pub struct AngleBurstCheck {
    sessions: Arc<SessionStore>,
    sink: Arc<dyn ViolationSink>,
    config: AngleBurstConfig,
    enabled: AtomicBool,
}

impl AngleBurstCheck {
    /// Creates the detector; starts enabled per the config.
    pub fn new(
        sessions: Arc<SessionStore>,
        sink: Arc<dyn ViolationSink>,
        config: AngleBurstConfig,
    ) -> Self {
        let enabled = AtomicBool::new(config.enabled);
        Self {
            sessions,
            sink,
            config,
            enabled,
        }
    }

    /// Enables or disables the detector at runtime.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether the detector is currently live.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Feeds one activity sample (the player's rotation at a block
    /// placement) and evaluates the accumulated sum.
    ///
    /// The first sample of a window only establishes the reference rotation.
    /// A sum strictly greater than the threshold flags and resets the
    /// accumulator.
    pub fn on_activity(
        &self,
        player_id: Uuid,
        yaw: f32,
        pitch: f32,
    ) -> Result<Option<DetectionEvent>, CheckError> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let session = self.sessions.existing(player_id)?;
        let now = Instant::now();

        let (flagged, name) = {
            let mut session = session.lock();
            let window = &mut session.angle_window;

            let stale = window
                .last_sample
                .is_some_and(|at| now.duration_since(at) > self.config.window());
            if stale {
                window.restart();
            }

            if let Some((last_yaw, last_pitch)) = window.last_rotation {
                window.sum += angle_distance(last_yaw, yaw) + angle_distance(last_pitch, pitch);
            }
            window.last_rotation = Some((yaw, pitch));
            window.last_sample = Some(now);

            let flagged = window.sum > self.config.angle_sum_threshold;
            if flagged {
                window.sum = 0.0;
            }
            (flagged, session.name.clone())
        };

        if !flagged {
            return Ok(None);
        }

        let event = DetectionEvent {
            player_id,
            detector: DetectorId::AngleBurst,
            severity_delta: SEVERITY,
            suppressed_reason: None,
            evidence: format!("Player: {name} sent suspicious rotations while placing blocks"),
        };
        self.sink.flag(&event, &mut || {}, &mut || {
            log::debug!("Scaffold | {}", event.evidence);
        });
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::ViolationTracker;
    use std::time::Duration;

    fn check() -> (AngleBurstCheck, Uuid) {
        let sessions = Arc::new(SessionStore::new());
        let player = Uuid::from_u128(7);
        sessions.session_for(player);
        let sink = Arc::new(ViolationTracker::new(
            sessions.clone(),
            100.0,
            1.0,
            Duration::from_secs(30),
        ));
        (
            AngleBurstCheck::new(sessions, sink, AngleBurstConfig::default()),
            player,
        )
    }

    #[test]
    fn sum_of_exactly_the_threshold_does_not_flag() {
        let (check, player) = check();
        assert!(check.on_activity(player, 0.0, 0.0).expect("ok").is_none());
        // 7.0 total: 4.0 of yaw, 3.0 of pitch.
        assert!(check.on_activity(player, 4.0, 0.0).expect("ok").is_none());
        assert!(check.on_activity(player, 4.0, 3.0).expect("ok").is_none());
    }

    #[test]
    fn sum_above_the_threshold_flags_severity_two_and_resets() {
        let (check, player) = check();
        assert!(check.on_activity(player, 0.0, 0.0).expect("ok").is_none());
        let event = check
            .on_activity(player, 7.01, 0.0)
            .expect("ok")
            .expect("should flag");
        assert_eq!(event.severity_delta, 2);
        assert_eq!(event.detector, DetectorId::AngleBurst);
        assert!(event.is_scored());

        // Accumulator reset: the next small delta starts from zero.
        assert!(check.on_activity(player, 8.0, 0.0).expect("ok").is_none());
    }

    #[test]
    fn first_sample_only_establishes_the_reference() {
        let (check, player) = check();
        // A huge absolute rotation with no predecessor is not a delta.
        assert!(check.on_activity(player, 179.0, 80.0).expect("ok").is_none());
    }

    #[test]
    fn yaw_deltas_wrap_around_360() {
        let (check, player) = check();
        assert!(check.on_activity(player, 359.0, 0.0).expect("ok").is_none());
        // 359 -> 3 is a 4 degree turn, not 356: must not flag.
        assert!(check.on_activity(player, 3.0, 0.0).expect("ok").is_none());
    }

    #[test]
    fn disabled_detector_is_a_noop_that_still_accepts_calls() {
        let (check, player) = check();
        check.set_enabled(false);
        assert!(check.on_activity(player, 0.0, 0.0).expect("ok").is_none());
        assert!(check.on_activity(player, 90.0, 45.0).expect("ok").is_none());
        assert!(!check.is_enabled());

        // Re-enabling starts clean.
        check.set_enabled(true);
        assert!(check.on_activity(player, 0.0, 0.0).expect("ok").is_none());
    }

    #[test]
    fn unknown_player_is_invalid_state() {
        let (check, _) = check();
        assert!(matches!(
            check.on_activity(Uuid::from_u128(9999), 0.0, 0.0),
            Err(CheckError::InvalidPlayerState(_))
        ));
    }
}
