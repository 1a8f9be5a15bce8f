//! The engine facade the host server talks to.
//!
//! Everything is constructed once at startup and wired by explicit
//! dependency injection; there are no ambient singletons. This is also the
//! detector boundary from the error-handling design: every failure below is
//! converted and logged here, and nothing propagates into the
//! packet-interception layer, where an escaped error would abort delivery
//! for all subsequent packets.

use crate::checks::{AngleBurstCheck, DetectionEvent, EqualRotationCheck};
use crate::config::WardenConfig;
use crate::error::CheckError;
use crate::session::{MovementCategory, SessionStore};
use crate::violation::{ViolationSink, ViolationTracker};
use crate::world::{EnvironmentResolver, MainThreadGate};
use glam::DVec3;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;
use warden_protocol::{RotationUpdate, UnsupportedVersionError, VersionBand};

/// The packet-analysis engine.
pub struct Warden {
    sessions: Arc<SessionStore>,
    equal_rotation: EqualRotationCheck,
    angle_burst: AngleBurstCheck,
    tracker: Option<Arc<ViolationTracker>>,
    server_band: VersionBand,
}

impl Warden {
    /// Creates an engine with the built-in violation tracker.
    ///
    /// `server_protocol` is the server's own protocol generation; refusing
    /// to start on an unclassifiable generation beats guessing the wrong
    /// material tables.
    pub fn new(
        config: WardenConfig,
        server_protocol: i32,
        gate: MainThreadGate,
    ) -> Result<Self, UnsupportedVersionError> {
        let sessions = Arc::new(SessionStore::new());
        let tracker = Arc::new(ViolationTracker::new(
            sessions.clone(),
            config.violations.threshold,
            config.violations.decay_amount,
            config.violations.decay_interval(),
        ));
        let mut engine = Self::with_sink(config, server_protocol, gate, sessions, tracker.clone())?;
        engine.tracker = Some(tracker);
        Ok(engine)
    }

    /// Creates an engine that reports into a host-provided sink instead of
    /// the built-in tracker.
    pub fn with_sink(
        config: WardenConfig,
        server_protocol: i32,
        gate: MainThreadGate,
        sessions: Arc<SessionStore>,
        sink: Arc<dyn ViolationSink>,
    ) -> Result<Self, UnsupportedVersionError> {
        let server_band = VersionBand::from_protocol(server_protocol)?;
        log::info!(
            "Packet analysis running with the {} material tables",
            server_band.name()
        );

        let resolver = EnvironmentResolver::new(gate, server_band);
        let equal_rotation = EqualRotationCheck::new(
            sessions.clone(),
            resolver,
            sink.clone(),
            config.equal_rotation,
        );
        let angle_burst = AngleBurstCheck::new(sessions.clone(), sink, config.angle_burst);

        Ok(Self {
            sessions,
            equal_rotation,
            angle_burst,
            tracker: None,
            server_band,
        })
    }

    /// The band the server itself runs.
    #[must_use]
    pub const fn server_band(&self) -> VersionBand {
        self.server_band
    }

    /// The session store, for host glue that records movement itself.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// The angle-burst detector, for runtime enable/disable.
    #[must_use]
    pub const fn angle_burst(&self) -> &AngleBurstCheck {
        &self.angle_burst
    }

    /// Registers a validated player.
    ///
    /// `client_protocol` is the negotiated client generation when the proxy
    /// reports one; `None` means the client matches the server. An
    /// unclassifiable client generation is an error the caller should
    /// surface at join time.
    pub fn player_join(
        &self,
        player_id: Uuid,
        name: &str,
        client_protocol: Option<i32>,
    ) -> Result<(), UnsupportedVersionError> {
        let client_band = client_protocol.map(VersionBand::from_protocol).transpose()?;

        let session = self.sessions.session_for(player_id);
        let mut session = session.lock();
        session.name = name.to_string();
        session.client_band = client_band;
        Ok(())
    }

    /// Drops a disconnected player's session.
    pub fn player_quit(&self, player_id: Uuid) {
        self.sessions.drop_session(player_id);
    }

    /// Records host-observed movement for the grace-window bookkeeping.
    pub fn record_movement(&self, player_id: Uuid, category: MovementCategory) {
        self.sessions
            .record_movement(player_id, category, Instant::now());
    }

    /// Records a server-initiated teleport; equal rotations are expected
    /// while the client snaps to the new position.
    pub fn record_teleport(&self, player_id: Uuid) {
        self.sessions.record_teleport(player_id, Instant::now());
    }

    /// Updates the last known position from outside the packet path
    /// (teleport destinations, world changes).
    pub fn update_position(&self, player_id: Uuid, position: DVec3) {
        self.sessions.update_position(player_id, position);
    }

    /// Marks the next otherwise-flaggable equal rotation as explained
    /// (e.g. the host cancelled a packet and the client will echo its
    /// rotation). Consumed by exactly one occurrence.
    pub fn expect_equal_rotation(&self, player_id: Uuid) {
        if let Ok(session) = self.sessions.existing(player_id) {
            session.lock().equal_rotation_expected = true;
        }
    }

    /// Handles one rotation-carrying movement packet on a worker context.
    ///
    /// Returns the detection event for observability; errors never escape.
    pub async fn handle_rotation(
        &self,
        player_id: Uuid,
        update: RotationUpdate,
    ) -> Option<DetectionEvent> {
        let outcome = self.equal_rotation.on_rotation(player_id, &update).await;

        // Rolling updates happen after evaluation so the detector compared
        // against the state the previous packet left behind.
        self.apply_movement(player_id, &update);

        match outcome {
            Ok(event) => event,
            Err(error) => {
                self.note_dropped(player_id, "equal_rotation", &error);
                None
            }
        }
    }

    /// Handles a block placement (angle-burst activity sample).
    pub fn handle_block_place(
        &self,
        player_id: Uuid,
        yaw: f32,
        pitch: f32,
    ) -> Option<DetectionEvent> {
        match self.angle_burst.on_activity(player_id, yaw, pitch) {
            Ok(event) => event,
            Err(error) => {
                self.note_dropped(player_id, "angle_burst", &error);
                None
            }
        }
    }

    /// Applies the decaying violation score sweep. Only meaningful when the
    /// engine owns the built-in tracker; call it from a periodic host task.
    pub fn decay_violations(&self) {
        if let Some(tracker) = &self.tracker {
            tracker.decay_all();
        }
    }

    /// Current violation score, zero when a host sink owns the scoring.
    #[must_use]
    pub fn violation_score(&self, player_id: Uuid) -> f64 {
        self.tracker
            .as_ref()
            .map_or(0.0, |tracker| tracker.score(player_id))
    }

    /// Feeds position-derived state from a position-carrying packet.
    #[expect(clippy::float_cmp, reason = "any bit change in a coordinate counts as movement")]
    fn apply_movement(&self, player_id: Uuid, update: &RotationUpdate) {
        let Some(position) = update.position() else {
            return;
        };
        let Ok(session) = self.sessions.existing(player_id) else {
            return;
        };

        let mut session = session.lock();
        let previous = session.position;
        let now = Instant::now();
        if position.x != previous.x || position.z != previous.z {
            session
                .last_movement
                .insert(MovementCategory::Horizontal, now);
        }
        if position.y != previous.y {
            session.last_movement.insert(MovementCategory::Vertical, now);
        }
        session.position = position;
    }

    /// One packet skipped for one player; everyone else is unaffected.
    fn note_dropped(&self, player_id: Uuid, check: &str, error: &CheckError) {
        if error.is_indeterminate() {
            // Already warned (rate limited) at the detector.
            return;
        }
        log::debug!("Skipped {check} evaluation for {player_id}: {error}");
    }
}
