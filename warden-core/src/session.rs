//! Per-player rolling state for the detectors.
//!
//! Exactly one [`PlayerSession`] exists per connected, validated player,
//! created on join and dropped on disconnect. All fields live behind a
//! single `Mutex` per player: packets for one player arrive in order on one
//! worker at a time, so the lock is uncontended and only guards against the
//! host's join/quit path.

use crate::error::CheckError;
use crate::violation::ViolationScore;
use crate::world::Hitbox;
use glam::DVec3;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;
use warden_protocol::VersionBand;

/// Movement categories tracked with independent timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementCategory {
    /// Horizontal (XZ-plane) movement.
    Horizontal,
    /// Vertical (Y-axis) movement.
    Vertical,
}

/// Rolling accumulator for the angle-burst detector.
///
/// Tracks the summed absolute rotation change across one activity window
/// (e.g. a run of rapid block placements).
#[derive(Debug, Clone, Copy)]
pub struct AngleWindow {
    /// Sum of absolute yaw+pitch deltas since the window started.
    pub sum: f32,
    /// Rotation at the previous sample in this window.
    pub last_rotation: Option<(f32, f32)>,
    /// When the previous sample was taken; a long gap starts a new window.
    pub last_sample: Option<Instant>,
}

impl AngleWindow {
    const fn new() -> Self {
        Self {
            sum: 0.0,
            last_rotation: None,
            last_sample: None,
        }
    }

    /// Discards the window entirely (accumulator and reference rotation).
    pub const fn restart(&mut self) {
        self.sum = 0.0;
        self.last_rotation = None;
        self.last_sample = None;
    }
}

/// All rolling anti-cheat state for one connected player.
pub struct PlayerSession {
    /// Display name, used in evidence messages.
    pub name: String,
    /// The client's negotiated protocol generation, once known.
    pub client_band: Option<VersionBand>,
    /// Last position the player is known to occupy, fed from
    /// position-carrying packets. Spatial queries for rotation-only packets
    /// fall back to this.
    pub position: DVec3,
    /// Yaw of the previous rotation-carrying packet.
    ///
    /// Starts as NaN so the first packet can never compare equal.
    pub last_yaw: f32,
    /// Pitch of the previous rotation-carrying packet.
    pub last_pitch: f32,
    /// Most recent movement per category.
    pub last_movement: FxHashMap<MovementCategory, Instant>,
    /// Most recent server-initiated teleport.
    pub last_teleport: Option<Instant>,
    /// One-shot flag: the next otherwise-flaggable equal rotation was
    /// already explained (e.g. by a cancelled packet) and must not count.
    pub equal_rotation_expected: bool,
    /// Angle-burst accumulator.
    pub angle_window: AngleWindow,
    /// Decaying violation score.
    pub violation: ViolationScore,
    /// Collision volume used for liquid/material intersection tests.
    pub hitbox: Hitbox,
}

impl PlayerSession {
    fn new() -> Self {
        Self {
            name: String::new(),
            client_band: None,
            position: DVec3::ZERO,
            last_yaw: f32::NAN,
            last_pitch: f32::NAN,
            last_movement: FxHashMap::default(),
            last_teleport: None,
            equal_rotation_expected: false,
            angle_window: AngleWindow::new(),
            violation: ViolationScore::new(),
            hitbox: Hitbox::PLAYER,
        }
    }

    /// Whether the player moved in `category` within the last `window`.
    #[must_use]
    pub fn has_moved_recently(&self, category: MovementCategory, window: Duration) -> bool {
        self.last_movement
            .get(&category)
            .is_some_and(|at| at.elapsed() <= window)
    }

    /// Whether the player was teleported within the last `window`.
    #[must_use]
    pub fn has_teleported_recently(&self, window: Duration) -> bool {
        self.last_teleport.is_some_and(|at| at.elapsed() <= window)
    }
}

/// Owns every [`PlayerSession`].
///
/// Sessions are addressed by player id; no operation on one player's session
/// ever blocks on another player's.
#[derive(Default)]
pub struct SessionStore {
    sessions: scc::HashMap<Uuid, Arc<Mutex<PlayerSession>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `player_id`, creating it on first access.
    /// Idempotent: repeated calls return the same session.
    pub fn session_for(&self, player_id: Uuid) -> Arc<Mutex<PlayerSession>> {
        self.sessions
            .entry(player_id)
            .or_insert_with(|| Arc::new(Mutex::new(PlayerSession::new())))
            .get()
            .clone()
    }

    /// Returns the session for `player_id`, or [`CheckError::InvalidPlayerState`]
    /// if the player is unknown (disconnected mid-stream, never validated).
    pub fn existing(&self, player_id: Uuid) -> Result<Arc<Mutex<PlayerSession>>, CheckError> {
        self.sessions
            .read(&player_id, |_, session| session.clone())
            .ok_or(CheckError::InvalidPlayerState(player_id))
    }

    /// Removes the session. Returns `true` if one existed.
    pub fn drop_session(&self, player_id: Uuid) -> bool {
        self.sessions.remove(&player_id).is_some()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Records a movement timestamp. No-op for unknown players: movement
    /// events race with disconnects and losing one is harmless.
    pub fn record_movement(&self, player_id: Uuid, category: MovementCategory, at: Instant) {
        self.sessions.read(&player_id, |_, session| {
            session.lock().last_movement.insert(category, at);
        });
    }

    /// Whether the player moved in `category` within the last `window`.
    /// Unknown players have never moved.
    #[must_use]
    pub fn has_moved_recently(
        &self,
        player_id: Uuid,
        category: MovementCategory,
        window: Duration,
    ) -> bool {
        self.sessions
            .read(&player_id, |_, session| {
                session.lock().has_moved_recently(category, window)
            })
            .unwrap_or(false)
    }

    /// Records a server-initiated teleport. No-op for unknown players.
    pub fn record_teleport(&self, player_id: Uuid, at: Instant) {
        self.sessions.read(&player_id, |_, session| {
            session.lock().last_teleport = Some(at);
        });
    }

    /// Whether the player was teleported within the last `window`.
    #[must_use]
    pub fn has_teleported_recently(&self, player_id: Uuid, window: Duration) -> bool {
        self.sessions
            .read(&player_id, |_, session| {
                session.lock().has_teleported_recently(window)
            })
            .unwrap_or(false)
    }

    /// Overwrites the last known position. No-op for unknown players.
    pub fn update_position(&self, player_id: Uuid, position: DVec3) {
        self.sessions.read(&player_id, |_, session| {
            session.lock().position = position;
        });
    }

    /// Overwrites the stored last rotation. No-op for unknown players.
    pub fn update_last_rotation(&self, player_id: Uuid, yaw: f32, pitch: f32) {
        self.sessions.read(&player_id, |_, session| {
            let mut session = session.lock();
            session.last_yaw = yaw;
            session.last_pitch = pitch;
        });
    }

    /// Visits every live session. Used by the violation decay sweep.
    pub fn for_each(&self, mut f: impl FnMut(Uuid, &Mutex<PlayerSession>)) {
        self.sessions.scan(|id, session| f(*id, session.as_ref()));
    }
}
