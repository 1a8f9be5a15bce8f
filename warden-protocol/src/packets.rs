//! Serverbound rotation packet values.
//!
//! The transport layer decodes the wire representation; the analysis core
//! only ever sees these typed values.

use glam::DVec3;

/// Serverbound rotation-only movement packet (the client turned its head
/// without moving).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SMovePlayerRot {
    /// Absolute yaw in degrees.
    pub yaw: f32,
    /// Absolute pitch in degrees.
    pub pitch: f32,
    /// Whether the client believes it is on the ground.
    pub on_ground: bool,
}

/// Serverbound combined position + rotation movement packet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SMovePlayerPosRot {
    /// Absolute position.
    pub position: DVec3,
    /// Absolute yaw in degrees.
    pub yaw: f32,
    /// Absolute pitch in degrees.
    pub pitch: f32,
    /// Whether the client believes it is on the ground.
    pub on_ground: bool,
}

/// Distinguishes the two rotation-carrying packet kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationKind {
    /// Rotation only.
    Rot,
    /// Position and rotation.
    PosRot,
}

/// A rotation-carrying movement update, either kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationUpdate {
    /// Rotation only.
    Rot(SMovePlayerRot),
    /// Position and rotation.
    PosRot(SMovePlayerPosRot),
}

impl RotationUpdate {
    /// Absolute yaw in degrees.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        match self {
            Self::Rot(p) => p.yaw,
            Self::PosRot(p) => p.yaw,
        }
    }

    /// Absolute pitch in degrees.
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        match self {
            Self::Rot(p) => p.pitch,
            Self::PosRot(p) => p.pitch,
        }
    }

    /// Which packet kind carried this rotation.
    #[must_use]
    pub const fn kind(&self) -> RotationKind {
        match self {
            Self::Rot(_) => RotationKind::Rot,
            Self::PosRot(_) => RotationKind::PosRot,
        }
    }

    /// The position, if this update carried one.
    #[must_use]
    pub const fn position(&self) -> Option<DVec3> {
        match self {
            Self::Rot(_) => None,
            Self::PosRot(p) => Some(p.position),
        }
    }
}
