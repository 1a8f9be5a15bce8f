//! Typed inbound packet values and protocol-generation identity for the
//! Warden packet-analysis core.
//!
//! This crate owns no wire format. The packet-interception transport decodes
//! raw packets and hands the core the typed values defined here, per
//! connection, in send order, exactly once.

/// Serverbound movement/rotation packet values.
pub mod packets;
/// Protocol generations ("version bands") and their resolution.
pub mod version;

pub use packets::{RotationKind, RotationUpdate, SMovePlayerPosRot, SMovePlayerRot};
pub use version::{HitboxModel, UnsupportedVersionError, VersionBand};
