//! Error taxonomy for the detection pipeline.
//!
//! Every detector-local failure is converted to one of these at the detector
//! boundary; none of them ever propagate into the packet-interception layer,
//! since an escaped error there would abort delivery for all later packets.

use thiserror::Error;
use uuid::Uuid;
use warden_protocol::UnsupportedVersionError;

/// A recoverable or fatal failure inside a detector evaluation.
#[derive(Error, Debug)]
pub enum CheckError {
    /// A protocol generation outside the enumerated bands. Fatal at startup
    /// (server band) and at join (client band); never occurs mid-stream.
    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersionError),
    /// The bounded main-context hand-off did not answer in time. The
    /// occurrence is dropped from scoring: neither flagged nor exonerated.
    #[error("world query timed out after {0:?}")]
    WorldQueryTimedOut(std::time::Duration),
    /// The main-context side failed or went away mid-query.
    #[error("world query failed: {0}")]
    WorldQueryFailed(&'static str),
    /// No session exists for the player. The packet is skipped; other
    /// players' processing is unaffected.
    #[error("no session for player {0}")]
    InvalidPlayerState(Uuid),
}

impl CheckError {
    /// Whether this occurrence should be treated as indeterminate: dropped
    /// from scoring without counting for or against the player.
    #[must_use]
    pub const fn is_indeterminate(&self) -> bool {
        matches!(self, Self::WorldQueryTimedOut(_) | Self::WorldQueryFailed(_))
    }
}
