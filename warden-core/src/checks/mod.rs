//! The stateful detectors and their shared event type.

/// Angle-burst detector (suspicious rotation sweeps during placement).
pub mod angle_burst;
/// Equal-rotation detector (bit-identical consecutive look packets).
pub mod equal_rotation;

pub use angle_burst::AngleBurstCheck;
pub use equal_rotation::EqualRotationCheck;

use uuid::Uuid;

/// Which detector produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorId {
    /// [`equal_rotation::EqualRotationCheck`].
    EqualRotation,
    /// [`angle_burst::AngleBurstCheck`].
    AngleBurst,
}

impl DetectorId {
    /// Stable name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EqualRotation => "equal_rotation",
            Self::AngleBurst => "angle_burst",
        }
    }
}

/// One detection occurrence.
///
/// Transient: produced by a detector, consumed by the violation sink (when
/// `suppressed_reason` is `None`), then discarded. Never persisted.
#[derive(Debug, Clone)]
pub struct DetectionEvent {
    /// The observed player.
    pub player_id: Uuid,
    /// The producing detector.
    pub detector: DetectorId,
    /// Score increment. 1 for weak evidence, higher for stronger.
    pub severity_delta: u32,
    /// `Some` when the occurrence was explained away and not scored.
    pub suppressed_reason: Option<&'static str>,
    /// Operator-facing description naming the player.
    pub evidence: String,
}

impl DetectionEvent {
    /// Whether this event was actually scored.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        self.suppressed_reason.is_none()
    }
}
