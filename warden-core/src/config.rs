//! Engine configuration.
//!
//! Loaded once at startup (JSON5, same format the rest of the server stack
//! uses) and passed into [`crate::engine::Warden`] explicitly; there is no
//! ambient config global.

use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration for the analysis engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Equal-rotation detector settings.
    pub equal_rotation: EqualRotationConfig,
    /// Angle-burst detector settings.
    pub angle_burst: AngleBurstConfig,
    /// Violation scoring settings.
    pub violations: ViolationConfig,
}

impl WardenConfig {
    /// Parses a JSON5 document. Missing fields keep their defaults.
    pub fn from_json5(source: &str) -> Result<Self, serde_json5::Error> {
        serde_json5::from_str(source)
    }
}

/// Settings for the equal-rotation detector.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EqualRotationConfig {
    /// Whether the detector runs at all.
    pub enabled: bool,
    /// Grace period after a server teleport during which equal rotations
    /// are legitimate (client snaps to the taught position).
    pub teleport_grace_ms: u64,
    /// A player with no horizontal movement inside this window is standing
    /// still; stillness repeats rotations legitimately.
    pub movement_window_ms: u64,
    /// Deadline for the main-context world query.
    pub world_query_timeout_ms: u64,
    /// Minimum spacing between operator warnings about dropped evaluations.
    pub timeout_warning_interval_ms: u64,
    /// After this many consecutive timeouts, escalate once to a
    /// degraded-coverage warning. Zero disables the escalation.
    pub degraded_after_timeouts: u32,
}

impl Default for EqualRotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            teleport_grace_ms: 5000,
            movement_window_ms: 100,
            world_query_timeout_ms: 10_000,
            timeout_warning_interval_ms: 10_000,
            degraded_after_timeouts: 5,
        }
    }
}

impl EqualRotationConfig {
    /// Teleport grace window.
    #[must_use]
    pub const fn teleport_grace(&self) -> Duration {
        Duration::from_millis(self.teleport_grace_ms)
    }

    /// Horizontal stillness window.
    #[must_use]
    pub const fn movement_window(&self) -> Duration {
        Duration::from_millis(self.movement_window_ms)
    }

    /// World query deadline.
    #[must_use]
    pub const fn world_query_timeout(&self) -> Duration {
        Duration::from_millis(self.world_query_timeout_ms)
    }

    /// Warning throttle interval.
    #[must_use]
    pub const fn timeout_warning_interval(&self) -> Duration {
        Duration::from_millis(self.timeout_warning_interval_ms)
    }
}

/// Settings for the angle-burst detector.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AngleBurstConfig {
    /// Whether the detector starts enabled. It can also be toggled at
    /// runtime as a unit.
    pub enabled: bool,
    /// Summed absolute rotation change (degrees) above which a burst is
    /// flagged. Strictly greater-than.
    pub angle_sum_threshold: f32,
    /// Gap between activity samples that starts a fresh window.
    pub window_ms: u64,
}

impl Default for AngleBurstConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            angle_sum_threshold: 7.0,
            window_ms: 1000,
        }
    }
}

impl AngleBurstConfig {
    /// Activity window duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Settings for the default violation tracker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViolationConfig {
    /// Score at which the escalation callback fires.
    pub threshold: f64,
    /// Score subtracted per decay interval.
    pub decay_amount: f64,
    /// Length of one decay interval.
    pub decay_interval_ms: u64,
}

impl Default for ViolationConfig {
    fn default() -> Self {
        Self {
            threshold: 20.0,
            decay_amount: 1.0,
            decay_interval_ms: 30_000,
        }
    }
}

impl ViolationConfig {
    /// Decay interval.
    #[must_use]
    pub const fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }
}
