//! Warden: a packet-analysis anti-cheat core.
//!
//! Inspects per-player streams of rotation/movement packets plus world
//! state and raises graduated violation signals when the observed patterns
//! cannot come from an unmodified client.
//!
//! The host server owns packet interception, world state, and punishment;
//! this crate owns the pattern analysis: rolling per-player state, the
//! detectors, the version/material exception rules, and the bounded
//! hand-off that confines world reads to the host's serial context.

/// The detectors.
pub mod checks;
/// Engine configuration.
pub mod config;
/// The engine facade.
pub mod engine;
/// The error taxonomy.
pub mod error;
/// Version-keyed material fact tables.
pub mod material;
/// Angle helpers.
pub mod math;
/// Per-player rolling state.
pub mod session;
/// Warning rate limiting.
pub mod throttle;
/// Violation scoring.
pub mod violation;
/// Serial-context world access.
pub mod world;

pub use checks::{AngleBurstCheck, DetectionEvent, DetectorId, EqualRotationCheck};
pub use config::WardenConfig;
pub use engine::Warden;
pub use error::CheckError;
pub use session::{MovementCategory, PlayerSession, SessionStore};
pub use violation::{ViolationSink, ViolationTracker};
pub use world::{
    EnvironmentResolver, Hitbox, MainThreadGate, MainThreadQueue, WorldAccess, WorldVerdict,
    main_thread_channel,
};
