//! Live world access, confined to the host's authoritative serial context.
//!
//! The host engine only allows world/block reads from one designated
//! context; reading from a packet worker is undefined behavior there. All
//! spatial queries therefore go through the [`gate`] as bounded
//! request/response messages.

/// The bounded hand-off to the main context.
pub mod gate;
/// The equal-rotation exception resolver.
pub mod resolver;

pub use gate::{MainThreadGate, MainThreadQueue, main_thread_channel};
pub use resolver::{EnvironmentResolver, WorldVerdict};

use crate::material::Material;
use glam::DVec3;
use uuid::Uuid;

/// A player collision volume: a square prism centered on the position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    /// Full width along X and Z.
    pub width: f64,
    /// Full height along Y.
    pub height: f64,
}

impl Hitbox {
    /// Standing player.
    pub const PLAYER: Self = Self {
        width: 0.6,
        height: 1.8,
    };

    /// Sneaking player.
    pub const SNEAKING_PLAYER: Self = Self {
        width: 0.6,
        height: 1.65,
    };
}

/// World state reads served by the host on its serial context.
///
/// Implementations may load chunks while answering; that is exactly why
/// these calls must never run on a packet worker.
pub trait WorldAccess: Send + Sync {
    /// Whether the hitbox at `location` intersects any block whose material
    /// is in `materials`.
    fn is_hitbox_intersecting(
        &self,
        location: DVec3,
        hitbox: Hitbox,
        materials: &[Material],
    ) -> bool;

    /// The material of the block directly below the block at `location`.
    fn block_below(&self, location: DVec3) -> Material;

    /// Whether the player is currently riding a vehicle.
    fn is_player_in_vehicle(&self, player_id: Uuid) -> bool;
}
