//! Decides whether an equal-rotation signal is explainable by world
//! geometry.
//!
//! All spatial reads happen in one bounded [`MainThreadGate::query`] call,
//! so a suspicious packet costs exactly one hand-off however many rules end
//! up being evaluated.

use crate::error::CheckError;
use crate::material::{Material, changed_hitbox_materials, liquids};
use crate::world::{Hitbox, MainThreadGate};
use glam::DVec3;
use std::time::Duration;
use uuid::Uuid;
use warden_protocol::{HitboxModel, VersionBand};

/// Outcome of a resolver query that answered within its deadline.
///
/// The timeout case is deliberately *not* a variant here: an indeterminate
/// occurrence surfaces as [`CheckError::WorldQueryTimedOut`] and must be
/// dropped from scoring, neither flagged nor treated as exonerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldVerdict {
    /// The player is riding a vehicle. The signal is discarded outright,
    /// without consuming the one-shot expectation flag.
    VehicleExempt,
    /// World geometry explains the equal rotation; do not penalize.
    Suppressed,
    /// No exception applies; the signal stands.
    NotSuppressed,
}

/// Evaluates the environment exception rules for one server generation.
pub struct EnvironmentResolver {
    gate: MainThreadGate,
    server_band: VersionBand,
}

impl EnvironmentResolver {
    /// Creates a resolver bound to the server's own version band.
    #[must_use]
    pub const fn new(gate: MainThreadGate, server_band: VersionBand) -> Self {
        Self { gate, server_band }
    }

    /// Runs the exception rules on the main context, bounded by `deadline`.
    ///
    /// Suppression rules, either of which clears the signal:
    /// - the hitbox is in liquid with a slime block directly below the feet
    ///   (jumping from height into a slime-floored pool repeats rotations);
    /// - server and client disagree on hitbox geometry and the hitbox
    ///   touches a material whose volume changed between the generations.
    pub async fn resolve(
        &self,
        player_id: Uuid,
        location: DVec3,
        hitbox: Hitbox,
        client_band: Option<VersionBand>,
        deadline: Duration,
    ) -> Result<WorldVerdict, CheckError> {
        let server_band = self.server_band;
        self.gate
            .query(deadline, move |world| {
                if world.is_player_in_vehicle(player_id) {
                    return WorldVerdict::VehicleExempt;
                }

                if world.is_hitbox_intersecting(location, hitbox, liquids(server_band))
                    && world.block_below(location) == Material::SlimeBlock
                {
                    return WorldVerdict::Suppressed;
                }

                if let Some(client_band) = client_band {
                    if client_band.hitbox_model() != server_band.hitbox_model() {
                        // The changed-volume set belongs to whichever side
                        // still runs the legacy geometry.
                        let legacy_band = if server_band.hitbox_model() == HitboxModel::Legacy {
                            server_band
                        } else {
                            client_band
                        };
                        if world.is_hitbox_intersecting(
                            location,
                            hitbox,
                            changed_hitbox_materials(legacy_band),
                        ) {
                            return WorldVerdict::Suppressed;
                        }
                    }
                }

                WorldVerdict::NotSuppressed
            })
            .await
    }
}
