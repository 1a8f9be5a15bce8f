//! Version-keyed material fact tables.
//!
//! Everything here is a pure lookup over the closed [`VersionBand`] set.
//! Whole block families that the tables never tell apart (slabs, stairs,
//! signs, shulker box colors) collapse to one variant each.
//!
//! Tables are `'static` and exhaustive over the band enum, so an added band
//! that forgets a table entry fails to compile instead of silently reusing
//! the wrong generation's data.

use warden_protocol::VersionBand;

/// The block materials the detectors care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    /// Regular air.
    Air,
    /// Cave air, a distinct block from 1.13 on.
    CaveAir,
    /// Flowing or source water.
    Water,
    /// Flowing or source lava.
    Lava,
    /// Legacy stationary water, a separate block before 1.13.
    StationaryWater,
    /// Legacy stationary lava, a separate block before 1.13.
    StationaryLava,
    /// Any full opaque cube (stone, dirt, planks, ...).
    Solid,
    /// Invisible barrier block.
    Barrier,
    /// Monster spawner.
    Spawner,
    /// Slime block.
    SlimeBlock,
    /// Single chest.
    Chest,
    /// Trapped chest.
    TrappedChest,
    /// Ender chest.
    EnderChest,
    /// Any shulker box color.
    ShulkerBox,
    /// Anvil, any damage state.
    Anvil,
    /// Enchanting table.
    EnchantingTable,
    /// Plain glass pane.
    GlassPane,
    /// Any stained glass pane.
    StainedGlassPane,
    /// Iron bars.
    IronBars,
    /// Any slab.
    Slab,
    /// Any stairs.
    Stairs,
    /// Any sign, standing or wall-mounted.
    Sign,
}

impl Material {
    /// The host engine's own occlusion classification for this material.
    ///
    /// Note this is the *uncorrected* value: the engine wrongly reports
    /// barrier and spawner blocks as occluding. Use
    /// [`is_really_occluding`] for the corrected answer.
    #[must_use]
    pub const fn is_occluding(self) -> bool {
        matches!(
            self,
            Self::Solid | Self::Barrier | Self::Spawner | Self::SlimeBlock
        )
    }
}

/// Materials whose hitboxes changed between the legacy and modern geometry
/// generations.
///
/// Only relevant when a 1.8 server talks to a 1.9+ client or vice versa;
/// from 1.12 on both sides agree and the set is empty.
#[must_use]
pub const fn changed_hitbox_materials(band: VersionBand) -> &'static [Material] {
    match band {
        VersionBand::V1_8 => &[
            Material::StainedGlassPane,
            Material::GlassPane,
            Material::IronBars,
            Material::Chest,
            Material::Anvil,
        ],
        VersionBand::V1_12
        | VersionBand::V1_13
        | VersionBand::V1_14
        | VersionBand::V1_15
        | VersionBand::V1_16 => &[],
    }
}

/// The liquid materials of a band.
///
/// The flattening in 1.13 removed the stationary water/lava blocks.
#[must_use]
pub const fn liquids(band: VersionBand) -> &'static [Material] {
    match band {
        VersionBand::V1_8 | VersionBand::V1_12 => &[
            Material::Water,
            Material::Lava,
            Material::StationaryWater,
            Material::StationaryLava,
        ],
        VersionBand::V1_13 | VersionBand::V1_14 | VersionBand::V1_15 | VersionBand::V1_16 => {
            &[Material::Water, Material::Lava]
        }
    }
}

/// Corrected occlusion test.
///
/// The host engine misclassifies barrier and spawner blocks as occluding in
/// every supported band; this strips them out.
#[must_use]
pub const fn is_really_occluding(material: Material, band: VersionBand) -> bool {
    match band {
        VersionBand::V1_8
        | VersionBand::V1_12
        | VersionBand::V1_13
        | VersionBand::V1_14
        | VersionBand::V1_15
        | VersionBand::V1_16 => {
            !matches!(material, Material::Barrier | Material::Spawner) && material.is_occluding()
        }
    }
}

/// Containers that need free space of some kind above them to open (chest
/// lids, shulker box caps).
#[must_use]
pub const fn free_space_containers() -> &'static [Material] {
    &[
        Material::Chest,
        Material::TrappedChest,
        Material::EnderChest,
        Material::ShulkerBox,
    ]
}

/// Materials permitted directly above a free-space container without
/// blocking interaction (e.g. a chest under stairs still opens).
#[must_use]
pub const fn free_space_container_allow_list(band: VersionBand) -> &'static [Material] {
    match band {
        VersionBand::V1_8 | VersionBand::V1_12 => &[
            Material::Air,
            Material::Chest,
            Material::TrappedChest,
            Material::EnderChest,
            Material::Anvil,
            Material::Slab,
            Material::Stairs,
            Material::EnchantingTable,
        ],
        VersionBand::V1_13 => &[
            Material::Air,
            Material::CaveAir,
            Material::Chest,
            Material::TrappedChest,
            Material::EnderChest,
            Material::Anvil,
            Material::Slab,
            Material::Stairs,
            Material::EnchantingTable,
        ],
        VersionBand::V1_14 | VersionBand::V1_15 | VersionBand::V1_16 => &[
            Material::Air,
            Material::CaveAir,
            Material::Chest,
            Material::TrappedChest,
            Material::EnderChest,
            Material::Anvil,
            Material::Slab,
            Material::Stairs,
            Material::EnchantingTable,
            Material::Sign,
        ],
    }
}
