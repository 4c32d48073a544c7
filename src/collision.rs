//! Collision classifier (spec.md §2 component 9, §4.10).
//!
//! New relative to the teacher; grounded on
//! `original_source/core/MaterialMove.h`'s `CollisionType` enum and
//! `WorldCollisionCalculator.h`, using `Nopey-sand`'s elasticity/mass fields
//! as the basis for `e = sqrt(e_from*e_to)` and the swap-energy-cost idea
//! already present in its momentum-exchange code.

use crate::cell::Cell;
use crate::consts::{FRAGMENTATION_THRESHOLD, INELASTIC_RESTITUTION_FACTOR};
use crate::material::Material;
use crate::settings::PhysicsSettings;
use crate::transfer::MaterialMove;
use crate::vector::length;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    TransferOnly,
    Fragmentation,
    Absorption,
    ElasticReflection,
    InelasticCollision { restitution: u32 },
}

/// Fixed table of ordered `(into, absorbed)` pairs that classify as
/// `ABSORPTION` (spec.md §4.10).
fn is_absorb_pair(target: Material, incoming: Material) -> bool {
    matches!(
        (target, incoming),
        (Material::Dirt, Material::Water)
            | (Material::Sand, Material::Water)
            | (Material::Leaf, Material::Water)
            | (Material::Water, Material::Leaf)
    )
}

pub struct Classification {
    pub collision_type: CollisionType,
    pub delta_ke: f64,
    pub propose_swap: bool,
}

/// Classifies a single proposed move given its source and target cells
/// (spec.md §4.10). `INELASTIC_RESTITUTION_FACTOR` is fixed at `0.5`, so the
/// `restitution` tag on `InelasticCollision` is informational only (kept as
/// a unit-carrying marker rather than a float to sidestep `Eq` on `f64`).
pub fn classify(from: &Cell, to: &Cell, mv: &MaterialMove, settings: &PhysicsSettings) -> Classification {
    let v_rel = [from.velocity[0] - to.velocity[0], from.velocity[1] - to.velocity[1]];
    let delta_ke = 0.5 * from.mass() * length(v_rel).powi(2);

    let collision_type = if to.is_empty() || to.material == from.material {
        CollisionType::TransferOnly
    } else if settings.fragmentation_enabled
        && from.material.is_rigid()
        && to.material.is_rigid()
        && delta_ke > FRAGMENTATION_THRESHOLD
    {
        CollisionType::Fragmentation
    } else if is_absorb_pair(to.material, from.material) {
        CollisionType::Absorption
    } else if {
        let e = (from.material.properties().elasticity * to.material.properties().elasticity).max(0.0).sqrt();
        e >= 0.5 && from.material.is_rigid() && to.material.is_rigid()
    } {
        CollisionType::ElasticReflection
    } else {
        CollisionType::InelasticCollision { restitution: (INELASTIC_RESTITUTION_FACTOR * 10.0) as u32 }
    };

    let propose_swap = settings.swap_enabled
        && !from.is_empty()
        && !to.is_empty()
        && from.material != to.material
        && aligns_with_density_differential(from, to, mv.boundary_normal);

    Classification {
        collision_type,
        delta_ke,
        propose_swap,
    }
}

/// A swap is proposed when the move direction aligns with the density
/// differential: lighter cell moving up, or heavier cell moving down
/// (spec.md §4.10).
fn aligns_with_density_differential(from: &Cell, to: &Cell, boundary_normal: [f64; 2]) -> bool {
    let moving_up = boundary_normal[1] < 0.0;
    let moving_down = boundary_normal[1] > 0.0;
    if moving_up {
        from.material.density() < to.material.density()
    } else if moving_down {
        from.material.density() > to.material.density()
    } else {
        false
    }
}
