//! Material registry: per-material physical constants (spec.md §3.1, §4.1).
//!
//! Grounded on `Nopey-sand`'s `Species` enum + per-variant `match` methods,
//! generalized from three species to the eight materials named in spec.md,
//! with the concrete numeric table taken from
//! `original_source/core/MaterialType.cpp` (the `Seed` material belongs to
//! the out-of-scope organism subsystem and is intentionally not included).

use serde::{Deserialize, Serialize};

/// The fixed, indexed material enumeration (spec.md §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Air,
    Dirt,
    Water,
    Wood,
    Sand,
    Metal,
    Leaf,
    Wall,
}

impl Default for Material {
    fn default() -> Self {
        Material::Air
    }
}

pub const ALL_MATERIALS: [Material; 8] = [
    Material::Air,
    Material::Dirt,
    Material::Water,
    Material::Wood,
    Material::Sand,
    Material::Metal,
    Material::Leaf,
    Material::Wall,
];

/// Static per-material properties. Process-lifetime constants except for the
/// one documented `cohesion` override, which lives outside this table in the
/// world context rather than mutating it in place (spec.md §3.1 invariant,
/// design note in spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperties {
    pub density: f64,
    pub elasticity: f64,
    pub cohesion: f64,
    pub adhesion: f64,
    pub air_resistance: f64,
    pub com_mass_constant: f64,
    pub pressure_diffusion: f64,
    pub viscosity: f64,
    pub motion_sensitivity: f64,
    pub static_friction: f64,
    pub kinetic_friction: f64,
    pub stick_velocity: f64,
    pub friction_transition_width: f64,
    pub is_fluid: bool,
    pub is_rigid: bool,
}

const fn props(
    density: f64,
    elasticity: f64,
    cohesion: f64,
    adhesion: f64,
    air_resistance: f64,
    com_mass_constant: f64,
    pressure_diffusion: f64,
    viscosity: f64,
    motion_sensitivity: f64,
    static_friction: f64,
    kinetic_friction: f64,
    stick_velocity: f64,
    friction_transition_width: f64,
    is_fluid: bool,
    is_rigid: bool,
) -> MaterialProperties {
    MaterialProperties {
        density,
        elasticity,
        cohesion,
        adhesion,
        air_resistance,
        com_mass_constant,
        pressure_diffusion,
        viscosity,
        motion_sensitivity,
        static_friction,
        kinetic_friction,
        stick_velocity,
        friction_transition_width,
        is_fluid,
        is_rigid,
    }
}

/// Indexed in the same order as [`ALL_MATERIALS`] / the `Material` discriminant.
static MATERIAL_PROPERTIES: [MaterialProperties; 8] = [
    // AIR: nearly massless, fully elastic, maximal pressure diffusion.
    props(0.001, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.001, 0.0, 1.0, 1.0, 0.0, 0.01, true, false),
    // DIRT: medium granular, forms clumps, avalanches past stick_velocity.
    props(1.5, 0.2, 0.3, 0.2, 0.3, 5.0, 0.3, 0.5, 0.0, 1.0, 0.5, 0.05, 0.10, false, false),
    // WATER: standard fluid density, forms droplets, wets surfaces.
    props(1.0, 0.1, 0.25, 0.5, 0.01, 8.0, 0.9, 0.01, 1.0, 1.0, 1.0, 0.0, 0.01, true, false),
    // WOOD: light rigid, strong internal binding, directional-slow diffusion.
    props(0.8, 0.6, 0.7, 0.3, 0.4, 3.0, 0.15, 0.9, 0.2, 1.3, 0.9, 0.02, 0.03, false, true),
    // SAND: dense granular, settles faster than dirt.
    props(1.8, 0.2, 0.2, 0.1, 0.2, 4.0, 0.3, 0.3, 0.5, 0.6, 0.4, 0.04, 0.08, false, false),
    // METAL: very dense rigid, high elasticity, minimal diffusion.
    props(7.8, 0.8, 1.0, 0.1, 0.1, 2.0, 0.1, 0.95, 0.1, 1.5, 1.0, 0.01, 0.02, false, true),
    // LEAF: very light organic, high drag, highly motion-sensitive.
    props(0.3, 0.4, 0.3, 0.2, 0.8, 10.0, 0.6, 0.2, 0.8, 0.5, 0.3, 0.03, 0.06, false, false),
    // WALL: effectively infinite density, complete pressure barrier.
    props(1000.0, 0.9, 1.0, 0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.01, false, true),
];

/// The material-specific weight used by the hydrostatic pass (spec.md
/// §4.5.1); deliberately distinct from `density` (preserved as given, per
/// spec.md §9's Open Question about this table).
pub fn hydrostatic_weight(m: Material) -> f64 {
    match m {
        Material::Water => 1.0,
        Material::Sand => 0.7,
        Material::Dirt => 0.3,
        Material::Wood => 0.1,
        Material::Metal => 0.05,
        Material::Leaf => 0.3,
        _ => 0.0,
    }
}

/// The material-specific weight used by dynamic pressure injection from
/// blocked transfers (spec.md §4.5.2).
pub fn dynamic_weight(m: Material) -> f64 {
    match m {
        Material::Water => 0.8,
        Material::Dirt | Material::Sand => 1.0,
        Material::Wood => 0.5,
        Material::Metal => 0.5,
        Material::Leaf => 0.6,
        _ => 0.0,
    }
}

pub const RIGID_DENSITY_THRESHOLD: f64 = 5.0;
pub const STRONG_ADHESION_THRESHOLD: f64 = 0.5;

impl Material {
    #[inline]
    pub fn properties(self) -> &'static MaterialProperties {
        &MATERIAL_PROPERTIES[self as usize]
    }

    #[inline]
    pub fn density(self) -> f64 {
        self.properties().density
    }

    #[inline]
    pub fn is_fluid(self) -> bool {
        self.properties().is_fluid
    }

    #[inline]
    pub fn is_rigid(self) -> bool {
        self.properties().is_rigid
    }

    pub fn name(self) -> &'static str {
        match self {
            Material::Air => "AIR",
            Material::Dirt => "DIRT",
            Material::Water => "WATER",
            Material::Wood => "WOOD",
            Material::Sand => "SAND",
            Material::Metal => "METAL",
            Material::Leaf => "LEAF",
            Material::Wall => "WALL",
        }
    }

    pub fn display_char(self) -> char {
        match self {
            Material::Air => ' ',
            Material::Dirt => ':',
            Material::Water => '~',
            Material::Wood => '#',
            Material::Sand => '%',
            Material::Metal => 'M',
            Material::Leaf => '"',
            Material::Wall => '@',
        }
    }
}

/// Velocity-dependent friction coefficient with a smooth cubic transition
/// between static and kinetic friction (spec.md §4.1).
pub fn friction_coeff(speed: f64, props: &MaterialProperties) -> f64 {
    if speed < props.stick_velocity {
        return props.static_friction;
    }
    let width = if props.friction_transition_width.abs() < 1e-9 {
        1e-9
    } else {
        props.friction_transition_width
    };
    let t = ((speed - props.stick_velocity) / width).clamp(0.0, 1.0);
    let s = t * t * (3.0 - 2.0 * t);
    (1.0 - s) * props.static_friction + s * props.kinetic_friction
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn air_and_wall_are_extremes() {
        assert!(Material::Air.density() < Material::Water.density());
        assert!(Material::Wall.density() > Material::Metal.density());
        assert!(Material::Wall.is_rigid());
        assert_eq!(Material::Wall.properties().pressure_diffusion, 0.0);
    }

    #[test]
    fn friction_transitions_monotonically_for_dirt() {
        let p = Material::Dirt.properties();
        let lo = friction_coeff(0.0, p);
        let mid = friction_coeff(p.stick_velocity + p.friction_transition_width / 2.0, p);
        let hi = friction_coeff(p.stick_velocity + p.friction_transition_width * 10.0, p);
        assert_eq!(lo, p.static_friction);
        assert!((hi - p.kinetic_friction).abs() < 1e-9);
        assert!(mid > p.kinetic_friction.min(p.static_friction));
        assert!(mid < p.static_friction.max(p.kinetic_friction));
    }

    #[test]
    fn hydrostatic_weight_table_matches_spec() {
        assert_eq!(hydrostatic_weight(Material::Water), 1.0);
        assert_eq!(hydrostatic_weight(Material::Air), 0.0);
        assert_eq!(hydrostatic_weight(Material::Wall), 0.0);
    }
}
