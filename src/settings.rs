//! Runtime-tunable physics settings (spec.md §6.3).
//!
//! Field set and defaults grounded on
//! `original_source/core/PhysicsSettings.{h,cpp}`'s `getDefaultPhysicsSettings()`.
//! All fields are plain public data, readable/writable at any time; the
//! frame driver reads them fresh every tick (spec.md §6.3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    pub gravity: f64,
    pub gravity_enabled: bool,

    pub elasticity: f64,

    pub pressure_scale: f64,
    pub pressure_hydrostatic_strength: f64,
    pub pressure_hydrostatic_enabled: bool,
    pub pressure_dynamic_strength: f64,
    pub pressure_dynamic_enabled: bool,
    pub pressure_diffusion_strength: f64,
    pub pressure_diffusion_enabled: bool,
    /// Number of explicit diffusion sub-steps taken per frame (>= 1).
    pub pressure_diffusion_iterations: u32,
    pub pressure_decay_rate: f64,

    pub cohesion_enabled: bool,
    pub cohesion_strength: f64,
    pub cohesion_resistance_factor: f64,

    pub adhesion_enabled: bool,
    pub adhesion_strength: f64,

    pub viscosity_enabled: bool,
    pub viscosity_strength: f64,

    pub friction_enabled: bool,
    pub friction_strength: f64,

    pub air_resistance: f64,

    pub swap_enabled: bool,

    pub fragmentation_enabled: bool,
    pub fragmentation_spray_fraction: f64,

    pub timescale: f64,

    /// 4- or 8-connected neighborhoods for diffusion and gradient
    /// calculation (spec.md §4.5.3, §4.5.5).
    pub use_eight_neighborhood: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        PhysicsSettings {
            gravity: 9.81,
            gravity_enabled: true,
            elasticity: 0.8,
            pressure_scale: 1.0,
            pressure_hydrostatic_strength: 1.0,
            pressure_hydrostatic_enabled: true,
            pressure_dynamic_strength: 0.3,
            pressure_dynamic_enabled: true,
            pressure_diffusion_strength: 10.0,
            pressure_diffusion_enabled: true,
            pressure_diffusion_iterations: 2,
            pressure_decay_rate: 0.20,
            cohesion_enabled: true,
            cohesion_strength: 10.0,
            cohesion_resistance_factor: 25.0,
            adhesion_enabled: true,
            adhesion_strength: 2.0,
            viscosity_enabled: true,
            viscosity_strength: 1.0,
            friction_enabled: true,
            friction_strength: 1.0,
            air_resistance: 0.1,
            swap_enabled: true,
            fragmentation_enabled: true,
            fragmentation_spray_fraction: 0.4,
            timescale: 1.0,
            use_eight_neighborhood: true,
        }
    }
}
