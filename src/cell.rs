//! Cell aggregate (spec.md §3.2), grounded on `original_source/core/Cell.h`
//! with the mixed-material / visualization-only fields dropped per spec.md
//! §9 ("collapse to one concrete cell type").

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::material::Material;
use crate::vector::{clamp_com_with_inset, clamp_vec, Vec2};

/// One grid cell. Plain aggregate; default is empty AIR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub material: Material,
    pub fill_ratio: f64,
    pub com: Vec2,
    pub velocity: Vec2,
    pub hydrostatic_component: f64,
    pub dynamic_component: f64,
    pub pressure_gradient: Vec2,
    pub pending_force: Vec2,
    pub has_any_support: bool,
    pub has_vertical_support: bool,
    /// Binding-resistance scalar from cohesion (spec.md §4.6); consumed by
    /// the transfer planner as a movement threshold, not a force.
    pub cohesion_resistance: f64,
    pub organism_id: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            material: Material::Air,
            fill_ratio: 0.0,
            com: [0.0, 0.0],
            velocity: [0.0, 0.0],
            hydrostatic_component: 0.0,
            dynamic_component: 0.0,
            pressure_gradient: [0.0, 0.0],
            pending_force: [0.0, 0.0],
            has_any_support: false,
            has_vertical_support: false,
            cohesion_resistance: 0.0,
            organism_id: 0,
        }
    }
}

impl Cell {
    /// Total pressure: the sum of the hydrostatic and dynamic components
    /// (spec.md §3.2; the components exist only for visualization).
    #[inline]
    pub fn pressure(&self) -> f64 {
        self.hydrostatic_component + self.dynamic_component
    }

    pub fn set_hydrostatic_pressure(&mut self, p: f64) {
        self.hydrostatic_component = p.max(0.0);
    }

    pub fn set_dynamic_pressure(&mut self, p: f64) {
        self.dynamic_component = p.max(0.0);
    }

    pub fn add_dynamic_pressure(&mut self, p: f64) {
        self.dynamic_component = (self.dynamic_component + p).max(0.0);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.material == Material::Air
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.material == Material::Wall
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.fill_ratio >= MAX_FILL_THRESHOLD
    }

    /// Available capacity for more of the cell's own material.
    #[inline]
    pub fn capacity(&self) -> f64 {
        (1.0 - self.fill_ratio).max(0.0)
    }

    /// Effective mass: `fill_ratio * density` (glossary).
    #[inline]
    pub fn mass(&self) -> f64 {
        self.fill_ratio * self.material.density()
    }

    #[inline]
    pub fn effective_density(&self) -> f64 {
        self.mass()
    }

    /// Sets fill ratio, enforcing invariant 1 (`fill_ratio == 0 <=> AIR`) and
    /// the auto-clear-to-AIR threshold (spec.md §3.2).
    pub fn set_fill_ratio(&mut self, ratio: f64) {
        let clamped = ratio.clamp(0.0, 1.0);
        if clamped < MIN_FILL_THRESHOLD {
            self.clear();
        } else {
            self.fill_ratio = clamped;
        }
    }

    pub fn set_com(&mut self, com: Vec2) {
        self.com = clamp_vec(com, COM_MAX);
    }

    pub fn clamp_com(&mut self) {
        self.com = clamp_vec(self.com, 1.0);
    }

    /// Clamp COM after a boundary reflection, with a small inward inset so
    /// the COM doesn't immediately re-trigger a crossing (spec.md §4.9).
    pub fn clamp_com_after_reflection(&mut self) {
        self.com = clamp_com_with_inset(self.com, COM_CLAMP_INSET);
    }

    /// Resets the cell to empty AIR with all dependent state zeroed
    /// (spec.md §4.2 `clear()`, invariant 2).
    pub fn clear(&mut self) {
        *self = Cell::default();
    }

    /// Atomically sets both material and fill (spec.md §4.2 `replace(...)`).
    pub fn replace(&mut self, material: Material, fill_ratio: f64) {
        if material == Material::Air || fill_ratio < MIN_FILL_THRESHOLD {
            self.clear();
            return;
        }
        self.material = material;
        self.fill_ratio = fill_ratio.clamp(0.0, 1.0);
    }

    /// Adds `amount` of `type_` to this cell, clamped to remaining capacity,
    /// only if the cell is empty or already holds that material. Returns the
    /// amount actually added (spec.md §4.2).
    pub fn add_material(&mut self, material: Material, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        if !self.is_empty() && self.material != material {
            return 0.0;
        }
        if self.is_empty() {
            self.material = material;
        }
        let added = amount.min(self.capacity());
        self.fill_ratio = (self.fill_ratio + added).clamp(0.0, 1.0);
        added
    }

    /// Physics-aware material addition: computes the incoming COM's landing
    /// point by intersecting `source_com + t*v` with the crossed boundary,
    /// wraps into target-cell coordinates, and mass-weight-averages COM and
    /// velocity with any existing content (spec.md §4.2).
    pub fn add_material_with_physics(
        &mut self,
        material: Material,
        amount: f64,
        source_com: Vec2,
        incoming_velocity: Vec2,
        boundary_normal: Vec2,
    ) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        if !self.is_empty() && self.material != material {
            return 0.0;
        }

        let existing_mass = self.mass();
        let landing_com = calculate_trajectory_landing(source_com, incoming_velocity, boundary_normal);

        let added = self.add_material(material, amount);
        if added <= 0.0 {
            return 0.0;
        }
        let added_mass = added * material.density();
        let total_mass = existing_mass + added_mass;
        if total_mass < MIN_MATTER_THRESHOLD {
            self.com = landing_com;
            self.velocity = incoming_velocity;
        } else {
            let w_existing = existing_mass / total_mass;
            let w_added = added_mass / total_mass;
            self.com = [
                self.com[0] * w_existing + landing_com[0] * w_added,
                self.com[1] * w_existing + landing_com[1] * w_added,
            ];
            self.velocity = [
                self.velocity[0] * w_existing + incoming_velocity[0] * w_added,
                self.velocity[1] * w_existing + incoming_velocity[1] * w_added,
            ];
        }
        self.clamp_com();
        added
    }

    /// Removes up to `amount` from this cell, returning what was actually
    /// removed, auto-clearing to AIR below the fill threshold.
    pub fn remove_material(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || self.is_empty() {
            return 0.0;
        }
        let removed = amount.min(self.fill_ratio);
        let remaining = self.fill_ratio - removed;
        if remaining < MIN_FILL_THRESHOLD {
            self.clear();
        } else {
            self.fill_ratio = remaining;
        }
        removed
    }

    pub fn total_material(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.fill_ratio
        }
    }

    pub fn to_ascii_character(&self) -> char {
        self.material.display_char()
    }
}

/// Intersects the line `source_com + t*v` with the boundary identified by
/// `boundary_normal` (the face of the source cell at `+-1` on the crossed
/// axis), then wraps the crossing point into the target cell's own
/// `[-1,1]^2` coordinate frame: the crossed axis wraps to the opposite face,
/// the other axis carries across unchanged (spec.md §4.2).
pub fn calculate_trajectory_landing(source_com: Vec2, velocity: Vec2, boundary_normal: Vec2) -> Vec2 {
    let axis = if boundary_normal[0].abs() > boundary_normal[1].abs() {
        0
    } else {
        1
    };
    let other = 1 - axis;

    // Time at which the COM, travelling at `velocity`, reaches the face
    // identified by `boundary_normal` on the crossed axis.
    let v_axis = velocity[axis];
    let t = if v_axis.abs() > 1e-9 {
        ((boundary_normal[axis] - source_com[axis]) / v_axis).max(0.0)
    } else {
        0.0
    };

    let carried_perp = (source_com[other] + velocity[other] * t).clamp(-1.0, 1.0);

    let mut landing = [0.0, 0.0];
    landing[axis] = -boundary_normal[axis] * (1.0 - COM_CLAMP_INSET);
    landing[other] = carried_perp;
    landing
}
