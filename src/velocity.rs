//! Velocity integrator and per-timestep limiter (spec.md §2 component 7,
//! §4.7, §4.8).
//!
//! Grounded on `Nopey-sand`'s `velocity_step`'s friction-coefficient bleed
//! pattern, replaced with spec.md's damping-factor formula and the
//! two-state `STATIC`/`FALLING` motion model of `World.h`'s `MotionState`
//! enum (kept to the two implemented states; `Sliding`/`Turbulent` exist for
//! forward compatibility but are never produced).

use crate::grid::Grid;
use crate::material::friction_coeff;
use crate::settings::PhysicsSettings;
use crate::vector::safe_denom;

use crate::consts::{DAMPING_FACTOR_PER_TIMESTEP, DAMPING_THRESHOLD_PER_TIMESTEP, MAX_VELOCITY_PER_TIMESTEP};

/// Heuristic per-cell motion classification (spec.md §4.7 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Static,
    Sliding,
    Falling,
    Turbulent,
}

impl MotionState {
    fn base_multiplier(self) -> f64 {
        match self {
            MotionState::Static => 1.0,
            MotionState::Sliding => 0.5,
            MotionState::Falling => 0.3,
            MotionState::Turbulent => 0.1,
        }
    }
}

fn classify_motion(has_structural_support: bool) -> MotionState {
    if has_structural_support {
        MotionState::Static
    } else {
        MotionState::Falling
    }
}

/// Integrates velocity from `pending_force` with viscosity/friction damping
/// (spec.md §4.7), then applies the per-timestep limiter (§4.8).
pub fn integrate(grid: &mut Grid, settings: &PhysicsSettings, dt: f64) {
    let width = grid.width();
    let height = grid.height();

    for y in 0..height {
        for x in 0..width {
            let cell = grid.at(x, y);
            if cell.is_empty() || cell.is_wall() {
                continue;
            }

            let support_factor = if cell.has_any_support { 1.0 } else { 0.0 };
            let motion = classify_motion(cell.has_any_support);

            let props = cell.material.properties();
            let sensitivity = props.motion_sensitivity;
            let motion_mult = 1.0 - sensitivity * (1.0 - motion.base_multiplier());

            let speed = crate::vector::length(cell.velocity);
            let mu = friction_coeff(speed, props);
            let mu_eff = 1.0 + (mu - 1.0) * settings.friction_strength;

            let damping = (1.0
                + props.viscosity * mu_eff * motion_mult * cell.fill_ratio * support_factor * settings.viscosity_strength
                    * 1000.0)
                .max(0.001);

            let force = cell.pending_force;
            let cell = grid.at_mut(x, y);
            cell.velocity[0] += (force[0] / safe_denom(damping)) * dt;
            cell.velocity[1] += (force[1] / safe_denom(damping)) * dt;
        }
    }

    apply_velocity_limit(grid);
}

/// Per-timestep velocity limiting (spec.md §4.8): constants are independent
/// of `dt`.
pub fn apply_velocity_limit(grid: &mut Grid) {
    for cell in grid.cells_mut() {
        if cell.is_empty() {
            continue;
        }
        let speed = crate::vector::length(cell.velocity);
        if speed <= 0.0 {
            continue;
        }

        if speed > MAX_VELOCITY_PER_TIMESTEP {
            let scale = MAX_VELOCITY_PER_TIMESTEP / speed;
            cell.velocity[0] *= scale;
            cell.velocity[1] *= scale;
        }

        let speed_after = crate::vector::length(cell.velocity);
        if speed_after > DAMPING_THRESHOLD_PER_TIMESTEP {
            cell.velocity[0] *= 1.0 - DAMPING_FACTOR_PER_TIMESTEP;
            cell.velocity[1] *= 1.0 - DAMPING_FACTOR_PER_TIMESTEP;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::material::Material;

    #[test]
    fn integration_adds_scaled_force() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Water, 1.0);
        grid.at_mut(1, 1).pending_force = [0.0, 10.0];
        grid.at_mut(1, 1).has_any_support = false;
        let settings = PhysicsSettings::default();
        integrate(&mut grid, &settings, 1.0 / 60.0);
        assert!(grid.at(1, 1).velocity[1] > 0.0);
    }

    #[test]
    fn velocity_above_max_is_rescaled() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Water, 1.0);
        grid.at_mut(1, 1).velocity = [1000.0, 0.0];
        apply_velocity_limit(&mut grid);
        let speed = crate::vector::length(grid.at(1, 1).velocity);
        assert!((speed - MAX_VELOCITY_PER_TIMESTEP * (1.0 - DAMPING_FACTOR_PER_TIMESTEP)).abs() < 1e-6);
    }

    #[test]
    fn velocity_below_damping_threshold_unaffected() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Water, 1.0);
        grid.at_mut(1, 1).velocity = [10.0, 0.0];
        apply_velocity_limit(&mut grid);
        assert_eq!(grid.at(1, 1).velocity, [10.0, 0.0]);
    }
}
