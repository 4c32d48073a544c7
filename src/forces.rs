//! Force accumulators (spec.md §2 component 6, §4.6).
//!
//! Grounded on `Nopey-sand`'s `gravity_step`/`velocity_step` as the
//! structural pattern for iterating cells and pushing `pending_force` into
//! a per-cell accumulator, generalized to the five force terms named in
//! spec.md §4.6.

use crate::consts::*;
use crate::grid::Grid;
use crate::material::friction_coeff;
use crate::settings::PhysicsSettings;
use crate::support::has_horizontal_support;
use crate::vector::{length, Vec2};

pub fn clear_pending_forces(grid: &mut Grid) {
    for cell in grid.cells_mut() {
        cell.pending_force = [0.0, 0.0];
    }
}

pub fn accumulate_gravity(grid: &mut Grid, settings: &PhysicsSettings) {
    if !settings.gravity_enabled {
        return;
    }
    let g = settings.gravity;
    for cell in grid.cells_mut() {
        if cell.is_empty() || cell.is_wall() {
            continue;
        }
        cell.pending_force[1] += g;
    }
}

pub fn accumulate_air_drag(grid: &mut Grid, settings: &PhysicsSettings) {
    let k = settings.air_resistance;
    if k <= 0.0 {
        return;
    }
    for cell in grid.cells_mut() {
        if cell.is_empty() || cell.is_wall() {
            continue;
        }
        let speed = length(cell.velocity);
        if speed < MIN_MATTER_THRESHOLD {
            continue;
        }
        cell.pending_force[0] -= k * speed * cell.velocity[0];
        cell.pending_force[1] -= k * speed * cell.velocity[1];
    }
}

/// Uses the gradient computed at the end of the previous frame (spec.md
/// §4.5.5, §4.6).
pub fn accumulate_pressure_force(grid: &mut Grid, settings: &PhysicsSettings) {
    let scale = settings.pressure_scale;
    for cell in grid.cells_mut() {
        if cell.is_empty() || cell.is_wall() {
            continue;
        }
        cell.pending_force[0] += cell.pressure_gradient[0] * scale;
        cell.pending_force[1] += cell.pressure_gradient[1] * scale;
    }
}

/// Cohesion: a binding resistance scalar (consumed elsewhere, e.g. as a
/// movement threshold) plus an always-active COM-attraction force (spec.md
/// §4.6).
pub fn accumulate_cohesion(grid: &mut Grid, settings: &PhysicsSettings) {
    if !settings.cohesion_enabled {
        for cell in grid.cells_mut() {
            cell.cohesion_resistance = 0.0;
        }
        return;
    }

    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let strength = settings.cohesion_strength;
    let resistance_factor = settings.cohesion_resistance_factor;

    let materials: Vec<_> = grid.cells().iter().map(|c| (c.material, c.fill_ratio, c.com)).collect();
    let vertical_support: Vec<bool> = grid.cells().iter().map(|c| c.has_vertical_support).collect();

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let (material, fill, com) = materials[idx];
            if material == crate::material::Material::Air || material == crate::material::Material::Wall {
                continue;
            }
            let cohesion = material.properties().cohesion;

            let mut same_material_neighbors = 0u32;
            let mut cluster_center = [0.0_f64, 0.0];
            let mut total_neighbor_fill = 0.0_f64;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        continue;
                    }
                    let n_idx = (ny * width + nx) as usize;
                    let (n_material, n_fill, _) = materials[n_idx];
                    if n_material == material {
                        same_material_neighbors += 1;
                        total_neighbor_fill += n_fill;
                        cluster_center[0] += (x + dx) as f64;
                        cluster_center[1] += (y + dy) as f64;
                    }
                }
            }

            // Support factor for the binding-resistance scalar (spec.md
            // §4.6).
            let support_factor = if material.density() > RIGID_DENSITY_THRESHOLD && same_material_neighbors >= 2 {
                1.0
            } else if vertical_support[idx] {
                1.0
            } else if same_material_neighbors > 0 {
                0.5
            } else {
                MIN_SUPPORT_FACTOR
            };

            let resistance = cohesion * same_material_neighbors as f64 * fill * support_factor * resistance_factor;
            grid.at_mut(x as usize, y as usize).cohesion_resistance = resistance;

            if same_material_neighbors == 0 {
                continue;
            }

            // Centering: pull own COM toward the cell centre.
            let centering_mag = (cohesion * length(com) * fill).min(10.0 * cohesion);
            let centering_dir = crate::vector::normalize_or_zero([-com[0], -com[1]]);
            let centering = [centering_dir[0] * centering_mag, centering_dir[1] * centering_mag];

            // Clustering: pull toward the weighted centre of same-material
            // neighbors, applied only when non-opposing to centering.
            let max_connections = 8.0;
            let avg_nx = cluster_center[0] / same_material_neighbors as f64;
            let avg_ny = cluster_center[1] / same_material_neighbors as f64;
            let to_cluster = [avg_nx - x as f64 - com[0], avg_ny - y as f64 - com[1]];
            let d = length(to_cluster);
            let clustering_mag =
                (cohesion * (total_neighbor_fill / max_connections) * (1.0 / (d + 0.1)) * fill).min(10.0 * cohesion);
            let clustering_dir = crate::vector::normalize_or_zero(to_cluster);

            let dot = clustering_dir[0] * centering_dir[0] + clustering_dir[1] * centering_dir[1];
            let clustering = if dot >= 0.0 {
                [clustering_dir[0] * clustering_mag, clustering_dir[1] * clustering_mag]
            } else {
                [0.0, 0.0]
            };

            let cell = grid.at_mut(x as usize, y as usize);
            cell.pending_force[0] += strength * (0.5 * clustering[0] + 1.0 * centering[0]);
            cell.pending_force[1] += strength * (0.5 * clustering[1] + 1.0 * centering[1]);
        }
    }
}

pub fn accumulate_adhesion(grid: &mut Grid, settings: &PhysicsSettings) {
    if !settings.adhesion_enabled {
        return;
    }
    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let strength = settings.adhesion_strength;
    let diag = std::f64::consts::FRAC_1_SQRT_2;

    let materials: Vec<_> = grid.cells().iter().map(|c| (c.material, c.fill_ratio)).collect();

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let (material, fill) = materials[idx];
            if material == crate::material::Material::Air {
                continue;
            }
            let adh_self = material.properties().adhesion;

            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        continue;
                    }
                    let n_idx = (ny * width + nx) as usize;
                    let (n_material, n_fill) = materials[n_idx];
                    if n_material == crate::material::Material::Air || n_material == material {
                        continue;
                    }
                    let adh_n = n_material.properties().adhesion;
                    let cardinal_factor = if dx == 0 || dy == 0 { 1.0 } else { diag };
                    let magnitude = (adh_self * adh_n).max(0.0).sqrt() * fill * n_fill * cardinal_factor * strength;
                    let len = ((dx * dx + dy * dy) as f64).sqrt();
                    let dir = [dx as f64 / len, dy as f64 / len];
                    let cell = grid.at_mut(x as usize, y as usize);
                    cell.pending_force[0] += dir[0] * magnitude;
                    cell.pending_force[1] += dir[1] * magnitude;
                }
            }
        }
    }
}

/// Contact friction between cardinal-adjacent cells, visited once per
/// unordered pair (spec.md §4.6).
pub fn accumulate_friction(grid: &mut Grid, settings: &PhysicsSettings) {
    if !settings.friction_enabled {
        return;
    }
    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let strength = settings.friction_strength;

    for y in 0..height {
        for x in 0..width {
            // Only the east and south neighbor, to visit each pair once.
            for (dx, dy) in [(1isize, 0isize), (0, 1)] {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= width || ny >= height {
                    continue;
                }
                let a = *grid.at(x as usize, y as usize);
                let b = *grid.at(nx as usize, ny as usize);
                if a.is_empty() || a.is_wall() || b.is_empty() || b.is_wall() {
                    continue;
                }

                let pressure_diff = (a.pressure() - b.pressure()).max(0.0) * a.fill_ratio;
                let gravity_term = if dy != 0 {
                    // Vertical interface: add the gravity weight of the
                    // upper cell.
                    settings.gravity * a.effective_density()
                } else {
                    0.0
                };
                let normal_force = pressure_diff + gravity_term;
                if normal_force < MIN_NORMAL_FORCE {
                    continue;
                }

                let rel = [a.velocity[0] - b.velocity[0], a.velocity[1] - b.velocity[1]];
                // Tangential component: perpendicular to the contact normal.
                let tangent = if dx != 0 { [0.0, rel[1]] } else { [rel[0], 0.0] };
                let tangential_speed = length(tangent);
                if tangential_speed < MIN_TANGENTIAL_SPEED {
                    continue;
                }

                let avg_speed = 0.5 * (length(a.velocity) + length(b.velocity));
                let mu_a = friction_coeff(avg_speed, a.material.properties());
                let mu_b = friction_coeff(avg_speed, b.material.properties());
                let mu = (mu_a * mu_b).max(0.0).sqrt();
                let mu_eff = 1.0 + (mu - 1.0) * strength;

                let magnitude = mu_eff * normal_force * strength;
                let dir: Vec2 = crate::vector::normalize_or_zero([-tangent[0], -tangent[1]]);
                let force = [dir[0] * magnitude, dir[1] * magnitude];

                let cell_a = grid.at_mut(x as usize, y as usize);
                cell_a.pending_force[0] += force[0];
                cell_a.pending_force[1] += force[1];
                let cell_b = grid.at_mut(nx as usize, ny as usize);
                cell_b.pending_force[0] -= force[0];
                cell_b.pending_force[1] -= force[1];
            }
        }
    }
}

/// Runs every enabled force term in spec.md §4.6 order.
pub fn accumulate_all(grid: &mut Grid, settings: &PhysicsSettings) {
    clear_pending_forces(grid);
    accumulate_gravity(grid, settings);
    accumulate_air_drag(grid, settings);
    accumulate_pressure_force(grid, settings);
    accumulate_cohesion(grid, settings);
    accumulate_adhesion(grid, settings);
    accumulate_friction(grid, settings);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::material::Material;

    #[test]
    fn gravity_only_affects_nonempty_nonwall_cells() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Sand, 1.0);
        grid.replace(0, 0, Material::Wall, 1.0);
        let settings = PhysicsSettings::default();
        accumulate_gravity(&mut grid, &settings);
        assert_eq!(grid.at(1, 1).pending_force[1], settings.gravity);
        assert_eq!(grid.at(0, 0).pending_force, [0.0, 0.0]);
        assert_eq!(grid.at(0, 1).pending_force, [0.0, 0.0]);
    }

    #[test]
    fn disabled_gravity_adds_nothing() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Sand, 1.0);
        let mut settings = PhysicsSettings::default();
        settings.gravity_enabled = false;
        accumulate_gravity(&mut grid, &settings);
        assert_eq!(grid.at(1, 1).pending_force, [0.0, 0.0]);
    }

    #[test]
    fn air_drag_opposes_velocity() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Water, 1.0);
        grid.at_mut(1, 1).velocity = [3.0, 0.0];
        let mut settings = PhysicsSettings::default();
        settings.air_resistance = 0.5;
        accumulate_air_drag(&mut grid, &settings);
        assert!(grid.at(1, 1).pending_force[0] < 0.0);
    }

    #[test]
    fn friction_is_equal_and_opposite() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Sand, 1.0);
        grid.replace(1, 2, Material::Sand, 1.0);
        grid.at_mut(1, 1).velocity = [5.0, 0.0];
        grid.at_mut(1, 2).velocity = [0.0, 0.0];
        grid.at_mut(1, 1).set_hydrostatic_pressure(3.0);
        let settings = PhysicsSettings::default();
        accumulate_friction(&mut grid, &settings);
        let fa = grid.at(1, 1).pending_force;
        let fb = grid.at(1, 2).pending_force;
        assert!((fa[0] + fb[0]).abs() < 1e-9);
        assert!((fa[1] + fb[1]).abs() < 1e-9);
    }
}
