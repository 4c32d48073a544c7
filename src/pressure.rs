//! Pressure subsystem (spec.md §2 component 5, §4.5).
//!
//! Grounded on the pack's `12a34568_arturh85-sunaba` `pressure_system.rs`
//! for the decay -> accumulate -> propagate -> apply ordering and the
//! explicit per-cell accumulator style; the exact formulas (hydrostatic
//! column scan, dynamic weight table, harmonic-mean diffusion with wall
//! reflection, CFL clip) follow spec.md §4.5 and
//! `original_source/core/WorldPressureCalculator.cpp`.

use crate::consts::*;
use crate::grid::Grid;
use crate::material::{dynamic_weight, hydrostatic_weight, Material};
use crate::settings::PhysicsSettings;
use crate::vector::Vec2;

/// A proposed move whose target refused some or all of the mass; its
/// unreceived kinetic energy becomes dynamic pressure (spec.md §3.4,
/// glossary "Blocked transfer").
#[derive(Debug, Clone, Copy)]
pub struct BlockedTransfer {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub material: Material,
    pub amount: f64,
    pub velocity: Vec2,
    pub delta_ke: f64,
}

const SLICE_THICKNESS: f64 = 1.0;
const DIFFUSION_EPS: f64 = 1e-6;

/// Hydrostatic build-up (spec.md §4.5.1): computed at the end of the
/// current frame, it becomes next frame's hydrostatic pressure.
pub fn compute_hydrostatic(grid: &mut Grid, settings: &PhysicsSettings) {
    let width = grid.width();
    let height = grid.height();

    if !settings.pressure_hydrostatic_enabled {
        for y in 0..height {
            for x in 0..width {
                if !grid.at(x, y).is_wall() {
                    grid.at_mut(x, y).set_hydrostatic_pressure(0.0);
                }
            }
        }
        return;
    }

    let g = settings.gravity.abs();
    let strength = settings.pressure_hydrostatic_strength;

    for x in 0..width {
        // Bottom-up: mark "has support below", restored by WALL/rigid/dense
        // materials, broken by any empty cell, propagated through anything
        // else.
        let mut supported = vec![false; height];
        let mut has_support = true; // conceptual floor beneath the grid
        for y in (0..height).rev() {
            let cell = grid.at(x, y);
            if cell.is_wall() || cell.material.is_rigid() || cell.material.density() > RIGID_DENSITY_THRESHOLD {
                has_support = true;
            } else if cell.is_empty() {
                has_support = false;
            }
            supported[y] = has_support;
        }

        // Top-down: accumulate column weight into supported cells only.
        let mut accum = 0.0_f64;
        for y in 0..height {
            let is_wall = grid.at(x, y).is_wall();
            let is_empty = grid.at(x, y).is_empty();
            if is_wall {
                continue;
            }
            if !supported[y] || is_empty {
                grid.at_mut(x, y).set_hydrostatic_pressure(0.0);
                continue;
            }

            grid.at_mut(x, y).set_hydrostatic_pressure(accum);

            let material = grid.at(x, y).material;
            let fill = grid.at(x, y).fill_ratio;
            // A rigid/dense material embedded in a fluid column transmits
            // the surrounding fluid's weight rather than adding its own
            // (a submerged solid doesn't add net hydrostatic weight to the
            // fluid column around it).
            let contributing_material = if material.is_fluid() {
                material
            } else {
                let above = if y > 0 { Some(grid.at(x, y - 1).material) } else { None };
                let below = if y + 1 < height { Some(grid.at(x, y + 1).material) } else { None };
                above
                    .filter(|m| m.is_fluid())
                    .or_else(|| below.filter(|m| m.is_fluid()))
                    .unwrap_or(material)
            };

            let contribution =
                fill * contributing_material.density() * hydrostatic_weight(contributing_material) * g * SLICE_THICKNESS * strength;
            accum += contribution;
        }
    }
}

/// Dynamic pressure injection from blocked transfers (spec.md §4.5.2).
pub fn apply_blocked_transfers(grid: &mut Grid, blocked: &[BlockedTransfer], settings: &PhysicsSettings) {
    if !settings.pressure_dynamic_enabled {
        return;
    }
    let strength = settings.pressure_dynamic_strength;

    for bt in blocked {
        let (tx, ty) = bt.to;
        let (fx, fy) = bt.from;
        let target_is_wall = grid.at(tx, ty).is_wall();

        if target_is_wall {
            let e_source = bt.material.properties().elasticity;
            let e_wall = Material::Wall.properties().elasticity;
            let restitution = (e_source * e_wall).max(0.0).sqrt() * (1.0 - 0.1 * (bt.delta_ke / 10.0).min(1.0));
            let reflected = bt.delta_ke * restitution * dynamic_weight(bt.material) * strength;
            if reflected > 0.0 {
                grid.at_mut(fx, fy).add_dynamic_pressure(reflected);
            }
        } else {
            if grid.at(tx, ty).is_empty() {
                continue;
            }
            let deposit = bt.delta_ke * dynamic_weight(bt.material) * strength;
            if deposit > 0.0 {
                grid.at_mut(tx, ty).add_dynamic_pressure(deposit);
            }
        }
    }
}

struct Direction {
    dx: isize,
    dy: isize,
    weight: f64,
}

fn directions(eight: bool) -> Vec<Direction> {
    let mut dirs = vec![
        Direction { dx: 1, dy: 0, weight: 1.0 },
        Direction { dx: -1, dy: 0, weight: 1.0 },
        Direction { dx: 0, dy: 1, weight: 1.0 },
        Direction { dx: 0, dy: -1, weight: 1.0 },
    ];
    if eight {
        let diag = std::f64::consts::FRAC_1_SQRT_2;
        dirs.push(Direction { dx: 1, dy: 1, weight: diag });
        dirs.push(Direction { dx: 1, dy: -1, weight: diag });
        dirs.push(Direction { dx: -1, dy: 1, weight: diag });
        dirs.push(Direction { dx: -1, dy: -1, weight: diag });
    }
    dirs
}

/// One explicit diffusion step (spec.md §4.5.3). Double-buffers the delta
/// into a scratch array so the update is order-independent within the step.
pub fn diffuse(grid: &mut Grid, settings: &PhysicsSettings) {
    if !settings.pressure_diffusion_enabled {
        return;
    }
    let iterations = settings.pressure_diffusion_iterations.max(1);
    let dirs = directions(settings.use_eight_neighborhood);
    let strength = settings.pressure_diffusion_strength;
    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let n = grid.cell_count();

    for _ in 0..iterations {
        let mut delta = vec![0.0_f64; n];
        let old_pressure: Vec<f64> = grid.cells().iter().map(|c| c.pressure()).collect();

        for y in 0..height {
            for x in 0..width {
                let idx = (y * width + x) as usize;
                let cell = &grid.cells()[idx];
                if cell.is_wall() || cell.is_empty() {
                    continue;
                }
                let d_i = cell.material.properties().pressure_diffusion;
                let p_i = old_pressure[idx];

                for dir in &dirs {
                    let nx = x + dir.dx;
                    let ny = y + dir.dy;
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        // Ghost cell: same pressure as centre, no flux.
                        continue;
                    }
                    let n_idx = (ny * width + nx) as usize;
                    let neighbor = &grid.cells()[n_idx];

                    if neighbor.is_wall() {
                        let flux_would_be = strength * d_i * p_i * dir.weight;
                        let props = cell.material.properties();
                        let r = (0.7 * props.elasticity + 0.3 * (1.0 - props.density / 10.0))
                            * (1.0 - (-10.0 * flux_would_be.abs()).exp());
                        delta[idx] += r * flux_would_be;
                        continue;
                    }

                    let d_j = neighbor.material.properties().pressure_diffusion;
                    let p_j = old_pressure[n_idx];
                    let d_ij = 2.0 * d_i * d_j / (d_i + d_j + DIFFUSION_EPS) * dir.weight;
                    let flux = strength * d_ij * (p_i - p_j);
                    delta[idx] -= flux;
                    if !neighbor.is_empty() {
                        delta[n_idx] += flux;
                    }
                    // Empty cells are zero-pressure sinks: flux vanishes.
                }
            }
        }

        for idx in 0..n {
            let cell = &grid.cells()[idx];
            if cell.is_wall() || cell.is_empty() {
                continue;
            }
            let p_old = old_pressure[idx];
            let bound = 0.5 * p_old + 0.1;
            let clipped = delta[idx].clamp(-bound, bound);
            let p_new = (p_old + clipped).max(0.0);

            let cell = &mut grid.cells_mut()[idx];
            if p_old > 1e-9 {
                let ratio = p_new / p_old;
                cell.hydrostatic_component *= ratio;
                cell.dynamic_component *= ratio;
            } else {
                cell.hydrostatic_component = 0.0;
                cell.dynamic_component = p_new;
            }
        }
    }
}

/// Decay & gradient update (spec.md §4.5.4, §4.5.5), run once per frame.
pub fn decay_and_update_gradient(grid: &mut Grid, settings: &PhysicsSettings, dt: f64) {
    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let decay = (1.0 - settings.pressure_decay_rate * dt).max(0.0);
    let n = grid.cell_count();

    for idx in 0..n {
        let cell = &grid.cells()[idx];
        if cell.is_wall() || cell.is_empty() {
            continue;
        }
        let p_old = cell.pressure();
        let p_new = p_old * decay;
        let cell = &mut grid.cells_mut()[idx];
        if p_old > 1e-9 {
            let ratio = p_new / p_old;
            cell.hydrostatic_component *= ratio;
            cell.dynamic_component *= ratio;
        }
    }

    let dirs = directions(settings.use_eight_neighborhood);
    let n_dirs = dirs.len() as f64;
    let pressures: Vec<f64> = grid.cells().iter().map(|c| c.pressure()).collect();
    let materials: Vec<Material> = grid.cells().iter().map(|c| c.material).collect();

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            if materials[idx] == Material::Wall {
                continue;
            }
            let p_center = pressures[idx];
            if p_center <= MIN_PRESSURE_THRESHOLD {
                grid.at_mut(x as usize, y as usize).pressure_gradient = [0.0, 0.0];
                continue;
            }

            let mut diffs = Vec::with_capacity(dirs.len());
            let mut blocked_total = 0.0_f64;
            let mut num_open = 0usize;
            for dir in &dirs {
                let nx = x + dir.dx;
                let ny = y + dir.dy;
                let (is_wall, p_neighbor) = if nx < 0 || ny < 0 || nx >= width || ny >= height {
                    (false, 0.0)
                } else {
                    let n_idx = (ny * width + nx) as usize;
                    (materials[n_idx] == Material::Wall, pressures[n_idx])
                };
                if is_wall {
                    blocked_total += p_center * dir.weight;
                    diffs.push(None);
                } else {
                    diffs.push(Some(p_center - p_neighbor));
                    num_open += 1;
                }
            }

            let redistribution = if num_open > 0 { blocked_total / num_open as f64 } else { 0.0 };

            let mut grad = [0.0_f64, 0.0];
            for (dir, diff) in dirs.iter().zip(diffs.iter()) {
                let effective_diff = match diff {
                    Some(d) => *d + redistribution,
                    None => continue,
                };
                let len = ((dir.dx * dir.dx + dir.dy * dir.dy) as f64).sqrt();
                let unit = [dir.dx as f64 / len, dir.dy as f64 / len];
                grad[0] += effective_diff * unit[0] * dir.weight;
                grad[1] += effective_diff * unit[1] * dir.weight;
            }
            grad[0] /= n_dirs;
            grad[1] /= n_dirs;
            grid.at_mut(x as usize, y as usize).pressure_gradient = grad;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::material::Material;

    #[test]
    fn pure_water_column_hydrostatic_matches_formula() {
        let mut grid = Grid::new(1, 5);
        for y in 0..5 {
            grid.replace(0, y, Material::Water, 1.0);
        }
        let mut settings = PhysicsSettings::default();
        settings.gravity = 1.0;
        settings.pressure_hydrostatic_strength = 1.0;
        settings.pressure_diffusion_enabled = false;

        compute_hydrostatic(&mut grid, &settings);

        for y in 0..5 {
            let expected = y as f64 * 1.0 * Material::Water.density() * hydrostatic_weight(Material::Water);
            assert!(
                (grid.at(0, y).hydrostatic_component - expected).abs() < 1e-9,
                "y={y} expected={expected} got={}",
                grid.at(0, y).hydrostatic_component
            );
        }
    }

    #[test]
    fn submerged_solid_does_not_perturb_water_column_pressure() {
        let mut grid = Grid::new(1, 5);
        for y in 0..5 {
            if y == 2 {
                grid.replace(0, y, Material::Metal, 1.0);
            } else {
                grid.replace(0, y, Material::Water, 1.0);
            }
        }
        let mut settings = PhysicsSettings::default();
        settings.gravity = 1.0;
        settings.pressure_hydrostatic_strength = 1.0;

        compute_hydrostatic(&mut grid, &settings);

        for y in 0..5 {
            let expected = y as f64 * 1.0 * Material::Water.density() * hydrostatic_weight(Material::Water);
            assert!(
                (grid.at(0, y).hydrostatic_component - expected).abs() < 1e-9,
                "y={y} expected={expected} got={}",
                grid.at(0, y).hydrostatic_component
            );
        }
    }

    #[test]
    fn pressure_never_negative_after_decay() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Water, 1.0);
        grid.at_mut(1, 1).set_hydrostatic_pressure(5.0);
        let settings = PhysicsSettings::default();
        decay_and_update_gradient(&mut grid, &settings, 0.016);
        assert!(grid.at(1, 1).pressure() >= 0.0);
    }
}
