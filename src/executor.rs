//! Move executor (spec.md §2 component 10, §4.11).
//!
//! Grounded on `Nopey-sand`'s `motion_step`'s `mem::swap`-based cell
//! exchange, extended with the per-world seeded shuffle required by
//! spec.md §9 and the collision-type dispatch table of
//! `WorldCollisionCalculator.h`.

use crate::collision::{classify, CollisionType};
use crate::grid::Grid;
use crate::material::dynamic_weight;
use crate::pressure::BlockedTransfer;
use crate::rng::WorldRng;
use crate::settings::PhysicsSettings;
use crate::transfer::MaterialMove;
use crate::vector::length;

const SWAP_ENERGY_COST: f64 = 0.95;
/// Fraction of fragmented mass that actually sprays outward; the rest is
/// retained at the source as dynamic pressure (spec.md §4.11).
const FRAGMENTATION_SPRAY_MIN_TARGETS: usize = 2;

/// Executes every proposed move in randomized order, returning the
/// transfers that were partially or fully rejected by their target
/// (spec.md §4.11).
pub fn execute_moves(
    grid: &mut Grid,
    mut moves: Vec<MaterialMove>,
    rng: &mut WorldRng,
    settings: &PhysicsSettings,
) -> Vec<BlockedTransfer> {
    rng.shuffle(&mut moves);
    let mut blocked = Vec::new();

    for mv in moves {
        let (fx, fy) = mv.from;
        let (tx, ty) = mv.to;

        if grid.at(fx, fy).is_empty() {
            continue; // already drained by an earlier move this frame
        }

        apply_pressure_from_excess(grid, &mv, settings);

        let from_cell = *grid.at(fx, fy);
        let to_cell = *grid.at(tx, ty);
        let classification = classify(&from_cell, &to_cell, &mv, settings);

        if classification.propose_swap {
            swap_cells(grid, (fx, fy), (tx, ty));
            continue;
        }

        let requested = (mv.amount - mv.pressure_from_excess).max(0.0);
        if requested <= 0.0 {
            continue;
        }

        match classification.collision_type {
            CollisionType::TransferOnly => {
                transfer_with_blocked_remainder(grid, &mv, requested, &mut blocked);
            }
            CollisionType::InelasticCollision { .. } => {
                transfer_with_blocked_remainder(grid, &mv, requested, &mut blocked);
                let cell = grid.at_mut(fx, fy);
                cell.velocity[0] *= crate::consts::INELASTIC_RESTITUTION_FACTOR;
                cell.velocity[1] *= crate::consts::INELASTIC_RESTITUTION_FACTOR;
            }
            CollisionType::ElasticReflection => {
                let v = from_cell.velocity;
                let n = mv.boundary_normal;
                let v_dot_n = v[0] * n[0] + v[1] * n[1];
                let v_normal = [n[0] * v_dot_n, n[1] * v_dot_n];
                let reflected = [v[0] - 2.0 * v_normal[0], v[1] - 2.0 * v_normal[1]];
                grid.at_mut(fx, fy).velocity = reflected;
            }
            CollisionType::Fragmentation => {
                fragment(grid, &mv, requested, rng, settings);
            }
            CollisionType::Absorption => {
                transfer_with_blocked_remainder(grid, &mv, requested, &mut blocked);
            }
        }
    }

    blocked
}

fn apply_pressure_from_excess(grid: &mut Grid, mv: &MaterialMove, settings: &PhysicsSettings) {
    if mv.pressure_from_excess <= 0.0 {
        return;
    }
    let weight = dynamic_weight(mv.material) * settings.pressure_dynamic_strength;
    let (tx, ty) = mv.to;
    let (fx, fy) = mv.from;
    if grid.at(tx, ty).is_wall() {
        grid.at_mut(fx, fy).add_dynamic_pressure(mv.pressure_from_excess * weight);
    } else {
        grid.at_mut(tx, ty).add_dynamic_pressure(mv.pressure_from_excess * weight);
    }
}

fn transfer_with_blocked_remainder(
    grid: &mut Grid,
    mv: &MaterialMove,
    requested: f64,
    blocked: &mut Vec<BlockedTransfer>,
) {
    let (fx, fy) = mv.from;
    let (tx, ty) = mv.to;
    let source_com = grid.at(fx, fy).com;
    let velocity = grid.at(fx, fy).velocity;

    let added = grid.add_material_with_physics(tx, ty, mv.material, requested, source_com, velocity, mv.boundary_normal);
    if added > 0.0 {
        grid.at_mut(fx, fy).remove_material(added);
    }

    let rejected = requested - added;
    if rejected > 1e-9 {
        let to_velocity = grid.at(tx, ty).velocity;
        let v_rel = [velocity[0] - to_velocity[0], velocity[1] - to_velocity[1]];
        let delta_ke = 0.5 * rejected * mv.material.density() * length(v_rel).powi(2);
        blocked.push(BlockedTransfer {
            from: mv.from,
            to: mv.to,
            material: mv.material,
            amount: rejected,
            velocity,
            delta_ke,
        });
    }
}

fn swap_cells(grid: &mut Grid, a: (usize, usize), b: (usize, usize)) {
    let mut ca = *grid.at(a.0, a.1);
    let mut cb = *grid.at(b.0, b.1);
    std::mem::swap(&mut ca.material, &mut cb.material);
    std::mem::swap(&mut ca.fill_ratio, &mut cb.fill_ratio);
    std::mem::swap(&mut ca.velocity, &mut cb.velocity);
    std::mem::swap(&mut ca.com, &mut cb.com);
    // Swap energy cost: the moving side pays a small velocity deduction.
    ca.velocity[0] *= SWAP_ENERGY_COST;
    ca.velocity[1] *= SWAP_ENERGY_COST;
    *grid.at_mut(a.0, a.1) = ca;
    *grid.at_mut(b.0, b.1) = cb;
}

fn fragment(grid: &mut Grid, mv: &MaterialMove, requested: f64, rng: &mut WorldRng, settings: &PhysicsSettings) {
    let (fx, fy) = mv.from;
    let ix = fx as isize;
    let iy = fy as isize;

    let mut empty_neighbors = Vec::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = ix + dx;
            let ny = iy + dy;
            if let Some(n) = grid.get(nx, ny) {
                if n.is_empty() {
                    empty_neighbors.push((nx as usize, ny as usize));
                }
            }
        }
    }
    rng.shuffle(&mut empty_neighbors);

    if empty_neighbors.len() < FRAGMENTATION_SPRAY_MIN_TARGETS {
        // Nowhere to spray: the whole request becomes dynamic pressure.
        grid.at_mut(fx, fy).add_dynamic_pressure(requested * dynamic_weight(mv.material));
        grid.at_mut(fx, fy).remove_material(requested);
        return;
    }

    let spray_fraction = settings.fragmentation_spray_fraction.clamp(0.0, 1.0);
    let sprayed_total = requested * spray_fraction;
    let leftover = requested - sprayed_total;
    let n_targets = empty_neighbors.len();
    let per_target = sprayed_total / n_targets as f64;
    let source_com = grid.at(fx, fy).com;
    let base_velocity = grid.at(fx, fy).velocity;

    for (nx, ny) in empty_neighbors {
        let jitter = [rng.gen_range_f64(-0.5, 0.5), rng.gen_range_f64(-0.5, 0.5)];
        let velocity = [base_velocity[0] * 0.5 + jitter[0], base_velocity[1] * 0.5 + jitter[1]];
        let mut normal = [0.0, 0.0];
        let dx = nx as isize - ix;
        let dy = ny as isize - iy;
        if dx.abs() > dy.abs() {
            normal[0] = dx.signum() as f64;
        } else {
            normal[1] = dy.signum() as f64;
        }
        grid.add_material_with_physics(nx, ny, mv.material, per_target, source_com, velocity, normal);
    }

    grid.at_mut(fx, fy).remove_material(sprayed_total);
    if leftover > 0.0 {
        grid.at_mut(fx, fy).add_dynamic_pressure(leftover * dynamic_weight(mv.material));
        grid.at_mut(fx, fy).remove_material(leftover);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::material::Material;

    #[test]
    fn transfer_only_moves_mass_and_clears_source() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Water, 0.5);
        grid.at_mut(1, 1).velocity = [1.0, 0.0];
        let mv = MaterialMove {
            from: (1, 1),
            to: (2, 1),
            material: Material::Water,
            amount: 0.5,
            velocity: [1.0, 0.0],
            boundary_normal: [1.0, 0.0],
            pressure_from_excess: 0.0,
        };
        let mut rng = WorldRng::new(1);
        let settings = PhysicsSettings::default();
        let blocked = execute_moves(&mut grid, vec![mv], &mut rng, &settings);
        assert!(blocked.is_empty());
        assert!(grid.at(1, 1).is_empty());
        assert_eq!(grid.at(2, 1).material, Material::Water);
        assert!((grid.at(2, 1).fill_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn transfer_into_full_target_is_blocked() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Water, 0.5);
        grid.replace(2, 1, Material::Water, 1.0);
        let mv = MaterialMove {
            from: (1, 1),
            to: (2, 1),
            material: Material::Water,
            amount: 0.5,
            velocity: [1.0, 0.0],
            boundary_normal: [1.0, 0.0],
            pressure_from_excess: 0.0,
        };
        let mut rng = WorldRng::new(1);
        let settings = PhysicsSettings::default();
        let blocked = execute_moves(&mut grid, vec![mv], &mut rng, &settings);
        assert_eq!(blocked.len(), 1);
        assert!((blocked[0].amount - 0.5).abs() < 1e-9);
    }
}
