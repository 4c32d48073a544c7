//! Transfer planner (spec.md §2 component 8, §4.9).
//!
//! Grounded on `Nopey-sand`'s `motion_step` (a COM-like `motion` accumulator,
//! `velocity_to_offset` picking the dominant axis, `mem::swap`-based cell
//! exchange), generalized from single-axis nearest-neighbor stepping to
//! multi-axis boundary-crossing detection that produces `MaterialMove`
//! records instead of stepping cells directly.

use crate::grid::Grid;
use crate::material::Material;
use crate::vector::{length, Vec2};

/// A proposed transfer of mass from one cell toward an adjacent one,
/// produced when a cell's advected centre-of-mass crosses a cell boundary
/// (spec.md §3.5, §4.9).
#[derive(Debug, Clone, Copy)]
pub struct MaterialMove {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub material: Material,
    pub amount: f64,
    pub velocity: Vec2,
    pub boundary_normal: Vec2,
    /// Mass requested beyond the target's remaining capacity at plan time;
    /// the executor applies it to the target first, reflecting to source
    /// if the target is a wall (spec.md §4.11 step 2a).
    pub pressure_from_excess: f64,
}

/// Advances every non-empty, non-wall cell's COM by `v*dt`, detects
/// boundary crossings, proposes moves for in-bounds crossings, and applies
/// boundary reflections immediately for out-of-bounds crossings (spec.md
/// §4.9).
pub fn plan_transfers(grid: &mut Grid, dt: f64) -> Vec<MaterialMove> {
    let width = grid.width();
    let height = grid.height();
    let mut moves = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let cell = *grid.at(x, y);
            if cell.is_empty() || cell.is_wall() {
                continue;
            }

            // Cohesion's binding-resistance scalar acts as a kinetic-energy
            // threshold: a cell bonded tightly enough to its neighbors
            // doesn't advect at all this tick unless it's moving hard
            // enough to break the bond.
            if cell.cohesion_resistance > 0.0 {
                let speed = length(cell.velocity);
                let kinetic = 0.5 * cell.mass() * speed * speed;
                if kinetic < cell.cohesion_resistance {
                    continue;
                }
            }

            let new_com = [
                cell.com[0] + cell.velocity[0] * dt,
                cell.com[1] + cell.velocity[1] * dt,
            ];

            let mut crossed = [false, false];
            let mut oob = [false, false];

            for axis in 0..2 {
                if new_com[axis].abs() < 1.0 {
                    continue;
                }
                crossed[axis] = true;
                let sign = new_com[axis].signum();
                let (dx, dy) = if axis == 0 { (sign as isize, 0isize) } else { (0isize, sign as isize) };
                let tx = x as isize + dx;
                let ty = y as isize + dy;

                if grid.in_bounds(tx, ty) {
                    let amount = cell.total_material();
                    let target_capacity = grid.at(tx as usize, ty as usize).capacity();
                    let allowed = amount.min(target_capacity.max(0.0));
                    let excess = (amount - allowed).max(0.0);
                    let mut normal = [0.0, 0.0];
                    normal[axis] = sign;
                    moves.push(MaterialMove {
                        from: (x, y),
                        to: (tx as usize, ty as usize),
                        material: cell.material,
                        amount,
                        velocity: cell.velocity,
                        boundary_normal: normal,
                        pressure_from_excess: excess,
                    });
                } else {
                    oob[axis] = true;
                }
            }

            if oob[0] || oob[1] {
                let elasticity = cell.material.properties().elasticity;
                let target = grid.at_mut(x, y);
                let mut v = target.velocity;
                for axis in 0..2 {
                    if oob[axis] {
                        v[axis] = -v[axis] * elasticity;
                    }
                }
                target.velocity = v;
                target.com = new_com;
                target.clamp_com_after_reflection();
            }

            // Axes that neither crossed in-bounds nor went OOB: advance COM
            // directly.
            let target = grid.at_mut(x, y);
            for axis in 0..2 {
                if !crossed[axis] {
                    target.com[axis] = new_com[axis];
                }
            }
        }
    }

    moves
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::material::Material;

    #[test]
    fn uncrossed_axis_advances_com_directly() {
        let mut grid = Grid::new(5, 5);
        grid.replace(2, 2, Material::Water, 1.0);
        grid.at_mut(2, 2).velocity = [0.1, 0.0];
        plan_transfers(&mut grid, 1.0);
        assert!((grid.at(2, 2).com[0] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn in_bounds_crossing_produces_a_move() {
        let mut grid = Grid::new(5, 5);
        grid.replace(2, 2, Material::Water, 1.0);
        grid.at_mut(2, 2).velocity = [5.0, 0.0];
        let moves = plan_transfers(&mut grid, 1.0);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].from, (2, 2));
        assert_eq!(moves[0].to, (3, 2));
    }

    #[test]
    fn out_of_bounds_crossing_reflects_velocity() {
        let mut grid = Grid::new(3, 3);
        grid.replace(0, 1, Material::Water, 1.0);
        grid.at_mut(0, 1).velocity = [-5.0, 0.0];
        let elasticity = Material::Water.properties().elasticity;
        let moves = plan_transfers(&mut grid, 1.0);
        assert!(moves.is_empty());
        assert!(grid.at(0, 1).velocity[0] > 0.0);
        assert!((grid.at(0, 1).velocity[0] - 5.0 * elasticity).abs() < 1e-9);
        assert!(grid.at(0, 1).com[0] <= 1.0 && grid.at(0, 1).com[0] >= -1.0);
    }

    #[test]
    fn strong_cohesion_resistance_suppresses_advection() {
        let mut grid = Grid::new(5, 5);
        grid.replace(2, 2, Material::Water, 1.0);
        grid.at_mut(2, 2).velocity = [5.0, 0.0];
        grid.at_mut(2, 2).cohesion_resistance = 1e6;
        let moves = plan_transfers(&mut grid, 1.0);
        assert!(moves.is_empty());
        assert_eq!(grid.at(2, 2).com, [0.0, 0.0]);
    }
}
