//! Support analyzer (spec.md §2 component 4, §4.4).
//!
//! Grounded on `original_source/core/WorldSupportCalculator.h` for the
//! constants and three-tier support model (vertical / horizontal /
//! structural), and on the pack's `sunaba` `pressure_system.rs`
//! `VecDeque`-driven bounded propagation for the structural BFS's style.

use std::collections::VecDeque;

use crate::consts::*;
use crate::grid::Grid;
use crate::material::Material;

/// Runs the support pass once per frame, before forces, writing
/// `has_vertical_support` and `has_any_support` (structural) into every
/// cell (spec.md §4.4).
pub fn compute_support(grid: &mut Grid) {
    let width = grid.width();
    let height = grid.height();

    let mut vertical = vec![false; width * height];
    for x in 0..width {
        // Bottom-up: the bottom row is always vertically supported.
        let mut supported_below = true;
        for y in (0..height).rev() {
            let idx = y * width + x;
            let cell = &grid.cells()[idx];
            if cell.is_empty() {
                supported_below = false;
                vertical[idx] = false;
                continue;
            }
            if y == height - 1 {
                vertical[idx] = true;
            } else {
                vertical[idx] = supported_below;
            }
            supported_below = vertical[idx];
        }
    }

    let mut structural = vec![false; width * height];
    for y in 0..height {
        for x in 0..width {
            structural[y * width + x] = has_structural_support(grid, x, y, &vertical);
        }
    }

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let cell = grid.at_mut(x, y);
            cell.has_vertical_support = vertical[idx];
            cell.has_any_support = structural[idx];
        }
    }
}

/// Vertical support: the cell directly below must itself be non-empty and
/// vertically supported; any gap breaks the chain immediately. Exposed for
/// unit tests and the recursive definition in spec.md; `compute_support`'s
/// bottom-up scan is the efficient equivalent used in the frame loop.
pub fn has_vertical_support(grid: &Grid, x: usize, y: usize) -> bool {
    if y + 1 >= grid.height() {
        return true;
    }
    let cy = y + 1;
    let below = grid.at(x, cy);
    if below.is_empty() {
        return false;
    }
    if cy == grid.height() - 1 {
        return true;
    }
    has_vertical_support(grid, x, cy)
}

/// Horizontal support: an immediate 8-neighbor with density above the rigid
/// threshold AND geometric-mean adhesion above the strong-adhesion
/// threshold (spec.md §4.4).
pub fn has_horizontal_support(grid: &Grid, x: usize, y: usize) -> bool {
    let cell = grid.at(x, y);
    if cell.is_empty() {
        return false;
    }
    let ix = x as isize;
    let iy = y as isize;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if let Some(n) = grid.get(ix + dx, iy + dy) {
                if n.is_empty() {
                    continue;
                }
                if n.material.density() > RIGID_DENSITY_THRESHOLD {
                    let adh = (cell.material.properties().adhesion * n.material.properties().adhesion)
                        .max(0.0)
                        .sqrt();
                    if adh > STRONG_ADHESION_THRESHOLD {
                        return true;
                    }
                }
            }
        }
    }
    false
}

fn has_structural_support(grid: &Grid, x: usize, y: usize, vertical: &[bool]) -> bool {
    let cell = grid.at(x, y);
    if cell.is_wall() {
        return true;
    }
    if cell.is_empty() {
        return false;
    }
    if y == grid.height() - 1 {
        return true;
    }
    if cell.material.density() > RIGID_DENSITY_THRESHOLD {
        return true;
    }
    if vertical[y * grid.width() + x] {
        return true;
    }

    // Bounded-radius BFS through same-material connected cells, reaching the
    // bottom edge, a wall (rigid materials only), or a dense neighbor.
    let material = cell.material;
    let is_rigid = material.is_rigid();
    let width = grid.width();
    let height = grid.height();

    let mut visited = vec![false; width * height];
    let mut queue = VecDeque::new();
    visited[y * width + x] = true;
    queue.push_back((x, y, 0u32));

    while let Some((cx, cy, dist)) = queue.pop_front() {
        if dist >= MAX_SUPPORT_DISTANCE {
            continue;
        }
        let ix = cx as isize;
        let iy = cy as isize;
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = ix + dx;
                let ny = iy + dy;
                if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                    continue;
                }
                let (nxu, nyu) = (nx as usize, ny as usize);
                if visited[nyu * width + nxu] {
                    continue;
                }
                let neighbor = grid.at(nxu, nyu);

                if neighbor.is_wall() {
                    if is_rigid {
                        return true;
                    }
                    continue;
                }
                if neighbor.is_empty() {
                    continue;
                }
                if nyu == height - 1 {
                    return true;
                }
                if neighbor.material.density() > RIGID_DENSITY_THRESHOLD {
                    return true;
                }
                if neighbor.material == material {
                    visited[nyu * width + nxu] = true;
                    queue.push_back((nxu, nyu, dist + 1));
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::material::Material;

    #[test]
    fn bottom_row_is_always_vertically_supported() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 2, Material::Sand, 1.0);
        compute_support(&mut grid);
        assert!(grid.at(1, 2).has_vertical_support);
    }

    #[test]
    fn floating_cell_has_no_vertical_support() {
        let mut grid = Grid::new(3, 6);
        grid.replace(1, 0, Material::Sand, 1.0);
        // gap below, nothing underneath within range
        compute_support(&mut grid);
        assert!(!grid.at(1, 0).has_vertical_support);
    }

    #[test]
    fn stacked_column_propagates_support_upward() {
        let mut grid = Grid::new(3, 4);
        for y in 0..4 {
            grid.replace(1, y, Material::Sand, 1.0);
        }
        compute_support(&mut grid);
        for y in 0..4 {
            assert!(grid.at(1, y).has_vertical_support, "y={y}");
        }
    }

    #[test]
    fn wall_always_has_structural_support() {
        let mut grid = Grid::new(3, 3);
        grid.replace(1, 1, Material::Wall, 1.0);
        compute_support(&mut grid);
        assert!(grid.at(1, 1).has_any_support);
    }

    #[test]
    fn gap_breaks_the_vertical_support_chain() {
        let mut grid = Grid::new(3, 6);
        grid.replace(1, 0, Material::Sand, 1.0);
        // y=1 is empty, y=2 is full: the gap must break the chain even
        // though support resumes further down.
        grid.replace(1, 2, Material::Sand, 1.0);
        assert!(!has_vertical_support(&grid, 1, 0));
    }

    #[test]
    fn diagonally_connected_blob_reaching_bottom_is_structurally_supported() {
        let mut grid = Grid::new(3, 3);
        // A staircase of sand connected only diagonally, reaching the bottom
        // row at (2,2).
        grid.replace(0, 0, Material::Sand, 1.0);
        grid.replace(1, 1, Material::Sand, 1.0);
        grid.replace(2, 2, Material::Sand, 1.0);
        compute_support(&mut grid);
        assert!(grid.at(0, 0).has_any_support, "diagonal chain should reach the bottom row");
    }
}
