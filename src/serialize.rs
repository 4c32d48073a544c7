//! JSON + binary render-frame serialization (spec.md §2 component §6.4).
//!
//! The JSON path is a plain `serde` round-trip of [`WorldSnapshot`]; the
//! binary render-frame path packs per-cell fields into fixed-width POD
//! structs via `bytemuck`, the way the pack's sibling `Wumpf-blub` repo
//! casts GPU-bound vertex data.

use bytemuck::{Pod, Zeroable};

use crate::error::{SimError, SimResult};
use crate::world::{World, WorldSnapshot};

pub fn to_json(world: &World) -> SimResult<String> {
    Ok(serde_json::to_string(&world.to_snapshot())?)
}

pub fn from_json(json: &str) -> SimResult<World> {
    let snapshot: WorldSnapshot = serde_json::from_str(json)?;
    Ok(World::from_snapshot(snapshot))
}

/// `{u8 material, u8 fill}` per cell (spec.md §6.4 *basic* render frame).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BasicCell {
    pub material: u8,
    pub fill: u8,
}

/// 24-byte debug render frame cell layout (spec.md §6.4).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DebugCell {
    pub material: u8,
    pub fill: u8,
    pub has_any_support: u8,
    pub has_vertical_support: u8,
    pub com_x: i16,
    pub com_y: i16,
    pub vel_x: i16,
    pub vel_y: i16,
    pub p_hydro: u16,
    pub p_dynamic: u16,
    pub grad_x: f32,
    pub grad_y: f32,
}

fn quantize_symmetric(value: f64, domain: f64) -> i16 {
    let clamped = value.clamp(-domain, domain);
    (clamped / domain * 32767.0).round() as i16
}

fn quantize_pressure(value: f64) -> u16 {
    let clamped = value.clamp(0.0, 1000.0);
    (clamped / 1000.0 * 65535.0).round() as u16
}

pub fn encode_render_frame_basic(world: &World) -> Vec<u8> {
    let (width, height) = world.dimensions();
    let mut cells = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let cell = world.cell(x, y);
            cells.push(BasicCell {
                material: cell.material as u8,
                fill: (cell.fill_ratio.clamp(0.0, 1.0) * 255.0).round() as u8,
            });
        }
    }
    bytemuck::cast_slice(&cells).to_vec()
}

pub fn encode_render_frame_debug(world: &World) -> Vec<u8> {
    let (width, height) = world.dimensions();
    let mut cells = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let cell = world.cell(x, y);
            cells.push(DebugCell {
                material: cell.material as u8,
                fill: (cell.fill_ratio.clamp(0.0, 1.0) * 255.0).round() as u8,
                has_any_support: cell.has_any_support as u8,
                has_vertical_support: cell.has_vertical_support as u8,
                com_x: quantize_symmetric(cell.com[0], 1.0),
                com_y: quantize_symmetric(cell.com[1], 1.0),
                vel_x: quantize_symmetric(cell.velocity[0], 10.0),
                vel_y: quantize_symmetric(cell.velocity[1], 10.0),
                p_hydro: quantize_pressure(cell.hydrostatic_component),
                p_dynamic: quantize_pressure(cell.dynamic_component),
                grad_x: cell.pressure_gradient[0] as f32,
                grad_y: cell.pressure_gradient[1] as f32,
            });
        }
    }
    bytemuck::cast_slice(&cells).to_vec()
}

/// Sparse overlay of organism membership: `(organism_id, flat cell indices)`
/// pairs, skipping `organism_id == 0` (spec.md §6.4).
pub fn encode_organism_overlay(world: &World) -> Vec<(u32, Vec<u32>)> {
    let (width, height) = world.dimensions();
    let mut by_organism: std::collections::BTreeMap<u32, Vec<u32>> = std::collections::BTreeMap::new();
    for y in 0..height {
        for x in 0..width {
            let cell = world.cell(x, y);
            if cell.organism_id != 0 {
                by_organism.entry(cell.organism_id).or_default().push((y * width + x) as u32);
            }
        }
    }
    by_organism.into_iter().collect()
}

pub fn decode_render_frame_basic(bytes: &[u8], width: usize, height: usize) -> SimResult<Vec<BasicCell>> {
    let need = width * height * std::mem::size_of::<BasicCell>();
    if bytes.len() < need {
        return Err(SimError::BufferTooSmall { need, got: bytes.len() });
    }
    Ok(bytemuck::cast_slice(&bytes[..need]).to_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json_round_trips_world_state() {
        let mut world = World::new(5, 5, 3);
        world.grid_mut().replace(2, 2, crate::material::Material::Water, 0.6);
        let json = to_json(&world).unwrap();
        let restored = from_json(&json).unwrap();
        assert_eq!(restored.cell(2, 2).material, crate::material::Material::Water);
        assert!((restored.cell(2, 2).fill_ratio - 0.6).abs() < 1e-9);
    }

    #[test]
    fn basic_render_frame_has_two_bytes_per_cell() {
        let world = World::new(4, 4, 1);
        let bytes = encode_render_frame_basic(&world);
        assert_eq!(bytes.len(), 4 * 4 * 2);
    }

    #[test]
    fn debug_render_frame_has_24_bytes_per_cell() {
        let world = World::new(4, 4, 1);
        let bytes = encode_render_frame_debug(&world);
        assert_eq!(bytes.len(), 4 * 4 * 24);
    }

    #[test]
    fn com_quantization_maps_extremes_to_extremes() {
        assert_eq!(quantize_symmetric(1.0, 1.0), 32767);
        assert_eq!(quantize_symmetric(-1.0, 1.0), -32767);
        assert_eq!(quantize_symmetric(0.0, 1.0), 0);
    }
}
