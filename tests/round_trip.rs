//! Serialization round-trip properties (spec.md §8.2).

use cellsim::events::{ConfigurableEventGenerator, SandboxConfig};
use cellsim::material::Material;
use cellsim::serialize::{decode_render_frame_basic, encode_render_frame_basic, from_json, to_json};
use cellsim::{ScenarioConfig, World};

fn populated_world() -> World {
    let mut world = World::new(12, 12, 11);
    let mut generator = ConfigurableEventGenerator::new(ScenarioConfig::Sandbox(SandboxConfig::default()));
    cellsim::EventGenerator::setup(&mut generator, &mut world);
    for _ in 0..15 {
        world.step(&mut generator, 1.0 / 60.0);
    }
    world
}

#[test]
fn json_round_trip_is_byte_identical_when_reserialized() {
    let world = populated_world();
    let first = to_json(&world).unwrap();
    let restored = from_json(&first).unwrap();
    let second = to_json(&restored).unwrap();
    assert_eq!(first, second);
}

#[test]
fn json_round_trip_preserves_every_cell_exactly() {
    let world = populated_world();
    let json = to_json(&world).unwrap();
    let restored = from_json(&json).unwrap();

    let (width, height) = world.dimensions();
    assert_eq!(restored.dimensions(), (width, height));
    for y in 0..height {
        for x in 0..width {
            let a = world.cell(x, y);
            let b = restored.cell(x, y);
            assert_eq!(a.material, b.material);
            assert_eq!(a.fill_ratio, b.fill_ratio);
            assert_eq!(a.com, b.com);
            assert_eq!(a.velocity, b.velocity);
        }
    }
}

#[test]
fn binary_render_frame_round_trips_within_quantization() {
    let mut world = World::new(6, 6, 9);
    world.grid_mut().replace(3, 3, Material::Water, 0.77);

    let bytes = encode_render_frame_basic(&world);
    let (width, height) = world.dimensions();
    let decoded = decode_render_frame_basic(&bytes, width, height).unwrap();

    let idx = 3 * width + 3;
    assert_eq!(decoded[idx].material, Material::Water as u8);
    let fill_back = decoded[idx].fill as f64 / 255.0;
    assert!((fill_back - 0.77).abs() < 1.0 / 255.0, "fill_back={fill_back}");
}

#[test]
fn decoding_a_short_buffer_reports_buffer_too_small() {
    let err = decode_render_frame_basic(&[0u8; 3], 4, 4).unwrap_err();
    match err {
        cellsim::SimError::BufferTooSmall { need, got } => {
            assert_eq!(need, 4 * 4 * 2);
            assert_eq!(got, 3);
        }
        other => panic!("expected BufferTooSmall, got {other:?}"),
    }
}
