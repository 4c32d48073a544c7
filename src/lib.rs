//! A 2D cellular-automaton physics core for granular and fluid materials.
//!
//! The crate is organized as one module per pipeline stage (spec.md §2):
//! material constants, the cell/grid store, per-frame derived caches,
//! support analysis, pressure, forces, velocity integration, transfer
//! planning, collision classification, move execution, scenario event
//! generation, and the `World` frame driver that orchestrates them.

pub mod bitmap;
pub mod cell;
pub mod collision;
pub mod consts;
pub mod error;
pub mod events;
pub mod executor;
pub mod forces;
pub mod grid;
pub mod material;
pub mod pressure;
pub mod rng;
pub mod settings;
pub mod support;
pub mod transfer;
pub mod vector;
pub mod velocity;
pub mod world;

pub mod serialize;

pub use cell::Cell;
pub use error::{SimError, SimResult};
pub use events::{ConfigurableEventGenerator, EventGenerator, ScenarioConfig};
pub use grid::Grid;
pub use material::Material;
pub use settings::PhysicsSettings;
pub use world::{World, WorldSnapshot};
