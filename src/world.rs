//! Frame driver / `World` context (spec.md §2 component 12, §4.12, §6.5).
//!
//! Grounded on `Nopey-sand`'s `Board::step` (explicit ordered sub-steps
//! called from one method), generalized to the 14-step order of spec.md
//! §4.12; the named-timer tree follows `ScopeTimer`'s intent
//! (`original_source/core/ScopeTimer.h`) using plain `std::time::Instant`
//! accumulation rather than reproducing its macro-based API.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::bitmap::EmptyBitmap;
use crate::cell::Cell;
use crate::events::EventGenerator;
use crate::executor::execute_moves;
use crate::forces;
use crate::grid::Grid;
use crate::material::Material;
use crate::pressure::{apply_blocked_transfers, compute_hydrostatic, decay_and_update_gradient, diffuse};
use crate::rng::WorldRng;
use crate::settings::PhysicsSettings;
use crate::support::compute_support;
use crate::transfer::plan_transfers;
use crate::vector::Vec2;

/// Row-snapshot debug record for `World::row_debug` (spec.md §6.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CellDebugInfo {
    pub x: usize,
    pub material: Material,
    pub fill_ratio: f64,
    pub velocity: Vec2,
    pub pressure: f64,
    pub has_any_support: bool,
}

/// Lossless snapshot of simulation state (spec.md §6.4); `World` itself
/// owns transient caches and timers that aren't part of the serialized
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub grid: Grid,
    pub settings: PhysicsSettings,
    pub rng_seed: u64,
    pub step: u64,
}

pub struct World {
    grid: Grid,
    settings: PhysicsSettings,
    rng: WorldRng,
    step: u64,
    empty_bitmap: EmptyBitmap,
    timers: BTreeMap<&'static str, Duration>,
}

impl World {
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        let mut grid = Grid::new(width, height);
        grid.install_boundary_walls();
        let empty_bitmap = EmptyBitmap::build(&grid);
        World {
            grid,
            settings: PhysicsSettings::default(),
            rng: WorldRng::new(seed),
            step: 0,
            empty_bitmap,
            timers: BTreeMap::new(),
        }
    }

    pub fn from_snapshot(snapshot: WorldSnapshot) -> Self {
        let empty_bitmap = EmptyBitmap::build(&snapshot.grid);
        World {
            grid: snapshot.grid,
            settings: snapshot.settings,
            rng: WorldRng::new(snapshot.rng_seed),
            step: snapshot.step,
            empty_bitmap,
            timers: BTreeMap::new(),
        }
    }

    pub fn to_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            grid: self.grid.clone(),
            settings: self.settings.clone(),
            rng_seed: self.rng.seed(),
            step: self.step,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.grid.width(), self.grid.height())
    }

    pub fn timestep(&self) -> u64 {
        self.step
    }

    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.grid.at(x, y)
    }

    pub fn total_mass(&self) -> f64 {
        self.grid.total_mass()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut PhysicsSettings {
        &mut self.settings
    }

    pub fn rng_mut(&mut self) -> &mut WorldRng {
        &mut self.rng
    }

    pub fn empty_bitmap(&self) -> &EmptyBitmap {
        &self.empty_bitmap
    }

    pub fn row_debug(&self, y: usize) -> Vec<CellDebugInfo> {
        (0..self.grid.width())
            .map(|x| {
                let cell = self.grid.at(x, y);
                CellDebugInfo {
                    x,
                    material: cell.material,
                    fill_ratio: cell.fill_ratio,
                    velocity: cell.velocity,
                    pressure: cell.pressure(),
                    has_any_support: cell.has_any_support,
                }
            })
            .collect()
    }

    fn time<F: FnOnce(&mut Self)>(&mut self, label: &'static str, f: F) {
        let start = Instant::now();
        f(self);
        *self.timers.entry(label).or_insert(Duration::ZERO) += start.elapsed();
    }

    /// Runs one frame: event injection (by the caller, via `events`), then
    /// the fixed internal order of spec.md §4.12 steps 2-13.
    pub fn step(&mut self, events: &mut dyn EventGenerator, dt: f64) {
        let dt = dt * self.settings.timescale;
        let step = self.step;

        self.time("event_generator_tick", |world| {
            events.tick(world, dt, step);
        });

        self.time("rebuild_bitmap", |world| {
            world.empty_bitmap = EmptyBitmap::build(&world.grid);
        });

        self.time("compute_support", |world| {
            compute_support(&mut world.grid);
        });

        self.time("accumulate_forces", |world| {
            forces::accumulate_all(&mut world.grid, &world.settings);
        });

        self.time("integrate_velocity", |world| {
            crate::velocity::integrate(&mut world.grid, &world.settings, dt);
        });

        let moves = {
            let mut result = Vec::new();
            self.time("plan_transfers", |world| {
                result = plan_transfers(&mut world.grid, dt);
            });
            result
        };

        let blocked = {
            let mut result = Vec::new();
            self.time("execute_moves", |world| {
                result = execute_moves(&mut world.grid, moves, &mut world.rng, &world.settings);
            });
            result
        };

        self.time("compute_hydrostatic", |world| {
            compute_hydrostatic(&mut world.grid, &world.settings);
        });

        self.time("apply_blocked_transfers", |world| {
            apply_blocked_transfers(&mut world.grid, &blocked, &world.settings);
        });

        self.time("diffuse_pressure", |world| {
            diffuse(&mut world.grid, &world.settings);
        });

        self.time("decay_and_gradient", |world| {
            decay_and_update_gradient(&mut world.grid, &world.settings, dt);
        });

        self.step += 1;
    }

    /// Prints the accumulated per-stage timer tree (spec.md §6.5).
    pub fn dump_timers(&self) {
        for (label, duration) in &self.timers {
            log::info!("{label}: {duration:?}");
        }
    }
}
