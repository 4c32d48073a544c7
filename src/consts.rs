//! Named constants from spec.md, collected in one place the way the original
//! engine collects them as `static constexpr` members on each calculator.

pub const MIN_FILL_THRESHOLD: f64 = 0.001;
pub const MAX_FILL_THRESHOLD: f64 = 0.999;
pub const MIN_MATTER_THRESHOLD: f64 = 0.001;
pub const COM_MIN: f64 = -1.0;
pub const COM_MAX: f64 = 1.0;

pub const MAX_SUPPORT_DISTANCE: u32 = 10;
pub const RIGID_DENSITY_THRESHOLD: f64 = 5.0;
pub const STRONG_ADHESION_THRESHOLD: f64 = 0.5;

pub const MIN_PRESSURE_THRESHOLD: f64 = 0.001;

pub const MIN_SUPPORT_FACTOR: f64 = 0.05;

pub const MIN_NORMAL_FORCE: f64 = 0.01;
pub const MIN_TANGENTIAL_SPEED: f64 = 1e-6;

pub const MAX_VELOCITY_PER_TIMESTEP: f64 = 200.0;
pub const DAMPING_THRESHOLD_PER_TIMESTEP: f64 = 100.0;
pub const DAMPING_FACTOR_PER_TIMESTEP: f64 = 0.05;

pub const FRAGMENTATION_THRESHOLD: f64 = 15.0;
pub const INELASTIC_RESTITUTION_FACTOR: f64 = 0.5;

pub const COM_CLAMP_INSET: f64 = 1e-4;
