//! Error types for the serialization and configuration boundary.
//!
//! Precondition faults (bad coordinates, out-of-range material ids) are
//! programmer errors and stay as `assert!`/`debug_assert!` at the call site
//! instead of going through this enum, matching how the original C++ engine
//! uses `assert(index < ...)` for the same class of fault.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid scenario config: {0}")]
    InvalidScenario(String),

    #[error("json (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render-frame buffer too small: need {need} bytes, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    #[error("unknown scenario tag: {0}")]
    UnknownScenarioTag(String),
}

pub type SimResult<T> = Result<T, SimError>;
