//! Small `Vec2` helpers built on top of the `vecmath` crate, the same crate
//! the teacher board used for its `Vector2<f32>` motion/velocity fields.

use vecmath::*;

pub type Vec2 = Vector2<f64>;

pub const ZERO: Vec2 = [0.0, 0.0];

/// Caps a vector to unit length, leaving shorter vectors untouched.
/// Mirrors `Nopey-sand`'s `cap_vec`.
pub fn cap_vec(v: Vec2) -> Vec2 {
    if vec2_square_len(v) > 1.0 {
        vec2_normalized(v)
    } else {
        v
    }
}

/// Normalizes `v`, returning `[0,0]` instead of NaN for a zero-length input.
/// Required by spec.md §9 ("NaN containment ... all `normalize` must guard
/// against zero length").
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let len_sq = vec2_square_len(v);
    if len_sq < 1e-12 {
        ZERO
    } else {
        vec2_scale(v, 1.0 / len_sq.sqrt())
    }
}

/// Clamps both components of `v` into `[-bound, bound]`.
pub fn clamp_vec(v: Vec2, bound: f64) -> Vec2 {
    [v[0].clamp(-bound, bound), v[1].clamp(-bound, bound)]
}

/// Clamps `v` to `[-1,1]^2` with a small inward inset, used when a COM is
/// pinned to a boundary after a reflection (spec.md §4.9).
pub fn clamp_com_with_inset(v: Vec2, inset: f64) -> Vec2 {
    clamp_vec(v, 1.0 - inset)
}

pub fn length(v: Vec2) -> f64 {
    vec2_len(v)
}

/// Floors a denominator at `0.001` before reciprocal use, per spec.md §9's
/// NaN-containment rule for every `/x` in the velocity integrator.
pub fn safe_denom(x: f64) -> f64 {
    if x.abs() < 0.001 {
        0.001
    } else {
        x
    }
}
