// src/loops.rs

//! # Control-Loop Cascades
//!
//! One module per cascade: longitudinal (glideslope, flare, pitch tracking),
//! lateral (localizer, heading, bank), and speed (airspeed-to-throttle).
//! Each loop owns its history vectors and exposes `update` and `reset`;
//! sequencing and phase selection belong to
//! [`Autoland`](crate::autoland::Autoland).

pub mod lateral;
pub mod longitudinal;
pub mod speed;

pub use lateral::*;
pub use longitudinal::*;
pub use speed::*;

use crate::filter::Number;

/// Directional saturation: clamps `reference` to `±limit` only while the
/// current state is already beyond the limit, so a reference that reduces the
/// excursion always passes through unchanged.
pub(crate) fn directional_limit<T: Number>(reference: T, current: T, limit: T) -> T {
    if current.abs() > limit {
        reference.clamp(-limit, limit)
    } else {
        reference
    }
}
