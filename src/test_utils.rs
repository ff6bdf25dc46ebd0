// src/test_utils.rs

//! Shared helpers for the unit tests.

/// Absolute tolerance used when comparing floating-point results in tests.
pub const TEST_TOLERANCE: f32 = 1e-5;

/// Returns `true` when `value` lies within [`TEST_TOLERANCE`] of `target`.
pub fn value_close(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE
}

/// Returns `true` when `value` differs from `target` by at least
/// [`TEST_TOLERANCE`]. Used where a test asserts that state genuinely
/// changed, not merely that it stayed equal.
pub fn value_not_close(target: f32, value: f32) -> bool {
    TEST_TOLERANCE <= (target - value).abs()
}
