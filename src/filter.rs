// src/filter.rs

//! # Discrete Transfer-Function Engine
//!
//! Generic evaluator for the discrete-time transfer functions that make up
//! every control loop in the autoland cascade. The engine knows nothing about
//! flight semantics: it operates on caller-owned *history vectors*, fixed
//! length arrays of recent samples ordered newest-first (index 0 is the most
//! recent sample).
//!
//! Each [`TransferFn`] combines a numerator polynomial applied to an input
//! history with a denominator polynomial applied to past outputs. The leading
//! denominator coefficient normalizes the weighted sum and must be non-zero;
//! this is validated at construction so a malformed table can never divide
//! incorrectly at runtime.
//!
//! There is no reset operation here: clearing a loop means the owner zeroes
//! its history vectors directly.

use core::fmt;

use num_traits::float::{FloatConst, FloatCore};

use crate::config::ConfigError;

/// Base number requirements for every control-law scalar.
///
/// Saturation uses [`FloatCore::clamp`] from the supertrait; only the
/// integer conversion needs a default method of its own.
pub trait Number: FloatCore + FloatConst + fmt::Debug {
    /// Converts an `i32` into the scalar type. Used for fixed-point sensor
    /// deltas and unit scale factors; lossless for every float type this
    /// crate is instantiated with.
    fn from_i32(value: i32) -> Self {
        num_traits::NumCast::from(value).unwrap_or_else(Self::zero)
    }
}

impl<T: FloatCore + FloatConst + fmt::Debug> Number for T {}

/// Shifts a history vector down by one slot and writes `value` at index 0.
///
/// Used to record a measured or externally computed sample before the
/// histories are consumed by [`TransferFn::step`].
pub fn shift_in<T: Copy, const L: usize>(value: T, history: &mut [T; L]) {
    for i in (1..L).rev() {
        history[i] = history[i - 1];
    }
    if let Some(newest) = history.first_mut() {
        *newest = value;
    }
}

/// A discrete transfer function with an order-`N` numerator and an order-`D`
/// denominator. Coefficient/history length agreement is enforced by the type.
#[derive(Debug, Clone, Copy)]
pub struct TransferFn<T, const N: usize, const D: usize> {
    num: [T; N],
    den: [T; D],
}

impl<T: Number, const N: usize, const D: usize> TransferFn<T, N, D> {
    /// Validates and wraps a coefficient table. `stage` names the control-law
    /// stage the table belongs to, for error reporting.
    ///
    /// Fails if any coefficient is non-finite or the leading denominator
    /// coefficient (the normalization divisor) is zero.
    pub fn new(stage: &'static str, num: [T; N], den: [T; D]) -> Result<Self, ConfigError> {
        if num.iter().chain(den.iter()).any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFiniteCoefficient(stage));
        }
        match den.first() {
            Some(leading) if *leading != T::zero() => Ok(Self { num, den }),
            _ => Err(ConfigError::ZeroLeadingDenominator(stage)),
        }
    }

    /// Computes a new output sample from the input history, shifts the output
    /// history down by one, and stores the new sample at index 0.
    ///
    /// The new sample is
    /// `(Σ num[i]·input[i] − Σ_{i=1..D-1} den[i]·output[i−1]) / den[0]`,
    /// where `output[i−1]` refers to the history before the shift. Effects
    /// are confined to `output`; `input` is read-only.
    pub fn step(&self, input: &[T; N], output: &mut [T; D]) -> T {
        let mut acc = T::zero();
        for (c, x) in self.num.iter().zip(input.iter()) {
            acc = acc + *c * *x;
        }
        self.recurse(acc, output)
    }

    /// Identical to [`step`](Self::step), but the numerator sum is taken over
    /// the elementwise difference `a[i] − b[i]` of two input histories. Used
    /// where a loop's input is the error between a tracked reference and a
    /// measurement.
    pub fn step_error(&self, a: &[T; N], b: &[T; N], output: &mut [T; D]) -> T {
        let mut acc = T::zero();
        for ((c, x), y) in self.num.iter().zip(a.iter()).zip(b.iter()) {
            acc = acc + *c * (*x - *y);
        }
        self.recurse(acc, output)
    }

    fn recurse(&self, weighted_input: T, output: &mut [T; D]) -> T {
        let mut acc = weighted_input;
        for i in (1..D).rev() {
            output[i] = output[i - 1];
            acc = acc - self.den[i] * output[i];
        }
        acc = acc / self.den[0];
        output[0] = acc;
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Saturation in the loops goes through the `Number` bound; the clamp
    /// must resolve to exactly one method there and behave symmetrically.
    #[test]
    fn test_number_clamp_resolves_through_bound() {
        fn constrain<T: Number>(value: T, limit: T) -> T {
            value.clamp(-limit, limit)
        }
        assert!(value_close(0.5, constrain(0.5f32, 1.0)));
        assert!(value_close(1.0, constrain(2.0f32, 1.0)));
        assert!(value_close(-1.0, constrain(-2.0f32, 1.0)));
    }

    #[test]
    fn test_shift_in_moves_history_down() {
        let mut history = [1.0, 2.0, 3.0];
        shift_in(9.0, &mut history);
        assert_eq!([9.0, 1.0, 2.0], history, "Oldest sample should drop off.");
    }

    #[test]
    fn test_shift_in_single_slot() {
        let mut history = [4.0];
        shift_in(7.0, &mut history);
        assert_eq!([7.0], history);
    }

    /// The documented weighted-sum formula, checked against a hand-computed
    /// second-order example.
    #[test]
    fn test_step_weighted_sum_and_shift() {
        let tf = TransferFn::new("test", [1.0, 2.0], [2.0, 1.0]).unwrap();
        let input = [3.0f32, 4.0];
        let mut output = [5.0f32, 6.0];

        // acc = 1*3 + 2*4 = 11; shift output -> [_, 5]; acc -= 1*5 = 6;
        // acc /= 2 = 3.
        let new = tf.step(&input, &mut output);

        assert!(value_close(3.0, new), "New sample should be 3.");
        assert!(
            value_close(3.0, output[0]) && value_close(5.0, output[1]),
            "History should hold the new sample then the prior index-0 value."
        );
        assert_eq!([3.0, 4.0], input, "Input history must not be modified.");
    }

    #[test]
    fn test_step_error_uses_history_difference() {
        let tf = TransferFn::new("test", [1.0, 2.0], [2.0, 1.0]).unwrap();
        let a = [3.0f32, 4.0];
        let b = [1.0f32, 1.0];
        let mut output = [5.0f32, 6.0];

        // acc = 1*(3-1) + 2*(4-1) = 8; acc -= 1*5 = 3; acc /= 2 = 1.5.
        let new = tf.step_error(&a, &b, &mut output);

        assert!(value_close(1.5, new));
        assert!(value_close(1.5, output[0]) && value_close(5.0, output[1]));
    }

    /// A pure gain in a first-order denominator behaves as a divider.
    #[test]
    fn test_step_leading_denominator_divides() {
        let tf = TransferFn::new("test", [1.0], [4.0]).unwrap();
        let input = [8.0f32];
        let mut output = [0.0f32];

        let new = tf.step(&input, &mut output);
        assert!(value_close(2.0, new), "den[0] should divide the raw sum.");
    }

    #[test]
    fn test_new_rejects_zero_leading_denominator() {
        let result = TransferFn::new("stage", [1.0, 0.0], [0.0, 1.0]);
        assert_eq!(
            Err(crate::config::ConfigError::ZeroLeadingDenominator("stage")),
            result.map(|_| ())
        );
    }

    #[test]
    fn test_new_rejects_non_finite_coefficients() {
        let result = TransferFn::new("stage", [f32::NAN, 0.0], [1.0, 0.0]);
        assert_eq!(
            Err(crate::config::ConfigError::NonFiniteCoefficient("stage")),
            result.map(|_| ())
        );

        let result = TransferFn::new("stage", [1.0, 0.0], [1.0, f32::INFINITY]);
        assert_eq!(
            Err(crate::config::ConfigError::NonFiniteCoefficient("stage")),
            result.map(|_| ())
        );
    }
}
