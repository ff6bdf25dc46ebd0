// src/loops/lateral.rs

//! # Lateral Cascade
//!
//! Localizer offset to heading reference, heading error to bank reference,
//! bank error to aileron deflection. Heading errors are evaluated relative to
//! the runway heading and wrapped into (−π, π], so a course crossing the
//! ±180 degree seam never shows up as a full-circle error.

use crate::config::{AutolandConfig, ConfigError};
use crate::filter::{shift_in, Number, TransferFn};
use crate::loops::directional_limit;

/// Wraps `heading − center` into (−π, π] by a single ±2π correction.
/// Inputs are assumed to be within one turn of the center.
pub(crate) fn wrap_relative<T: Number>(heading: T, center: T) -> T {
    let rel = heading - center;
    if rel < -T::PI() {
        rel + T::TAU()
    } else if rel > T::PI() {
        rel - T::TAU()
    } else {
        rel
    }
}

/// Localizer loop: cross-track angular offset in, heading reference out.
pub struct LocalizerLoop<T: Number> {
    controller: TransferFn<T, 3, 3>,
    lambda: [T; 3],
    psi_ref: [T; 3],
    near_range: T,
    near_scale: T,
}

impl<T: Number> LocalizerLoop<T> {
    /// Builds the loop from the localizer stage of `config`.
    pub fn new(config: &AutolandConfig<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: TransferFn::new(
                "localizer controller",
                config.localizer_control.num,
                config.localizer_control.den,
            )?,
            lambda: [T::zero(); 3],
            psi_ref: [T::zero(); 3],
            near_range: config.near_range,
            near_scale: config.near_scale,
        })
    }

    /// One tick: records the (negated) localizer angle and returns a heading
    /// reference in radians.
    ///
    /// The localizer angle grows without bound as the down-range distance
    /// shrinks; inside `near_range` the tracked offset is scaled down by
    /// `near_scale · |down_range|` instead of chased directly.
    pub fn update(&mut self, lambda_now: T, down_range: T) -> T {
        let range = down_range.abs();
        let tracked = if range > self.near_range {
            -lambda_now
        } else {
            -(self.near_scale * range * lambda_now)
        };
        shift_in(tracked, &mut self.lambda);
        self.controller.step(&self.lambda, &mut self.psi_ref)
    }

    /// Clears every history vector to zero.
    pub fn reset(&mut self) {
        self.lambda = [T::zero(); 3];
        self.psi_ref = [T::zero(); 3];
    }
}

/// Heading loop: runway-relative heading error in, bank reference out.
pub struct HeadingLoop<T: Number> {
    prefilter: TransferFn<T, 3, 3>,
    controller: TransferFn<T, 2, 2>,
    psi_ref: [T; 3],
    psi_filt: [T; 3],
    psi: [T; 2],
    error: [T; 2],
    phi_ref: [T; 2],
    runway_heading: T,
    bank_limit: T,
}

impl<T: Number> HeadingLoop<T> {
    /// Builds the loop from the heading stages of `config`.
    pub fn new(config: &AutolandConfig<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            prefilter: TransferFn::new(
                "heading prefilter",
                config.heading_prefilter.num,
                config.heading_prefilter.den,
            )?,
            controller: TransferFn::new(
                "heading controller",
                config.heading_control.num,
                config.heading_control.den,
            )?,
            psi_ref: [T::zero(); 3],
            psi_filt: [T::zero(); 3],
            psi: [T::zero(); 2],
            error: [T::zero(); 2],
            phi_ref: [T::zero(); 2],
            runway_heading: config.runway.heading,
            bank_limit: config.bank_limit,
        })
    }

    /// One tick: wraps the measured heading about the runway heading, runs
    /// the prefilter and controller, and returns a bank reference in radians,
    /// directionally saturated against `phi_now`.
    pub fn update(&mut self, psi_ref_now: T, psi_now: T, phi_now: T) -> T {
        shift_in(wrap_relative(psi_now, self.runway_heading), &mut self.psi);
        shift_in(psi_ref_now, &mut self.psi_ref);
        self.prefilter.step(&self.psi_ref, &mut self.psi_filt);
        shift_in(self.psi_filt[0] - self.psi[0], &mut self.error);
        let raw = self.controller.step(&self.error, &mut self.phi_ref);
        let reference = directional_limit(raw, phi_now, self.bank_limit);
        self.phi_ref[0] = reference;
        reference
    }

    /// Clears every history vector to zero.
    pub fn reset(&mut self) {
        self.psi_ref = [T::zero(); 3];
        self.psi_filt = [T::zero(); 3];
        self.psi = [T::zero(); 2];
        self.error = [T::zero(); 2];
        self.phi_ref = [T::zero(); 2];
    }
}

/// Bank loop: bank-angle error in, aileron deflection out.
pub struct BankLoop<T: Number> {
    prefilter: TransferFn<T, 3, 3>,
    controller: TransferFn<T, 5, 5>,
    phi_ref: [T; 3],
    phi_filt: [T; 3],
    error: [T; 5],
    aileron: [T; 5],
    aileron_limit: T,
}

impl<T: Number> BankLoop<T> {
    /// Builds the loop from the bank stages of `config`.
    pub fn new(config: &AutolandConfig<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            prefilter: TransferFn::new(
                "bank prefilter",
                config.bank_prefilter.num,
                config.bank_prefilter.den,
            )?,
            controller: TransferFn::new(
                "bank controller",
                config.bank_control.num,
                config.bank_control.den,
            )?,
            phi_ref: [T::zero(); 3],
            phi_filt: [T::zero(); 3],
            error: [T::zero(); 5],
            aileron: [T::zero(); 5],
            aileron_limit: config.aileron_limit,
        })
    }

    /// One tick: records the bank reference, runs the prefilter, shifts the
    /// scalar error (filtered reference minus measured roll) into the error
    /// history, and returns the constrained aileron deflection in radians.
    /// The constrained value is written back into the output history.
    pub fn update(&mut self, phi_ref_now: T, phi_now: T) -> T {
        shift_in(phi_ref_now, &mut self.phi_ref);
        self.prefilter.step(&self.phi_ref, &mut self.phi_filt);
        shift_in(self.phi_filt[0] - phi_now, &mut self.error);
        let raw = self.controller.step(&self.error, &mut self.aileron);
        let command = raw.clamp(-self.aileron_limit, self.aileron_limit);
        self.aileron[0] = command;
        command
    }

    /// Clears every history vector to zero.
    pub fn reset(&mut self) {
        self.phi_ref = [T::zero(); 3];
        self.phi_filt = [T::zero(); 3];
        self.error = [T::zero(); 5];
        self.aileron = [T::zero(); 5];
    }
}
