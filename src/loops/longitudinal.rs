// src/loops/longitudinal.rs

//! # Longitudinal Cascade
//!
//! Three loops feed the elevator. On approach the glideslope loop turns a
//! glideslope-angle error into a pitch reference; in flare a height/sink-rate
//! loop takes its place. Either way the pitch-tracking loop turns the pitch
//! reference into an elevator deflection.
//!
//! Pitch inputs are trim-relative: the caller subtracts the trimmed approach
//! pitch attitude before the cascade sees the measurement.

use crate::config::{AutolandConfig, ConfigError};
use crate::filter::{shift_in, Number, TransferFn};
use crate::loops::directional_limit;

/// Pitch-tracking loop: prefiltered pitch reference against measured pitch,
/// elevator deflection out.
pub struct PitchLoop<T: Number> {
    prefilter: TransferFn<T, 4, 4>,
    controller: TransferFn<T, 4, 4>,
    theta_ref: [T; 4],
    theta_filt: [T; 4],
    theta: [T; 4],
    elevator: [T; 4],
    elevator_limit: T,
}

impl<T: Number> PitchLoop<T> {
    /// Builds the loop from the pitch stages of `config`.
    pub fn new(config: &AutolandConfig<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            prefilter: TransferFn::new(
                "pitch prefilter",
                config.pitch_prefilter.num,
                config.pitch_prefilter.den,
            )?,
            controller: TransferFn::new(
                "pitch controller",
                config.pitch_control.num,
                config.pitch_control.den,
            )?,
            theta_ref: [T::zero(); 4],
            theta_filt: [T::zero(); 4],
            theta: [T::zero(); 4],
            elevator: [T::zero(); 4],
            elevator_limit: config.elevator_limit,
        })
    }

    /// One tick: records the reference and measurement, runs the prefilter
    /// and the error controller, and returns the constrained elevator
    /// deflection in radians.
    ///
    /// The constrained value is written back into the output history, so the
    /// recursion never sees a deflection the airframe was not commanded.
    pub fn update(&mut self, theta_ref_now: T, theta_now: T) -> T {
        shift_in(theta_ref_now, &mut self.theta_ref);
        shift_in(theta_now, &mut self.theta);
        self.prefilter.step(&self.theta_ref, &mut self.theta_filt);
        let raw = self
            .controller
            .step_error(&self.theta_filt, &self.theta, &mut self.elevator);
        let command = raw.clamp(-self.elevator_limit, self.elevator_limit);
        self.elevator[0] = command;
        command
    }

    /// Clears every history vector to zero.
    pub fn reset(&mut self) {
        self.theta_ref = [T::zero(); 4];
        self.theta_filt = [T::zero(); 4];
        self.theta = [T::zero(); 4];
        self.elevator = [T::zero(); 4];
    }
}

/// Glideslope-angle loop: tracks the reference glideslope and produces a
/// pitch reference for [`PitchLoop`].
pub struct GlideslopeLoop<T: Number> {
    controller: TransferFn<T, 3, 3>,
    gamma_ref: [T; 3],
    gamma: [T; 3],
    theta_ref: [T; 3],
    pitch_limit: T,
}

impl<T: Number> GlideslopeLoop<T> {
    /// Builds the loop from the glideslope stage of `config`.
    pub fn new(config: &AutolandConfig<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: TransferFn::new(
                "glideslope controller",
                config.glideslope_control.num,
                config.glideslope_control.den,
            )?,
            gamma_ref: [T::zero(); 3],
            gamma: [T::zero(); 3],
            theta_ref: [T::zero(); 3],
            pitch_limit: config.pitch_limit,
        })
    }

    /// One tick: records the reference and measured glideslope angles, runs
    /// the error controller, and returns the pitch reference in radians.
    ///
    /// The reference is directionally saturated against `theta_now`: once the
    /// aircraft is pitched past the limit, no command may increase the
    /// excursion.
    pub fn update(&mut self, gamma_ref_now: T, gamma_now: T, theta_now: T) -> T {
        shift_in(gamma_ref_now, &mut self.gamma_ref);
        shift_in(gamma_now, &mut self.gamma);
        let raw = self
            .controller
            .step_error(&self.gamma_ref, &self.gamma, &mut self.theta_ref);
        let reference = directional_limit(raw, theta_now, self.pitch_limit);
        self.theta_ref[0] = reference;
        reference
    }

    /// Clears every history vector to zero.
    pub fn reset(&mut self) {
        self.gamma_ref = [T::zero(); 3];
        self.gamma = [T::zero(); 3];
        self.theta_ref = [T::zero(); 3];
    }
}

/// Flare loop: commands a sink rate proportional to the remaining height and
/// tracks it, producing a pitch reference for [`PitchLoop`].
pub struct FlareLoop<T: Number> {
    prefilter: TransferFn<T, 1, 3>,
    controller: TransferFn<T, 3, 3>,
    tau_inv: T,
    hdot_ref: [T; 1],
    hdot_filt: [T; 3],
    hdot: [T; 3],
    theta_ref: [T; 3],
    pitch_limit: T,
}

impl<T: Number> FlareLoop<T> {
    /// Builds the loop from the flare stages of `config`.
    pub fn new(config: &AutolandConfig<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            prefilter: TransferFn::new(
                "flare prefilter",
                config.flare_prefilter.num,
                config.flare_prefilter.den,
            )?,
            controller: TransferFn::new(
                "flare controller",
                config.flare_control.num,
                config.flare_control.den,
            )?,
            tau_inv: config.tau_inv,
            hdot_ref: [T::zero(); 1],
            hdot_filt: [T::zero(); 3],
            hdot: [T::zero(); 3],
            theta_ref: [T::zero(); 3],
            pitch_limit: config.flare_pitch_limit,
        })
    }

    /// One tick: commands a sink rate of `height · tau_inv`, tracks it
    /// against the measured `height_rate`, and returns the pitch reference
    /// in radians, directionally saturated against `theta_now`.
    pub fn update(&mut self, height: T, height_rate: T, theta_now: T) -> T {
        shift_in(height * self.tau_inv, &mut self.hdot_ref);
        shift_in(height_rate, &mut self.hdot);
        self.prefilter.step(&self.hdot_ref, &mut self.hdot_filt);
        let raw = self
            .controller
            .step_error(&self.hdot_filt, &self.hdot, &mut self.theta_ref);
        let reference = directional_limit(raw, theta_now, self.pitch_limit);
        self.theta_ref[0] = reference;
        reference
    }

    /// Clears every history vector to zero.
    pub fn reset(&mut self) {
        self.hdot_ref = [T::zero(); 1];
        self.hdot_filt = [T::zero(); 3];
        self.hdot = [T::zero(); 3];
        self.theta_ref = [T::zero(); 3];
    }
}
