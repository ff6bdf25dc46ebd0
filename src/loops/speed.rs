// src/loops/speed.rs

//! # Speed Loop
//!
//! Tracks a commanded airspeed offset from the trimmed approach airspeed and
//! converts the controller output into a throttle increment around the trim
//! throttle setting, clamped to [0, 100] percent.

use crate::config::{AutolandConfig, ConfigError};
use crate::filter::{shift_in, Number, TransferFn};

/// Airspeed-to-throttle loop.
pub struct AirspeedLoop<T: Number> {
    prefilter: TransferFn<T, 3, 3>,
    controller: TransferFn<T, 3, 3>,
    u_ref: [T; 3],
    u_filt: [T; 3],
    u: [T; 3],
    throttle: [T; 3],
    trim_throttle: T,
}

impl<T: Number> AirspeedLoop<T> {
    /// Builds the loop from the airspeed stages of `config`.
    pub fn new(config: &AutolandConfig<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            prefilter: TransferFn::new(
                "airspeed prefilter",
                config.airspeed_prefilter.num,
                config.airspeed_prefilter.den,
            )?,
            controller: TransferFn::new(
                "airspeed controller",
                config.airspeed_control.num,
                config.airspeed_control.den,
            )?,
            u_ref: [T::zero(); 3],
            u_filt: [T::zero(); 3],
            u: [T::zero(); 3],
            throttle: [T::zero(); 3],
            trim_throttle: config.trim_throttle,
        })
    }

    /// One tick: records the commanded and measured airspeed offsets (both
    /// relative to trim airspeed, m/s) and returns the throttle setting in
    /// percent, clamped to [0, 100].
    pub fn update(&mut self, offset_ref_now: T, offset_now: T) -> T {
        shift_in(offset_now, &mut self.u);
        shift_in(offset_ref_now, &mut self.u_ref);
        self.prefilter.step(&self.u_ref, &mut self.u_filt);
        let increment = self
            .controller
            .step_error(&self.u_filt, &self.u, &mut self.throttle);
        let percent = T::from_i32(100) * increment + self.trim_throttle;
        percent.clamp(T::zero(), T::from_i32(100))
    }

    /// Clears every history vector to zero.
    pub fn reset(&mut self) {
        self.u_ref = [T::zero(); 3];
        self.u_filt = [T::zero(); 3];
        self.u = [T::zero(); 3];
        self.throttle = [T::zero(); 3];
    }
}
