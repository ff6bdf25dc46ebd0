// src/lib.rs

//! # Fixed-Wing Autoland Guidance Core
//!
//! This crate provides a `no_std`, no-alloc guidance core for the final
//! approach and landing of a fixed-wing aircraft. A flight-control executive
//! calls the core once per guidance tick with fresh position, attitude, and
//! airspeed measurements; the core runs a set of cascaded discrete-time
//! control laws (glideslope, localizer, flare, and airspeed tracking) and
//! returns commanded elevator, aileron, and throttle settings.
//!
//! All per-loop state lives inside an [`Autoland`] instance; there are no
//! process-wide statics, so simulation and flight instances can coexist.

#![no_std]
#![deny(missing_docs)]

mod fmt;

pub mod autoland;
pub mod config;
pub mod filter;
pub mod frame;
pub mod loops;

#[doc(inline)]
pub use autoland::*;
pub use config::*;
pub use filter::Number;
pub use frame::*;

#[cfg(test)]
mod test_utils;
