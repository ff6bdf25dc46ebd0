// src/frame.rs

//! # Runway Reference Frame
//!
//! Converts absolute geodetic coordinates into a runway-centered local frame:
//! a signed down-range distance along the centerline (positive inbound) and a
//! cross-range lateral offset.
//!
//! The transform is a small-angle planar approximation of a geodesic
//! projection: subtract the runway touchdown point in fixed-point degrees,
//! then rotate by precomputed runway-heading direction cosines that also fold
//! in the degrees-to-metres scale. It is only valid near the runway
//! threshold; callers far from the threshold get meaningless coordinates, and
//! `i32` deltas at extreme separations wrap rather than saturate.

use crate::filter::Number;

/// Runway geometry constants, fixed for the life of the process.
///
/// Latitude and longitude are kept in `i32` degrees ×1e7: absolute
/// coordinates at that precision do not survive a single-precision float
/// round-trip, so the reference subtraction happens in integer space.
#[derive(Debug, Clone, Copy)]
pub struct RunwayFrame<T> {
    /// Touchdown-point latitude in degrees ×1e7.
    pub lat_e7: i32,
    /// Touchdown-point longitude in degrees ×1e7.
    pub lon_e7: i32,
    /// Angle from local north to the landing direction, radians. Also the
    /// wrap center for heading errors in the lateral cascade.
    pub heading: T,
    /// cos(heading) folded with the degrees-to-metres scale: metres of local
    /// displacement per 1e-7 degree along the rotated axis.
    pub cos_term: T,
    /// sin(heading) folded with the degrees-to-metres scale, same units.
    pub sin_term: T,
}

/// Runway-relative position produced by [`RunwayFrame::to_local`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTrack<T> {
    /// Distance along the runway centerline from the threshold, metres,
    /// positive inbound.
    pub down_range: T,
    /// Lateral offset from the centerline, metres.
    pub cross_range: T,
}

impl<T: Number> RunwayFrame<T> {
    /// Projects an absolute position into the runway frame.
    pub fn to_local(&self, lat_e7: i32, lon_e7: i32) -> LocalTrack<T> {
        let dlat = T::from_i32(lat_e7.wrapping_sub(self.lat_e7));
        let dlon = T::from_i32(lon_e7.wrapping_sub(self.lon_e7));
        LocalTrack {
            down_range: dlat * self.cos_term + dlon * self.sin_term,
            cross_range: dlon * self.cos_term - dlat * self.sin_term,
        }
    }
}
