// src/config.rs

//! # Autoland Configuration
//!
//! Every tunable of the guidance core is data in [`AutolandConfig`]: runway
//! geometry, trim constants, phase thresholds, saturation limits, singularity
//! guards, the coefficient tables of every control-law stage, and the output
//! maps that turn angular deflections into actuator commands. Nothing in the
//! control logic needs to change to retune for a different airframe.
//!
//! [`AutolandConfig::new`] gives neutral placeholder values that must be
//! replaced with a tuned set; [`AutolandConfig::reference_tuning`] is the one
//! canonical law set carried by this crate, flown on a small fixed-wing
//! testbed. Validation happens when the configuration is handed to
//! [`Autoland::new`](crate::Autoland::new): a malformed table is rejected
//! before any loop runs.

use core::fmt;

use crate::filter::Number;
use crate::frame::RunwayFrame;

/// A configuration fault detected at initialization.
///
/// The core refuses to construct rather than run a malformed law set; every
/// variant names the offending stage or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A coefficient table's leading denominator coefficient, the
    /// normalization divisor of the filter recursion, is zero.
    ZeroLeadingDenominator(&'static str),
    /// A coefficient table contains a NaN or infinite entry.
    NonFiniteCoefficient(&'static str),
    /// A scalar parameter is NaN or infinite.
    NonFiniteParameter(&'static str),
    /// A parameter that must be strictly positive is zero or negative.
    NonPositiveParameter(&'static str),
    /// The trim throttle setting lies outside [0, 100] percent.
    ThrottleTrimOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroLeadingDenominator(stage) => {
                write!(f, "{}: leading denominator coefficient is zero", stage)
            }
            ConfigError::NonFiniteCoefficient(stage) => {
                write!(f, "{}: non-finite filter coefficient", stage)
            }
            ConfigError::NonFiniteParameter(name) => {
                write!(f, "{}: non-finite parameter", name)
            }
            ConfigError::NonPositiveParameter(name) => {
                write!(f, "{}: parameter must be positive", name)
            }
            ConfigError::ThrottleTrimOutOfRange => {
                write!(f, "trim throttle outside [0, 100] percent")
            }
        }
    }
}

/// Numerator/denominator coefficient pair for one discrete control-law stage.
#[derive(Debug, Clone, Copy)]
pub struct FilterTaps<T, const N: usize, const D: usize> {
    /// Numerator polynomial, applied to the stage's input history.
    pub num: [T; N],
    /// Denominator polynomial; `den[0]` is the normalization divisor.
    pub den: [T; D],
}

fn passthrough<T: Number, const N: usize, const D: usize>() -> FilterTaps<T, N, D> {
    let mut num = [T::zero(); N];
    let mut den = [T::zero(); D];
    if let Some(first) = num.first_mut() {
        *first = T::one();
    }
    if let Some(first) = den.first_mut() {
        *first = T::one();
    }
    FilterTaps { num, den }
}

/// Linear servo calibration applied after the angular scale: `slope·cmd +
/// offset`, mapping a deflection command onto raw actuator units.
#[derive(Debug, Clone, Copy)]
pub struct ServoCalibration<T> {
    /// Gain from deflection command to actuator units.
    pub slope: T,
    /// Actuator units commanded at zero deflection.
    pub offset: T,
}

/// Per-channel conversion from a cascade output (radians) to the command
/// representation the actuator driver consumes.
#[derive(Debug, Clone, Copy)]
pub struct OutputMap<T> {
    /// Scale from radians to the command unit. The reference tuning uses
    /// 5730 (hundredths of a degree per radian).
    pub scale: T,
    /// Optional servo linearization. `None` leaves the command in scaled
    /// angular units.
    pub calibration: Option<ServoCalibration<T>>,
}

impl<T: Number> OutputMap<T> {
    /// Maps an angular deflection into the actuator command representation.
    pub fn apply(&self, angle: T) -> T {
        let cmd = angle * self.scale;
        match self.calibration {
            Some(cal) => cal.slope * cmd + cal.offset,
            None => cmd,
        }
    }
}

/// Throttle law used once the flare phase is entered.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlareThrottle<T> {
    /// Force a fixed throttle setting (percent), typically idle.
    Fixed(T),
    /// Keep the airspeed loop running against a different (more negative)
    /// commanded airspeed offset from trim, m/s.
    TrackOffset(T),
}

/// Policy for the longitudinal history when a go-around climbs back above
/// the flare altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GoAroundPolicy {
    /// Clear the flare loop's history on re-entering approach, so a later
    /// descent starts the flare law from rest.
    ResetFlareHistory,
    /// Leave the flare history untouched across the phase excursion.
    PreserveHistory,
}

/// Complete tuning set for one airframe and one runway.
#[derive(Debug, Clone, Copy)]
pub struct AutolandConfig<T> {
    /// Runway geolocation and heading constants.
    pub runway: RunwayFrame<T>,
    /// Altitude below which the flare laws take over, metres AGL.
    pub flare_altitude: T,
    /// Reference glideslope angle tracked on approach, radians.
    pub glideslope_ref: T,
    /// Commanded sink-rate gain on current height in the flare law, 1/s.
    /// Negative: positive height commands a descent.
    pub tau_inv: T,
    /// Steady-state pitch attitude on approach, radians. Subtracted from the
    /// measured pitch before it enters the longitudinal cascade.
    pub trim_pitch: T,
    /// Trimmed approach airspeed, m/s. Airspeed errors are offsets from this.
    pub trim_airspeed: T,
    /// Throttle setting (percent) that holds `trim_airspeed` in steady
    /// descent; the speed loop commands increments around it.
    pub trim_throttle: T,
    /// Commanded airspeed offset from trim during approach, m/s.
    pub approach_airspeed_offset: T,
    /// Throttle law selected in the flare phase.
    pub flare_throttle: FlareThrottle<T>,
    /// Longitudinal history policy on flare-to-approach re-entry.
    pub go_around: GoAroundPolicy,
    /// Directional saturation bound on the pitch reference while tracking the
    /// glideslope, radians.
    pub pitch_limit: T,
    /// Directional saturation bound on the pitch reference in flare, radians.
    pub flare_pitch_limit: T,
    /// Directional saturation bound on the bank reference, radians.
    pub bank_limit: T,
    /// Hard elevator deflection limit, radians.
    pub elevator_limit: T,
    /// Hard aileron deflection limit, radians.
    pub aileron_limit: T,
    /// Smallest down-range magnitude used as a divisor, metres. Guards the
    /// glideslope and localizer ratios at the runway threshold.
    pub min_range: T,
    /// Down-range magnitude below which the localizer offset command is
    /// scaled down instead of tracked directly, metres.
    pub near_range: T,
    /// Scale applied to the localizer offset inside `near_range`, 1/m.
    pub near_scale: T,
    /// Pitch-reference prefilter taps.
    pub pitch_prefilter: FilterTaps<T, 4, 4>,
    /// Pitch-tracking controller taps (filtered reference minus measurement
    /// error in, elevator out).
    pub pitch_control: FilterTaps<T, 4, 4>,
    /// Glideslope-angle controller taps (glideslope error in, pitch
    /// reference out).
    pub glideslope_control: FilterTaps<T, 3, 3>,
    /// Flare sink-rate command prefilter taps.
    pub flare_prefilter: FilterTaps<T, 1, 3>,
    /// Flare controller taps (sink-rate error in, pitch reference out).
    pub flare_control: FilterTaps<T, 3, 3>,
    /// Heading-reference prefilter taps.
    pub heading_prefilter: FilterTaps<T, 3, 3>,
    /// Heading controller taps (heading error in, bank reference out).
    pub heading_control: FilterTaps<T, 2, 2>,
    /// Bank-reference prefilter taps.
    pub bank_prefilter: FilterTaps<T, 3, 3>,
    /// Bank controller taps (bank error in, aileron out).
    pub bank_control: FilterTaps<T, 5, 5>,
    /// Localizer controller taps (localizer angle in, heading reference out).
    pub localizer_control: FilterTaps<T, 3, 3>,
    /// Airspeed-offset reference prefilter taps.
    pub airspeed_prefilter: FilterTaps<T, 3, 3>,
    /// Airspeed controller taps (offset error in, throttle increment out).
    pub airspeed_control: FilterTaps<T, 3, 3>,
    /// Elevator command mapping.
    pub elevator_map: OutputMap<T>,
    /// Aileron command mapping.
    pub aileron_map: OutputMap<T>,
}

impl<T: Number> AutolandConfig<T> {
    /// Creates a configuration with neutral placeholder values: pass-through
    /// coefficient tables, unit limits, zero trims. These must be replaced
    /// with values tuned for the airframe before flight.
    pub fn new() -> Self {
        Self {
            runway: RunwayFrame {
                lat_e7: 0,
                lon_e7: 0,
                heading: T::zero(),
                cos_term: T::one(),
                sin_term: T::zero(),
            },
            flare_altitude: T::zero(),
            glideslope_ref: T::zero(),
            tau_inv: T::zero(),
            trim_pitch: T::zero(),
            trim_airspeed: T::zero(),
            trim_throttle: T::zero(),
            approach_airspeed_offset: T::zero(),
            flare_throttle: FlareThrottle::Fixed(T::zero()),
            go_around: GoAroundPolicy::ResetFlareHistory,
            pitch_limit: T::one(),
            flare_pitch_limit: T::one(),
            bank_limit: T::one(),
            elevator_limit: T::one(),
            aileron_limit: T::one(),
            min_range: T::one(),
            near_range: T::zero(),
            near_scale: T::zero(),
            pitch_prefilter: passthrough(),
            pitch_control: passthrough(),
            glideslope_control: passthrough(),
            flare_prefilter: passthrough(),
            flare_control: passthrough(),
            heading_prefilter: passthrough(),
            heading_control: passthrough(),
            bank_prefilter: passthrough(),
            bank_control: passthrough(),
            localizer_control: passthrough(),
            airspeed_prefilter: passthrough(),
            airspeed_control: passthrough(),
            elevator_map: OutputMap {
                scale: T::one(),
                calibration: None,
            },
            aileron_map: OutputMap {
                scale: T::one(),
                calibration: None,
            },
        }
    }
}

impl AutolandConfig<f32> {
    /// The canonical law set carried by this crate: discrete-time controllers
    /// and prefilters designed for a small fixed-wing testbed on a 5-degree
    /// glideslope, together with that aircraft's runway geometry, trims, and
    /// servo calibrations.
    pub fn reference_tuning() -> Self {
        Self {
            runway: RunwayFrame {
                lat_e7: 306_371_735,
                lon_e7: -964_850_664,
                heading: core::f32::consts::PI,
                // cos/sin of the runway heading folded with the 1e-7 degree
                // to metre scale at the runway's latitude.
                cos_term: -0.011132,
                sin_term: 0.0,
            },
            flare_altitude: 4.0,
            glideslope_ref: 0.08727,
            tau_inv: -0.4,
            trim_pitch: 0.0,
            trim_airspeed: 15.0,
            trim_throttle: 40.0,
            approach_airspeed_offset: 0.0,
            flare_throttle: FlareThrottle::Fixed(0.0),
            go_around: GoAroundPolicy::ResetFlareHistory,
            pitch_limit: 0.3491,
            flare_pitch_limit: 0.1746,
            bank_limit: 0.3491,
            elevator_limit: 0.7853,
            aileron_limit: 0.7853,
            min_range: 1.0,
            near_range: 50.0,
            near_scale: 0.02,
            pitch_prefilter: FilterTaps {
                num: [1.0, -2.209_472_9, 1.638_551_1, -0.398_436_04],
                den: [23.088_489, -63.661_195, 58.720_368, -18.117_02],
            },
            pitch_control: FilterTaps {
                num: [1.0, -2.558_818, 2.299_082_5, -0.723_091_4],
                den: [-2.563_579_6, 6.004_792_5, -4.675_531, 1.234_315_9],
            },
            glideslope_control: FilterTaps {
                num: [5.51, -6.5, 1.0],
                den: [1.0, -1.0, 0.0],
            },
            flare_prefilter: FilterTaps {
                num: [0.007_263_114_4],
                den: [1.0, -1.875_842_5, 0.883_105_6],
            },
            flare_control: FilterTaps {
                num: [2.525, -5.025, 2.5],
                den: [1.0, -1.0, 0.0],
            },
            heading_prefilter: FilterTaps {
                num: [1.0, -1.656_676_8, 0.666_113_04],
                den: [15.268_073, -29.926_283, 14.667_646],
            },
            heading_control: FilterTaps {
                num: [1.0, -0.963_643_2],
                den: [0.038_241_39, -0.001_912_689_2],
            },
            bank_prefilter: FilterTaps {
                num: [1.0, 0.0, 0.0],
                den: [46.294_357, -68.811_77, 23.517_414],
            },
            bank_control: FilterTaps {
                num: [1.0, -2.581_658, 2.178_666, -0.596_865_1, 0.0],
                den: [-1.613_597_6, 2.601_599, 0.034_205_73, -1.436_073_2, 0.413_865_54],
            },
            localizer_control: FilterTaps {
                num: [8.7, -16.2, 7.5],
                den: [1.0, -1.0, 0.0],
            },
            airspeed_prefilter: FilterTaps {
                num: [1.0, -1.836_217_4, 0.848_629_6],
                den: [9.949_455, -19.395_784, 9.458_741],
            },
            airspeed_control: FilterTaps {
                num: [1.0, -1.714_277_3, 0.736_718_2],
                den: [1.379_680_4, -1.669_492_7, 0.290_100_33],
            },
            elevator_map: OutputMap {
                scale: 5730.0,
                calibration: Some(ServoCalibration {
                    slope: -2.5322,
                    offset: 741.65,
                }),
            },
            aileron_map: OutputMap {
                scale: 5730.0,
                calibration: Some(ServoCalibration {
                    slope: -3.8257,
                    offset: -1776.0,
                }),
            },
        }
    }
}
