// src/autoland.rs

//! # Autoland Guidance Core
//!
//! [`Autoland`] owns every control loop and runs one guidance update per call
//! to [`tick`](Autoland::tick): runway-frame transform, longitudinal cascade
//! (glideslope or flare law, selected by phase), lateral cascade, speed loop,
//! and output mapping, in that order. The host executive forwards the
//! commanded deflections to its actuator drivers and may read the reference
//! snapshots for telemetry.
//!
//! The core is single-threaded and synchronous: a tick completes before the
//! next begins, and a multi-threaded host must serialize calls into one
//! instance. All state is per-instance; separate simulation and flight
//! instances never interact.

use crate::config::{AutolandConfig, ConfigError, FlareThrottle, GoAroundPolicy, OutputMap};
use crate::filter::Number;
use crate::frame::RunwayFrame;
use crate::loops::{
    AirspeedLoop, BankLoop, FlareLoop, GlideslopeLoop, HeadingLoop, LocalizerLoop, PitchLoop,
};

/// Guidance phase, recomputed every tick from altitude against the flare
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Tracking the glideslope and localizer down final approach.
    Approach,
    /// Below the flare altitude: height-rate control, throttle per the
    /// configured flare law.
    Flare,
}

impl Phase {
    /// Short name for logs.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Approach => "approach",
            Phase::Flare => "flare",
        }
    }
}

/// One tick's worth of sensor state, externally estimated and filtered.
#[derive(Debug, Clone, Copy)]
pub struct SensorInput<T> {
    /// Absolute latitude, degrees ×1e7.
    pub lat_e7: i32,
    /// Absolute longitude, degrees ×1e7.
    pub lon_e7: i32,
    /// Altitude above ground, metres.
    pub altitude: T,
    /// True airspeed, m/s.
    pub airspeed: T,
    /// Pitch angle, radians, nose-up positive.
    pub pitch: T,
    /// Heading, radians from local north.
    pub heading: T,
    /// Roll angle, radians.
    pub roll: T,
}

/// Altitude and timestamp of the previous tick, for height-rate estimation.
#[derive(Debug, Clone, Copy)]
struct TickRecord<T> {
    time_ms: u32,
    altitude: T,
}

/// The autoland control core. One instance per aircraft or simulation.
pub struct Autoland<T: Number> {
    frame: RunwayFrame<T>,
    glideslope: GlideslopeLoop<T>,
    flare: FlareLoop<T>,
    pitch: PitchLoop<T>,
    localizer: LocalizerLoop<T>,
    heading: HeadingLoop<T>,
    bank: BankLoop<T>,
    airspeed: AirspeedLoop<T>,
    flare_altitude: T,
    glideslope_target: T,
    trim_pitch: T,
    trim_airspeed: T,
    approach_airspeed_offset: T,
    flare_throttle: FlareThrottle<T>,
    go_around: GoAroundPolicy,
    min_range: T,
    elevator_map: OutputMap<T>,
    aileron_map: OutputMap<T>,
    phase: Phase,
    last_tick: Option<TickRecord<T>>,
    elevator_out: T,
    aileron_out: T,
    throttle_out: T,
    ref_pitch: Option<T>,
    ref_heading: Option<T>,
    ref_roll: Option<T>,
    ref_glideslope: Option<T>,
    ref_localizer: Option<T>,
}

fn ensure_finite<T: Number>(name: &'static str, value: T) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteParameter(name))
    }
}

fn ensure_positive<T: Number>(name: &'static str, value: T) -> Result<(), ConfigError> {
    ensure_finite(name, value)?;
    if value > T::zero() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveParameter(name))
    }
}

impl<T: Number> Autoland<T> {
    /// Validates `config` and builds a core with all histories zeroed,
    /// commands at their neutral baseline, and every reference snapshot
    /// marked "never computed".
    pub fn new(config: AutolandConfig<T>) -> Result<Self, ConfigError> {
        ensure_finite("flare_altitude", config.flare_altitude)?;
        ensure_finite("glideslope_ref", config.glideslope_ref)?;
        ensure_finite("tau_inv", config.tau_inv)?;
        ensure_finite("trim_pitch", config.trim_pitch)?;
        ensure_finite("trim_airspeed", config.trim_airspeed)?;
        ensure_finite("trim_throttle", config.trim_throttle)?;
        ensure_finite("approach_airspeed_offset", config.approach_airspeed_offset)?;
        match config.flare_throttle {
            FlareThrottle::Fixed(setting) => ensure_finite("flare_throttle", setting)?,
            FlareThrottle::TrackOffset(offset) => ensure_finite("flare_throttle", offset)?,
        }
        ensure_positive("pitch_limit", config.pitch_limit)?;
        ensure_positive("flare_pitch_limit", config.flare_pitch_limit)?;
        ensure_positive("bank_limit", config.bank_limit)?;
        ensure_positive("elevator_limit", config.elevator_limit)?;
        ensure_positive("aileron_limit", config.aileron_limit)?;
        ensure_positive("min_range", config.min_range)?;
        if config.trim_throttle < T::zero() || config.trim_throttle > T::from_i32(100) {
            return Err(ConfigError::ThrottleTrimOutOfRange);
        }

        let elevator_map = config.elevator_map;
        let aileron_map = config.aileron_map;
        Ok(Self {
            frame: config.runway,
            glideslope: GlideslopeLoop::new(&config)?,
            flare: FlareLoop::new(&config)?,
            pitch: PitchLoop::new(&config)?,
            localizer: LocalizerLoop::new(&config)?,
            heading: HeadingLoop::new(&config)?,
            bank: BankLoop::new(&config)?,
            airspeed: AirspeedLoop::new(&config)?,
            flare_altitude: config.flare_altitude,
            glideslope_target: config.glideslope_ref,
            trim_pitch: config.trim_pitch,
            trim_airspeed: config.trim_airspeed,
            approach_airspeed_offset: config.approach_airspeed_offset,
            flare_throttle: config.flare_throttle,
            go_around: config.go_around,
            min_range: config.min_range,
            elevator_out: elevator_map.apply(T::zero()),
            aileron_out: aileron_map.apply(T::zero()),
            elevator_map,
            aileron_map,
            phase: Phase::Approach,
            last_tick: None,
            throttle_out: T::zero(),
            ref_pitch: None,
            ref_heading: None,
            ref_roll: None,
            ref_glideslope: None,
            ref_localizer: None,
        })
    }

    /// One full guidance update.
    ///
    /// `now_ms` is a monotonic millisecond clock (wrapping is fine); it is
    /// only used to estimate the height rate between consecutive ticks.
    pub fn tick(&mut self, input: &SensorInput<T>, now_ms: u32) {
        let track = self.frame.to_local(input.lat_e7, input.lon_e7);
        let phase = if input.altitude > self.flare_altitude {
            Phase::Approach
        } else {
            Phase::Flare
        };
        if phase != self.phase {
            log_debug!("guidance phase {} -> {}", self.phase.label(), phase.label());
            if phase == Phase::Approach && self.go_around == GoAroundPolicy::ResetFlareHistory {
                self.flare.reset();
            }
            self.phase = phase;
        }

        // Down-range magnitude floored to keep the glideslope and localizer
        // ratios finite over the threshold.
        let range = track.down_range.abs().max(self.min_range);
        let theta = input.pitch - self.trim_pitch;

        // Longitudinal cascade.
        let gamma_now = input.altitude / range;
        self.ref_glideslope = Some(gamma_now);
        let theta_ref = match phase {
            Phase::Approach => self.glideslope.update(self.glideslope_target, gamma_now, theta),
            Phase::Flare => {
                let height_rate = self.height_rate(input.altitude, now_ms);
                self.flare.update(input.altitude, height_rate, theta)
            }
        };
        self.ref_pitch = Some(theta_ref);
        let elevator = self.pitch.update(theta_ref, theta);
        self.elevator_out = self.elevator_map.apply(elevator);

        // Lateral cascade.
        let lambda_now = track.cross_range / range;
        self.ref_localizer = Some(lambda_now);
        let psi_ref = self.localizer.update(lambda_now, track.down_range);
        self.ref_heading = Some(psi_ref);
        let phi_ref = self.heading.update(psi_ref, input.heading, input.roll);
        self.ref_roll = Some(phi_ref);
        let aileron = self.bank.update(phi_ref, input.roll);
        self.aileron_out = self.aileron_map.apply(aileron);

        // Speed loop.
        let offset_now = input.airspeed - self.trim_airspeed;
        self.throttle_out = match phase {
            Phase::Approach => self.airspeed.update(self.approach_airspeed_offset, offset_now),
            Phase::Flare => match self.flare_throttle {
                FlareThrottle::Fixed(setting) => setting.clamp(T::zero(), T::from_i32(100)),
                FlareThrottle::TrackOffset(offset_ref) => {
                    self.airspeed.update(offset_ref, offset_now)
                }
            },
        };

        self.last_tick = Some(TickRecord {
            time_ms: now_ms,
            altitude: input.altitude,
        });
    }

    /// Clears every loop's history and returns all commands to their neutral
    /// baseline. Idempotent; afterwards the core behaves exactly like a
    /// freshly constructed one.
    pub fn reset(&mut self) {
        self.glideslope.reset();
        self.flare.reset();
        self.pitch.reset();
        self.localizer.reset();
        self.heading.reset();
        self.bank.reset();
        self.airspeed.reset();
        self.phase = Phase::Approach;
        self.last_tick = None;
        self.elevator_out = self.elevator_map.apply(T::zero());
        self.aileron_out = self.aileron_map.apply(T::zero());
        self.throttle_out = T::zero();
        self.ref_pitch = None;
        self.ref_heading = None;
        self.ref_roll = None;
        self.ref_glideslope = None;
        self.ref_localizer = None;
        log_info!("autoland reset");
    }

    fn height_rate(&self, altitude: T, now_ms: u32) -> T {
        match self.last_tick {
            // Two ticks sharing a timestamp would divide by zero; report a
            // zero rate instead of poisoning the flare history.
            Some(prev) => {
                let elapsed_ms = now_ms.wrapping_sub(prev.time_ms);
                if elapsed_ms == 0 {
                    T::zero()
                } else {
                    let elapsed_s = T::from_i32(elapsed_ms as i32) / T::from_i32(1000);
                    (altitude - prev.altitude) / elapsed_s
                }
            }
            None => T::zero(),
        }
    }

    /// The guidance phase selected by the most recent tick.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Most recent elevator command, in the configured output units.
    pub fn elevator(&self) -> T {
        self.elevator_out
    }

    /// Most recent aileron command, in the configured output units.
    pub fn aileron(&self) -> T {
        self.aileron_out
    }

    /// Most recent throttle command, percent in [0, 100].
    pub fn throttle(&self) -> T {
        self.throttle_out
    }

    /// Pitch reference fed to the pitch-tracking loop, radians. `None` until
    /// the first tick after construction or reset.
    pub fn pitch_ref(&self) -> Option<T> {
        self.ref_pitch
    }

    /// Heading reference produced by the localizer loop, radians.
    pub fn heading_ref(&self) -> Option<T> {
        self.ref_heading
    }

    /// Bank reference produced by the heading loop, radians.
    pub fn roll_ref(&self) -> Option<T> {
        self.ref_roll
    }

    /// Measured glideslope angle from the current geometry, radians.
    pub fn glideslope_ref(&self) -> Option<T> {
        self.ref_glideslope
    }

    /// Measured localizer angle from the current geometry, radians.
    pub fn localizer_ref(&self) -> Option<T> {
        self.ref_localizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServoCalibration;
    use crate::test_utils::*;

    /// Reference tuning re-seated on an axis-aligned test runway, with raw
    /// angular outputs (no servo calibration) for easy assertions.
    fn test_config() -> AutolandConfig<f32> {
        let mut config = AutolandConfig::<f32>::reference_tuning();
        config.runway = RunwayFrame {
            lat_e7: 0,
            lon_e7: 0,
            heading: 0.0,
            cos_term: 0.01,
            sin_term: 0.0,
        };
        config.elevator_map.calibration = None;
        config.aileron_map.calibration = None;
        config
    }

    fn on_glideslope_input() -> SensorInput<f32> {
        SensorInput {
            lat_e7: 10_000, // 100 m down-range
            lon_e7: 0,      // on centerline
            altitude: 0.08727 * 100.0,
            airspeed: 15.0, // on trim speed
            pitch: 0.0,
            heading: 0.0, // aligned with the runway
            roll: 0.0,
        }
    }

    fn zero_input() -> SensorInput<f32> {
        SensorInput {
            lat_e7: 0,
            lon_e7: 0,
            altitude: 0.0,
            airspeed: 0.0,
            pitch: 0.0,
            heading: 0.0,
            roll: 0.0,
        }
    }

    #[test]
    fn test_reference_snapshots_uninitialized_until_first_tick() {
        let core = Autoland::new(test_config()).unwrap();
        assert_eq!(None, core.pitch_ref());
        assert_eq!(None, core.heading_ref());
        assert_eq!(None, core.roll_ref());
        assert_eq!(None, core.glideslope_ref());
        assert_eq!(None, core.localizer_ref());
    }

    #[test]
    fn test_on_glideslope_approach_is_neutral() {
        let mut core = Autoland::new(test_config()).unwrap();
        core.tick(&on_glideslope_input(), 0);

        assert_eq!(Phase::Approach, core.phase());
        assert!(
            value_close(0.0, core.elevator()),
            "On-glideslope flight should need no elevator."
        );
        assert!(
            value_close(0.0, core.aileron()),
            "On-centerline flight should need no aileron."
        );
        assert!(
            value_close(40.0, core.throttle()),
            "On-speed flight should hold trim throttle."
        );
        assert!(value_close(0.08727, core.glideslope_ref().unwrap()));
        assert!(value_close(0.0, core.localizer_ref().unwrap()));
        assert!(value_close(0.0, core.roll_ref().unwrap()));
    }

    #[test]
    fn test_phase_tracks_altitude_without_hysteresis() {
        let mut core = Autoland::new(test_config()).unwrap();
        let cases = [
            (10.0, Phase::Approach),
            (5.0, Phase::Approach),
            (4.1, Phase::Approach),
            (4.0, Phase::Flare),
            (3.9, Phase::Flare),
            (4.2, Phase::Approach),
            (0.5, Phase::Flare),
        ];
        for (i, (altitude, expected)) in cases.iter().enumerate() {
            let input = SensorInput {
                altitude: *altitude,
                ..on_glideslope_input()
            };
            core.tick(&input, (i as u32) * 100);
            assert_eq!(
                *expected,
                core.phase(),
                "Phase must follow the altitude comparison exactly."
            );
        }
    }

    #[test]
    fn test_flare_entry_switches_throttle_law() {
        let mut core = Autoland::new(test_config()).unwrap();

        let approach = SensorInput {
            altitude: 5.0,
            ..on_glideslope_input()
        };
        core.tick(&approach, 0);
        assert_eq!(Phase::Approach, core.phase());
        assert!(value_not_close(0.0, core.throttle()));

        let flare = SensorInput {
            altitude: 3.5,
            ..on_glideslope_input()
        };
        core.tick(&flare, 100);
        assert_eq!(Phase::Flare, core.phase());
        assert!(
            value_close(0.0, core.throttle()),
            "The fixed flare throttle law should force idle."
        );
        assert!(core.pitch_ref().is_some());
    }

    #[test]
    fn test_reset_then_zero_tick_is_neutral() {
        let mut core = Autoland::new(test_config()).unwrap();

        // Accumulate history with deliberately off-nominal flight.
        let offset = SensorInput {
            lat_e7: 20_000,
            lon_e7: 3_000,
            altitude: 12.0,
            airspeed: 11.0,
            pitch: 0.1,
            heading: 0.2,
            roll: -0.1,
        };
        for i in 0..5 {
            core.tick(&offset, i * 100);
        }
        assert!(value_not_close(0.0, core.aileron()));

        core.reset();
        assert!(value_close(0.0, core.elevator()));
        assert!(value_close(0.0, core.aileron()));
        assert!(value_close(0.0, core.throttle()));
        assert_eq!(None, core.pitch_ref());

        core.tick(&zero_input(), 1_000);
        assert!(
            value_close(0.0, core.elevator())
                && value_close(0.0, core.aileron())
                && value_close(0.0, core.throttle()),
            "No residual history may influence the first tick after reset."
        );
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut once = Autoland::new(test_config()).unwrap();
        let mut twice = Autoland::new(test_config()).unwrap();

        let input = SensorInput {
            lat_e7: 15_000,
            lon_e7: -2_000,
            altitude: 9.0,
            airspeed: 13.0,
            pitch: 0.05,
            heading: -0.1,
            roll: 0.08,
        };
        for i in 0..3 {
            once.tick(&input, i * 100);
            twice.tick(&input, i * 100);
        }

        once.reset();
        twice.reset();
        twice.reset();

        for i in 0..3 {
            once.tick(&input, 1_000 + i * 100);
            twice.tick(&input, 1_000 + i * 100);
            assert!(value_close(once.elevator(), twice.elevator()));
            assert!(value_close(once.aileron(), twice.aileron()));
            assert!(value_close(once.throttle(), twice.throttle()));
        }
    }

    #[test]
    fn test_go_around_policy_controls_flare_history() {
        let mut reset_policy = Autoland::new(test_config()).unwrap();
        let mut preserve_policy = {
            let mut config = test_config();
            config.go_around = GoAroundPolicy::PreserveHistory;
            Autoland::new(config).unwrap()
        };

        let low = SensorInput {
            altitude: 3.0,
            ..on_glideslope_input()
        };
        let high = SensorInput {
            altitude: 10.0,
            ..on_glideslope_input()
        };

        // First flare pass, go-around, then a second flare entry at an
        // unchanged timestamp so the height-rate estimate is zero both times.
        reset_policy.tick(&low, 0);
        let first = reset_policy.pitch_ref().unwrap();
        reset_policy.tick(&high, 100);
        reset_policy.tick(&low, 100);
        let after_reset = reset_policy.pitch_ref().unwrap();
        assert!(
            value_close(first, after_reset),
            "With ResetFlareHistory the second flare entry starts from rest."
        );

        preserve_policy.tick(&low, 0);
        let first = preserve_policy.pitch_ref().unwrap();
        preserve_policy.tick(&high, 100);
        preserve_policy.tick(&low, 100);
        let after_preserve = preserve_policy.pitch_ref().unwrap();
        assert!(
            value_not_close(first, after_preserve),
            "With PreserveHistory the stale flare samples stay in play."
        );
    }

    #[test]
    fn test_flare_throttle_can_track_an_offset() {
        let mut config = AutolandConfig::<f32>::new();
        config.trim_airspeed = 15.0;
        config.trim_throttle = 40.0;
        config.flare_throttle = FlareThrottle::TrackOffset(-2.0);

        let mut core = Autoland::new(config).unwrap();
        let input = SensorInput {
            airspeed: 12.75, // 0.25 m/s below the -2 m/s offset target
            ..zero_input()
        };
        core.tick(&input, 0);

        assert_eq!(Phase::Flare, core.phase());
        assert!(
            value_close(65.0, core.throttle()),
            "Passthrough stages: 0.25 m/s of error is +25 percent throttle."
        );
    }

    #[test]
    fn test_neutral_baseline_uses_servo_calibration() {
        let mut config = test_config();
        config.elevator_map.calibration = Some(ServoCalibration {
            slope: -2.5322,
            offset: 741.65,
        });
        let mut core = Autoland::new(config).unwrap();
        assert!(
            value_close(741.65, core.elevator()),
            "Zero deflection maps onto the servo's neutral command."
        );
        core.reset();
        assert!(value_close(741.65, core.elevator()));
    }

    #[test]
    fn test_malformed_configuration_is_rejected() {
        let mut config = test_config();
        config.glideslope_control.den[0] = 0.0;
        assert_eq!(
            Err(ConfigError::ZeroLeadingDenominator("glideslope controller")),
            Autoland::new(config).map(|_| ())
        );

        let mut config = test_config();
        config.trim_throttle = 150.0;
        assert_eq!(
            Err(ConfigError::ThrottleTrimOutOfRange),
            Autoland::new(config).map(|_| ())
        );

        let mut config = test_config();
        config.min_range = 0.0;
        assert_eq!(
            Err(ConfigError::NonPositiveParameter("min_range")),
            Autoland::new(config).map(|_| ())
        );

        let mut config = test_config();
        config.trim_pitch = f32::NAN;
        assert_eq!(
            Err(ConfigError::NonFiniteParameter("trim_pitch")),
            Autoland::new(config).map(|_| ())
        );
    }

    #[test]
    fn test_zero_elapsed_time_gives_zero_height_rate() {
        let mut core = Autoland::new(test_config()).unwrap();
        let low = SensorInput {
            altitude: 3.0,
            ..on_glideslope_input()
        };
        core.tick(&low, 500);
        let first = core.pitch_ref().unwrap();

        // Same timestamp, different altitude: the rate estimate must be
        // zero rather than infinite, and the command must stay finite.
        let lower = SensorInput {
            altitude: 2.0,
            ..on_glideslope_input()
        };
        core.tick(&lower, 500);
        let second = core.pitch_ref().unwrap();
        assert!(first.is_finite() && second.is_finite());
    }
}
