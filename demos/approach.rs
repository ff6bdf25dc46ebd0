// demos/approach.rs

use fixed_wing_autoland::{Autoland, AutolandConfig, Phase, RunwayFrame, SensorInput};

fn main() {
    let mut config = AutolandConfig::<f32>::reference_tuning();

    // Re-seat the reference laws on a toy runway at the origin, aligned with
    // local north, and keep the commands in angular units.
    config.runway = RunwayFrame {
        lat_e7: 0,
        lon_e7: 0,
        heading: 0.0,
        cos_term: 0.01,
        sin_term: 0.0,
    };
    config.elevator_map.calibration = None;
    config.aileron_map.calibration = None;

    let mut autoland = match Autoland::new(config) {
        Ok(autoland) => autoland,
        Err(error) => {
            eprintln!("configuration rejected: {}", error);
            return;
        }
    };

    // Start 500 m out on a slightly shallow glidepath, a little left of the
    // centerline, and descend toward the threshold.
    let mut input = SensorInput {
        lat_e7: 50_000, // 500 m down-range
        lon_e7: -500,   // 5 m left of centerline
        altitude: 40.0,
        airspeed: 15.0,
        pitch: 0.0,
        heading: 0.0,
        roll: 0.0,
    };
    let dt_ms = 100u32;
    let sink_rate = 1.4; // m/s along the glidepath
    let ground_speed = 14.9; // m/s toward the threshold

    println!("    t,  phase,    alt,  range,  elevator,   aileron,  throttle");
    let mut now_ms = 0u32;
    for _ in 0..=250 {
        autoland.tick(&input, now_ms);

        let phase = match autoland.phase() {
            Phase::Approach => "apprch",
            Phase::Flare => " flare",
        };
        println!(
            "{:5}, {}, {:6.2}, {:6.1}, {:9.2}, {:9.2}, {:9.2}",
            now_ms,
            phase,
            input.altitude,
            input.lat_e7 as f32 * 0.01,
            autoland.elevator(),
            autoland.aileron(),
            autoland.throttle(),
        );

        // Toy kinematics: fly toward the threshold at a fixed ground speed
        // and sink rate, shallowing out once the flare law takes over.
        let dt = dt_ms as f32 / 1000.0;
        let sink = match autoland.phase() {
            Phase::Approach => sink_rate,
            Phase::Flare => 0.4 * input.altitude,
        };
        input.altitude = (input.altitude - sink * dt).max(0.0);
        input.lat_e7 -= (ground_speed * dt * 100.0) as i32;
        now_ms += dt_ms;

        if input.altitude <= 0.0 {
            println!("touchdown");
            break;
        }
    }
}
