//! Demonstrates offset convergence and calibration persistence: rotate a
//! biased field through a full turn, watch accuracy climb, then carry the
//! learned offset into a second measurement session through the blob.

use fusion_compass::{
    CalibrationSource, Certification, FusionHandle, SensorSample, VectorKind, fixed,
};
use std::f32::consts::PI;

const HARD_IRON_BIAS: [f32; 3] = [12.0, -7.0, 4.0];

fn rotating_sample(step: u32) -> SensorSample {
    let theta = step as f32 / 32.0 * 2.0 * PI;
    SensorSample::magnetometer(
        [
            fixed::to_q16(40.0 * theta.cos() + HARD_IRON_BIAS[0]),
            fixed::to_q16(40.0 * theta.sin() + HARD_IRON_BIAS[1]),
            fixed::to_q16(30.0 * (2.0 * theta).sin() + HARD_IRON_BIAS[2]),
        ],
        step * 10_000,
    )
}

fn main() {
    env_logger::init();

    let handle = FusionHandle::new(Certification::default(), 1);
    let source = handle.start_measurement(None);
    println!("first session: {:?}", source);

    // Rotate the device through a full turn so the estimator can place the
    // center of the field sphere.
    for step in 0..64u32 {
        handle.set_vector(&[rotating_sample(step)]).unwrap();
        if step % 8 == 0 {
            println!("step {:2}: accuracy {}", step, handle.accuracy());
        }
    }

    let mut magnetic = [0i32; 6];
    handle.get_vector(VectorKind::Magnetic, &mut magnetic).unwrap();
    println!(
        "learned bias: ({:.1}, {:.1}, {:.1}) µT, true bias ({:.1}, {:.1}, {:.1}) µT",
        fixed::from_q16(magnetic[3]),
        fixed::from_q16(magnetic[4]),
        fixed::from_q16(magnetic[5]),
        HARD_IRON_BIAS[0],
        HARD_IRON_BIAS[1],
        HARD_IRON_BIAS[2],
    );

    // Persist and start a new session from the blob.
    let mut blob = [0u8; fusion_compass::CALIBRATION_RECORD_SIZE];
    handle.stop_measurement(&mut blob).unwrap();

    let source = handle.start_measurement(Some(&blob));
    println!("second session: {:?} (accuracy {})", source, handle.accuracy());

    assert_eq!(source, CalibrationSource::Restored);
    let mut restored = [0i32; 6];
    handle.get_vector(VectorKind::Magnetic, &mut restored).unwrap();
    println!(
        "restored bias: ({:.1}, {:.1}, {:.1}) µT",
        fixed::from_q16(restored[3]),
        fixed::from_q16(restored[4]),
        fixed::from_q16(restored[5]),
    );
}
