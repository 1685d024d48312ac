use fusion_compass::{Certification, FusionHandle, SensorSample, VectorKind, fixed};

fn main() {
    env_logger::init();

    let handle = FusionHandle::new(Certification::default(), 1);
    handle.start_measurement(None);

    for i in 0..10u32 {
        // this loop should repeat each time new sensor data is available
        let magnetometer = SensorSample::magnetometer(
            [fixed::to_q16(30.0), fixed::to_q16(15.0), fixed::to_q16(-20.0)],
            i * 10_000,
        ); // replace this with actual magnetometer data in µT (Q16)
        let accelerometer = SensorSample::accelerometer(
            [0, 0, fixed::ACC_1G_IN_Q16],
            i * 10_000,
        ); // replace this with actual accelerometer data in m/s² (Q16)

        handle.set_vector(&[magnetometer, accelerometer]).unwrap();

        match handle.compute_fusion() {
            Ok(()) => {
                let mut orientation = [0i32; 3];
                let status = handle
                    .get_vector(VectorKind::Orientation, &mut orientation)
                    .unwrap();

                println!(
                    "Azimuth: {:.2}, Pitch: {:.2}, Roll: {:.2} (accuracy {})",
                    fixed::from_q16(orientation[0]),
                    fixed::from_q16(orientation[1]),
                    fixed::from_q16(orientation[2]),
                    status
                );
            }
            Err(err) => println!("warming up: {}", err),
        }
    }

    let mut blob = [0u8; fusion_compass::CALIBRATION_RECORD_SIZE];
    handle.stop_measurement(&mut blob).unwrap();
    println!("calibration blob: {:02x?}", blob);
}
