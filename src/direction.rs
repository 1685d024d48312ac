//! Tilt-compensated direction solver

use crate::error::DegenerateInput;
use crate::types::Orientation;
use nalgebra::Vector3;

const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Accelerometer magnitudes below this have no usable gravity reference
const GRAVITY_EPSILON: f32 = 1e-6;

/// Solve azimuth, pitch and roll from averaged, offset-corrected vectors
///
/// Pitch and roll come from the accelerometer-as-gravity-reference vector;
/// azimuth from the magnetic vector rotated onto the horizontal plane that
/// reference defines. Axes follow the Android device convention (X right,
/// Y forward, Z up).
///
/// # Arguments
/// * `magnetic` - Averaged, offset-corrected magnetometer vector in µT
/// * `acceleration` - Averaged accelerometer vector in m/s²
///
/// # Returns
/// Orientation in degrees: azimuth in [0, 360), pitch and roll in [-90, 90].
/// Fails with [`DegenerateInput`] when the acceleration magnitude is near
/// zero and the gravity reference is undefined.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use fusion_compass::direction::solve;
///
/// let magnetic = Vector3::new(0.0, 45.0, -30.0); // northern hemisphere field
/// let gravity = Vector3::new(0.0, 0.0, 9.81);    // level device
/// let ori = solve(magnetic, gravity).unwrap();
/// assert!(ori.azimuth < 1.0 || ori.azimuth > 359.0); // facing North
/// ```
pub fn solve(
    magnetic: Vector3<f32>,
    acceleration: Vector3<f32>,
) -> Result<Orientation, DegenerateInput> {
    let (pitch, roll) = gravity_angles(acceleration)?;
    let azimuth = horizontal_azimuth(pitch, roll, magnetic);

    Ok(Orientation {
        azimuth: wrap_azimuth(azimuth * RAD_TO_DEG),
        pitch: pitch * RAD_TO_DEG,
        roll: roll * RAD_TO_DEG,
    })
}

/// Pitch and roll in radians from the gravity reference vector
fn gravity_angles(acceleration: Vector3<f32>) -> Result<(f32, f32), DegenerateInput> {
    let magnitude = acceleration.norm();
    if magnitude < GRAVITY_EPSILON {
        return Err(DegenerateInput);
    }

    let pitch = (-acceleration.y / magnitude).asin();
    let roll = (acceleration.x / magnitude).asin();

    Ok((pitch, roll))
}

/// Azimuth in radians from the magnetic vector projected onto the
/// horizontal plane defined by pitch and roll
fn horizontal_azimuth(pitch: f32, roll: f32, magnetic: Vector3<f32>) -> f32 {
    let (sin_p, cos_p) = pitch.sin_cos();
    let (sin_r, cos_r) = roll.sin_cos();

    let yh = -magnetic.x * cos_r + magnetic.z * sin_r;
    let xh = magnetic.x * sin_p * sin_r + magnetic.y * cos_p + magnetic.z * sin_p * cos_r;

    // atan2(y, x): y clockwise, x north
    yh.atan2(xh)
}

/// Wrap a heading in degrees into [0, 360)
fn wrap_azimuth(degrees: f32) -> f32 {
    let mut azimuth = degrees;
    if azimuth < 0.0 {
        azimuth += 360.0;
    }
    if azimuth >= 360.0 {
        azimuth -= 360.0;
    }
    azimuth
}
