//! Core types for the fusion compass library

/// Kind of sensor a sample originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Three-axis magnetometer, µT in Q16
    Magnetometer,
    /// Three-axis accelerometer, m/s² in Q16
    Accelerometer,
    /// Three-axis gyroscope, deg/s in Q16 (accepted but not supported)
    Gyroscope,
}

/// One timestamped sensor reading in wire format
///
/// Vector components are Q16 fixed point: magnetometer in µT × 65536,
/// accelerometer in (m/s²) × 65536. The two status bytes carry the
/// originating device's status registers and are not interpreted here.
#[derive(Debug, Clone, Copy)]
pub struct SensorSample {
    /// Three-component vector in Q16
    pub vector: [i32; 3],
    /// Originating sensor kind
    pub kind: SensorKind,
    /// Timestamp in microseconds
    pub timestamp_us: u32,
    /// Device status registers
    pub status: [i16; 2],
}

impl SensorSample {
    /// Construct a magnetometer sample from Q16 components
    pub fn magnetometer(vector: [i32; 3], timestamp_us: u32) -> Self {
        Self {
            vector,
            kind: SensorKind::Magnetometer,
            timestamp_us,
            status: [0, 0],
        }
    }

    /// Construct an accelerometer sample from Q16 components
    pub fn accelerometer(vector: [i32; 3], timestamp_us: u32) -> Self {
        Self {
            vector,
            kind: SensorKind::Accelerometer,
            timestamp_us,
            status: [0, 0],
        }
    }
}

/// Kind of vector readable through [`get_vector`](crate::FusionHandle::get_vector)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    /// Calibrated magnetic field and bias: (x, y, z, bias_x, bias_y, bias_z), µT in Q16
    Magnetic,
    /// Averaged acceleration: (x, y, z), m/s² in Q16
    Acceleration,
    /// Angular rate: reserved, not supported
    AngularRate,
    /// Orientation: (azimuth, pitch, roll), degrees in Q16
    Orientation,
    /// Quaternion: reserved, not supported
    Quaternion,
}

impl VectorKind {
    /// Fixed output width in i32 elements
    pub fn width(self) -> usize {
        match self {
            VectorKind::Magnetic => 6,
            VectorKind::Acceleration => 3,
            VectorKind::AngularRate => 6,
            VectorKind::Orientation => 3,
            VectorKind::Quaternion => 4,
        }
    }
}

/// Last-computed orientation in degrees
///
/// Azimuth is in [0, 360), pitch and roll in [-90, 90], derived with the
/// accelerometer as gravity reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    /// Compass heading, 0° = North, clockwise positive
    pub azimuth: f32,
    /// Rotation about the device X axis
    pub pitch: f32,
    /// Rotation about the device Y axis
    pub roll: f32,
}

/// Compass algorithm settings
///
/// The plausibility window brackets believable geomagnetic field strengths;
/// samples whose corrected magnitude falls outside it are excluded from
/// offset estimation, and an averaged field above the maximum demotes the
/// accuracy status to 0.
///
/// # Example
/// ```
/// use fusion_compass::CompassSettings;
///
/// let settings = CompassSettings {
///     calibration_spread: 20.0, // require wider rotation coverage
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompassSettings {
    /// Minimum plausible geomagnetic field magnitude in µT
    pub geomag_min: f32,
    /// Maximum plausible geomagnetic field magnitude in µT
    pub geomag_max: f32,
    /// Per-axis half-spread in µT the sample window must cover before the
    /// offset estimate is replaced
    pub calibration_spread: f32,
    /// Field magnitude in µT the sensitivity scale normalizes toward
    pub expected_field: f32,
}

impl Default for CompassSettings {
    fn default() -> Self {
        Self {
            geomag_min: 10.0,
            geomag_max: 70.0,
            calibration_spread: 12.0,
            expected_field: 45.0,
        }
    }
}

/// Licensing record accepted at handle construction
///
/// Carried for wire compatibility with the sealed vendor library; not
/// behaviorally load-bearing in this build.
#[derive(Debug, Clone, Default)]
pub struct Certification {
    /// Licenser name, at most 16 characters
    pub licenser: String,
    /// Licensee name, at most 16 characters
    pub licensee: String,
    /// Key material
    pub key: [i16; 16],
}

/// Library version record
///
/// All fields are zero in this build, matching the open-source variant of
/// the reference library.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryInfo {
    /// Device part number
    pub partno: i16,
    /// Major version
    pub major: i16,
    /// Minor version
    pub minor: i16,
    /// Revision number
    pub revision: i16,
    /// Build date code
    pub datecode: i16,
    /// Custom variation number
    pub variation: i16,
}

/// Where the calibration state came from at measurement start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationSource {
    /// A persisted record with a valid magic marker was restored
    Restored,
    /// No usable record was supplied; built-in defaults are in effect
    Defaulted,
}
