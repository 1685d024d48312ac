//! Fusion Compass - tilt-compensated compass fusion with automatic
//! magnetometer offset correction and persistent calibration
//!
//! This library fuses periodic magnetometer and accelerometer samples into
//! calibrated magnetic-field, orientation and bias vectors for a mobile
//! device. It buffers and time-averages raw Q16 fixed-point samples,
//! continuously estimates and subtracts a slowly-drifting magnetometer
//! offset, computes azimuth/pitch/roll with the accelerometer as gravity
//! reference, and exposes the whole state through a single thread-safe
//! handle that driver callback threads share.
//!
//! Calibration survives power cycles as a small opaque blob written at the
//! end of a measurement session and restored at the start of the next one;
//! a corrupt or missing blob silently falls back to built-in defaults.
//!
//! # Quick Start
//!
//! ```rust
//! use fusion_compass::{
//!     Certification, FusionHandle, SensorSample, VectorKind, fixed,
//! };
//!
//! let handle = FusionHandle::new(Certification::default(), 1);
//! handle.start_measurement(None);
//!
//! // Feed one batch per driver callback: Q16 wire format, µT and m/s².
//! for _ in 0..8 {
//!     let samples = [
//!         SensorSample::magnetometer([fixed::to_q16(30.0), 0, fixed::to_q16(-20.0)], 0),
//!         SensorSample::accelerometer([0, 0, fixed::ACC_1G_IN_Q16], 0),
//!     ];
//!     handle.set_vector(&samples).unwrap();
//! }
//!
//! // Fuse and read the orientation (azimuth, pitch, roll in Q16 degrees).
//! handle.compute_fusion().unwrap();
//! let mut orientation = [0i32; 3];
//! let status = handle.get_vector(VectorKind::Orientation, &mut orientation).unwrap();
//! println!("azimuth: {}", fixed::from_q16(orientation[0]));
//! # let _ = status;
//! ```

pub mod buffer;
pub mod direction;
mod error;
pub mod fixed;
mod handle;
pub mod offset;
pub mod persist;
mod state;
mod types;

// Re-export the public surface
pub use error::{DegenerateInput, FusionError};
pub use handle::{FusionHandle, PDC_SIZE};
pub use offset::OffsetEstimator;
pub use persist::{CALIBRATION_MAGIC, CALIBRATION_RECORD_SIZE, CalibrationRecord, calibration_size};
pub use types::*;
