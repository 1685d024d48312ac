//! Calibration persistence codec
//!
//! The externally persisted subset of the fusion state is a small opaque
//! blob: a fixed magic marker followed by the offset vector. Anything that
//! does not match that layout exactly is rejected wholesale and treated as
//! "no prior calibration" — a corrupted settings file and a first run are
//! deliberately indistinguishable to callers.

use crate::error::FusionError;
use nalgebra::Vector3;

/// Sentinel identifying a genuine calibration record
pub const CALIBRATION_MAGIC: u32 = 0xCAFE_CAFE;

/// Size of the encoded record: 4-byte magic + 3 × f32 offset
pub const CALIBRATION_RECORD_SIZE: usize = 16;

/// Size in bytes of the calibration blob for the given formation count
///
/// Deterministic; callers use it to allocate storage before
/// [`stop_measurement`](crate::FusionHandle::stop_measurement). The
/// formation count is accepted for wire compatibility but does not affect
/// the size while only one formation is supported.
pub fn calibration_size(_formation_count: u8) -> usize {
    CALIBRATION_RECORD_SIZE
}

/// The persistable subset of the calibration state
///
/// Only the offset vector survives a power cycle; sensitivity and the
/// estimator working set restart from defaults on reload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRecord {
    /// Magnetometer hard-iron offset in µT
    pub offset: Vector3<f32>,
}

impl CalibrationRecord {
    /// Serialize the record into `out`, returning the number of bytes written
    ///
    /// Fails with [`FusionError::InvalidArgument`] when `out` is smaller
    /// than [`CALIBRATION_RECORD_SIZE`]; `out` is left untouched.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize, FusionError> {
        if out.len() < CALIBRATION_RECORD_SIZE {
            return Err(FusionError::InvalidArgument);
        }

        out[0..4].copy_from_slice(&CALIBRATION_MAGIC.to_le_bytes());
        out[4..8].copy_from_slice(&self.offset.x.to_le_bytes());
        out[8..12].copy_from_slice(&self.offset.y.to_le_bytes());
        out[12..16].copy_from_slice(&self.offset.z.to_le_bytes());

        Ok(CALIBRATION_RECORD_SIZE)
    }

    /// Decode a persisted blob
    ///
    /// Returns `None` on any size or magic mismatch; the caller falls back
    /// to built-in defaults.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != CALIBRATION_RECORD_SIZE {
            return None;
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != CALIBRATION_MAGIC {
            return None;
        }

        let component = |at: usize| f32::from_le_bytes([
            bytes[at],
            bytes[at + 1],
            bytes[at + 2],
            bytes[at + 3],
        ]);

        Some(Self {
            offset: Vector3::new(component(4), component(8), component(12)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let record = CalibrationRecord {
            offset: Vector3::new(12.5, -3.25, 0.0625),
        };

        let mut blob = [0u8; CALIBRATION_RECORD_SIZE];
        let written = record.encode_into(&mut blob).unwrap();
        assert_eq!(written, CALIBRATION_RECORD_SIZE);

        let decoded = CalibrationRecord::decode(&blob).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_flipped_magic_rejected() {
        let record = CalibrationRecord {
            offset: Vector3::new(1.0, 2.0, 3.0),
        };
        let mut blob = [0u8; CALIBRATION_RECORD_SIZE];
        record.encode_into(&mut blob).unwrap();

        blob[0] ^= 0x01;
        assert!(CalibrationRecord::decode(&blob).is_none());
    }

    #[test]
    fn test_wrong_size_rejected() {
        let record = CalibrationRecord {
            offset: Vector3::new(1.0, 2.0, 3.0),
        };
        let mut blob = [0u8; CALIBRATION_RECORD_SIZE + 4];
        record.encode_into(&mut blob).unwrap();

        // Rejection is wholesale, not field-by-field: a longer buffer with a
        // valid prefix is still not a record.
        assert!(CalibrationRecord::decode(&blob).is_none());
        assert!(CalibrationRecord::decode(&blob[..8]).is_none());
        assert!(CalibrationRecord::decode(&[]).is_none());
    }

    #[test]
    fn test_encode_undersized_buffer() {
        let record = CalibrationRecord {
            offset: Vector3::new(1.0, 2.0, 3.0),
        };
        let mut short = [0xAAu8; CALIBRATION_RECORD_SIZE - 1];
        assert_eq!(
            record.encode_into(&mut short),
            Err(FusionError::InvalidArgument)
        );
        assert!(short.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_calibration_size_ignores_formation() {
        assert_eq!(calibration_size(0), CALIBRATION_RECORD_SIZE);
        assert_eq!(calibration_size(1), CALIBRATION_RECORD_SIZE);
        assert_eq!(calibration_size(4), CALIBRATION_RECORD_SIZE);
    }
}
