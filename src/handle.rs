//! Thread-safe handle owning the fusion state
//!
//! The fusion state is the single shared mutable resource of the library.
//! Every public operation acquires the handle's mutex for the whole
//! operation body, so at most one thread is inside any fusion operation at
//! a time. No operation performs I/O or waits on anything but that lock
//! while holding it; persistence I/O belongs to the caller, before
//! `start_measurement` and after `stop_measurement`.

use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::error::FusionError;
use crate::persist::CalibrationRecord;
use crate::state::FusionState;
use crate::types::{
    CalibrationSource, Certification, CompassSettings, LibraryInfo, SensorSample, VectorKind,
};

/// Size of the production-data-calibration parameter block
pub const PDC_SIZE: usize = 27;

/// Guarded owner of one fusion state block
///
/// Create exactly one handle per physical device and share it by reference
/// across the driver callback threads; the handle's lifetime is the fusion
/// state's lifetime. Callers that need the state after the handle is gone
/// must persist it through [`stop_measurement`](Self::stop_measurement)
/// first.
///
/// # Example
/// ```
/// use fusion_compass::{Certification, FusionHandle, SensorSample};
///
/// let handle = FusionHandle::new(Certification::default(), 1);
/// handle.start_measurement(None);
///
/// let sample = SensorSample::magnetometer([30 * 65536, 0, -20 * 65536], 0);
/// handle.set_vector(&[sample]).unwrap();
/// ```
#[derive(Debug)]
pub struct FusionHandle {
    state: Mutex<FusionState>,
    certification: Certification,
    formation_count: u8,
}

impl FusionHandle {
    /// Create a handle with default settings
    ///
    /// The certification record is carried but not interpreted; the
    /// formation count is reserved for multi-formation support and only a
    /// single formation is currently meaningful.
    pub fn new(certification: Certification, formation_count: u8) -> Self {
        Self::with_settings(CompassSettings::default(), certification, formation_count)
    }

    /// Create a handle with explicit compass settings
    pub fn with_settings(
        settings: CompassSettings,
        certification: Certification,
        formation_count: u8,
    ) -> Self {
        Self {
            state: Mutex::new(FusionState::new(settings)),
            certification,
            formation_count,
        }
    }

    /// Acquire the state lock, absorbing poisoning from a panicked holder
    fn lock(&self) -> MutexGuard<'_, FusionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Begin a measurement session, restoring persisted calibration if valid
    ///
    /// A missing blob, an undersized blob or a wrong magic marker all fall
    /// back to built-in defaults; the distinction between first run and
    /// corruption is deliberately not surfaced as an error, only through
    /// the returned [`CalibrationSource`] and the log.
    pub fn start_measurement(&self, calibration: Option<&[u8]>) -> CalibrationSource {
        let record = match calibration {
            None => None,
            Some(bytes) => {
                let decoded = CalibrationRecord::decode(bytes);
                if decoded.is_none() {
                    warn!("calibration blob rejected ({} bytes), using defaults", bytes.len());
                }
                decoded
            }
        };

        let source = self.lock().start_measurement(record);
        match source {
            CalibrationSource::Restored => info!("calibration restored from persisted record"),
            CalibrationSource::Defaulted => info!("calibration defaults in effect"),
        }
        source
    }

    /// End a measurement session, serializing the calibration state
    ///
    /// Writes the magic marker and offset vector into `out` and returns the
    /// number of bytes written. Fails only when `out` is smaller than
    /// [`calibration_size`](crate::persist::calibration_size).
    pub fn stop_measurement(&self, out: &mut [u8]) -> Result<usize, FusionError> {
        let record = self.lock().calibration_record();
        record.encode_into(out)
    }

    /// Feed a batch of sensor samples
    ///
    /// Samples are routed by their sensor kind; magnetometer samples also
    /// feed the offset estimator. Processing stops at the first failing
    /// sample (a gyroscope sample reports
    /// [`FusionError::NotSupported`]); samples already applied stay
    /// applied.
    pub fn set_vector(&self, samples: &[SensorSample]) -> Result<(), FusionError> {
        let mut state = self.lock();
        for sample in samples {
            state.apply_sample(sample)?;
        }
        Ok(())
    }

    /// Run the averaging and direction-solver pipeline
    ///
    /// Returns [`FusionError::InsufficientData`] until both channel windows
    /// have filled (expected during cold start) and
    /// [`FusionError::ComputeFailed`] when the gravity reference is
    /// degenerate.
    pub fn compute_fusion(&self) -> Result<(), FusionError> {
        let result = self.lock().compute_fusion();
        if let Err(err) = result {
            debug!("fusion step not updated: {}", err);
        }
        result
    }

    /// Read the last-computed vector of the requested kind
    ///
    /// `out` must hold at least [`VectorKind::width`] elements; on success
    /// the accuracy status for the vector is returned. Quaternion and
    /// angular-rate reads report [`FusionError::NotSupported`].
    pub fn get_vector(&self, kind: VectorKind, out: &mut [i32]) -> Result<i32, FusionError> {
        self.lock().get_vector(kind, out)
    }

    /// Reset calibration confidence to 0 and discard the in-memory estimate
    ///
    /// A previously persisted record is untouched until the next
    /// [`stop_measurement`](Self::stop_measurement) overwrites it.
    pub fn force_recalibration(&self) {
        self.lock().force_recalibration();
    }

    /// Switch to another formation profile
    ///
    /// Reserved extension point; only a single formation is supported.
    pub fn change_formation(&self, _formation: u8) -> Result<(), FusionError> {
        Err(FusionError::NotSupported)
    }

    /// Load production-data-calibration parameters
    ///
    /// Reserved extension point; not supported in this build.
    pub fn set_pdc(&self, _pdc: &[u8; PDC_SIZE], _formation: u8) -> Result<(), FusionError> {
        Err(FusionError::NotSupported)
    }

    /// Library version record (all zero in this build)
    pub fn library_info(&self) -> LibraryInfo {
        LibraryInfo::default()
    }

    /// The certification record supplied at construction
    pub fn certification(&self) -> &Certification {
        &self.certification
    }

    /// The formation count supplied at construction
    pub fn formation_count(&self) -> u8 {
        self.formation_count
    }

    /// Current calibration confidence in [0, 3]
    pub fn accuracy(&self) -> i32 {
        self.lock().accuracy()
    }

    /// Canary counter bumped as the last store of every mutating operation
    ///
    /// Strictly observational; tests use it to detect torn updates.
    pub fn revision(&self) -> u64 {
        self.lock().revision()
    }
}
