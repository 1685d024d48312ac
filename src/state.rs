//! Fusion state block and measurement pipeline

use crate::buffer::VectorBuffer;
use crate::direction;
use crate::error::FusionError;
use crate::fixed::to_q16;
use crate::offset::OffsetEstimator;
use crate::persist::CalibrationRecord;
use crate::types::{
    CalibrationSource, CompassSettings, Orientation, SensorKind, SensorSample, VectorKind,
};
use nalgebra::Vector3;

/// Raw-history depth per channel
pub(crate) const HISTORY_DEPTH: usize = 8;

/// Averaging window used by the fusion pipeline
pub(crate) const AVERAGE_WINDOW: usize = 4;

/// Accuracy reported for acceleration and orientation reads
const FIXED_STATUS: i32 = 3;

/// The aggregate fusion state for one device
///
/// Holds the per-channel sample buffers, the offset estimator, the
/// last-computed vectors and orientation, and the accuracy status. One
/// instance exists per [`FusionHandle`](crate::FusionHandle) and is only
/// ever reached through its lock.
#[derive(Debug)]
pub(crate) struct FusionState {
    settings: CompassSettings,
    /// Raw magnetometer history in µT
    mag_raw: VectorBuffer<HISTORY_DEPTH>,
    /// Offset-corrected magnetometer history
    mag_corrected: VectorBuffer<HISTORY_DEPTH>,
    /// Offset-corrected accelerometer history in m/s²
    acc_corrected: VectorBuffer<HISTORY_DEPTH>,
    /// Magnetometer offset and sensitivity estimator
    estimator: OffsetEstimator,
    /// Accelerometer offset, zero in this build
    acc_offset: Vector3<f32>,
    /// Accelerometer per-axis sensitivity, unit in this build
    acc_sensitivity: Vector3<f32>,
    /// Last averaged, corrected magnetic field in µT
    field: Vector3<f32>,
    /// Last averaged acceleration in m/s²
    acceleration: Vector3<f32>,
    /// Last solved orientation in degrees
    orientation: Orientation,
    /// Canary counter, bumped as the last store of every mutating operation
    revision: u64,
}

impl FusionState {
    /// Create a zeroed state block
    pub(crate) fn new(settings: CompassSettings) -> Self {
        Self {
            settings,
            mag_raw: VectorBuffer::new(),
            mag_corrected: VectorBuffer::new(),
            acc_corrected: VectorBuffer::new(),
            estimator: OffsetEstimator::new(settings),
            acc_offset: Vector3::zeros(),
            acc_sensitivity: Vector3::repeat(1.0),
            field: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            orientation: Orientation::default(),
            revision: 0,
        }
    }

    /// Begin a measurement session
    ///
    /// Restores a persisted offset when a record is supplied, otherwise
    /// loads built-in defaults. The estimator's convergence bookkeeping is
    /// cold-restarted either way.
    pub(crate) fn start_measurement(
        &mut self,
        record: Option<CalibrationRecord>,
    ) -> CalibrationSource {
        self.mag_raw.clear();
        self.mag_corrected.clear();
        self.acc_corrected.clear();
        self.field = Vector3::zeros();
        self.acceleration = Vector3::zeros();
        self.orientation = Orientation::default();

        let source = match record {
            Some(record) => {
                self.estimator.restore(record.offset);
                CalibrationSource::Restored
            }
            None => {
                self.estimator.reset();
                CalibrationSource::Defaulted
            }
        };

        self.revision = self.revision.wrapping_add(1);
        source
    }

    /// Snapshot the persistable subset of the calibration state
    pub(crate) fn calibration_record(&self) -> CalibrationRecord {
        CalibrationRecord {
            offset: self.estimator.offset(),
        }
    }

    /// Route one sample into its channel
    ///
    /// Gyroscope samples report [`FusionError::NotSupported`]; state already
    /// updated by earlier samples in a batch is left intact.
    pub(crate) fn apply_sample(&mut self, sample: &SensorSample) -> Result<(), FusionError> {
        let vector = Vector3::new(
            crate::fixed::from_q16(sample.vector[0]),
            crate::fixed::from_q16(sample.vector[1]),
            crate::fixed::from_q16(sample.vector[2]),
        );

        match sample.kind {
            SensorKind::Magnetometer => {
                self.ingest_mag(vector);
                self.revision = self.revision.wrapping_add(1);
                Ok(())
            }
            SensorKind::Accelerometer => {
                self.ingest_acc(vector);
                self.revision = self.revision.wrapping_add(1);
                Ok(())
            }
            SensorKind::Gyroscope => Err(FusionError::NotSupported),
        }
    }

    /// Magnetometer ingest: buffer, estimate, renormalize, average
    fn ingest_mag(&mut self, raw: Vector3<f32>) {
        self.mag_raw.push(raw);
        self.estimator.update(raw);

        // Renormalize the whole corrected history with the current offset
        // and sensitivity so a refit retroactively applies to buffered data.
        let estimator = &self.estimator;
        let corrected = &mut self.mag_corrected;
        corrected.clear();
        for v in self.mag_raw.iter() {
            corrected.push(estimator.correct(v));
        }

        if let Ok(average) = self.mag_corrected.average(AVERAGE_WINDOW) {
            self.field = average;
            // A field this strong cannot be geomagnetic; the estimate is
            // being dominated by interference.
            if self.field.norm() > self.settings.geomag_max {
                self.estimator.demote();
            }
        }
    }

    /// Accelerometer ingest: correct and average
    fn ingest_acc(&mut self, raw: Vector3<f32>) {
        let corrected = (raw - self.acc_offset).component_div(&self.acc_sensitivity);
        self.acc_corrected.push(corrected);

        if let Ok(average) = self.acc_corrected.average(AVERAGE_WINDOW) {
            self.acceleration = average;
        }
    }

    /// Run the averager and direction solver over the buffered windows
    pub(crate) fn compute_fusion(&mut self) -> Result<(), FusionError> {
        let magnetic = self.mag_corrected.average(AVERAGE_WINDOW)?;
        let gravity = self.acc_corrected.average(AVERAGE_WINDOW)?;

        let orientation =
            direction::solve(magnetic, gravity).map_err(|_| FusionError::ComputeFailed)?;

        self.orientation = orientation;
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    /// Copy the last-computed vector of the requested kind into `out`
    ///
    /// Fails with [`FusionError::InvalidArgument`] when `out` is smaller
    /// than the kind's fixed width, leaving `out` untouched. Returns the
    /// accuracy status for the vector.
    pub(crate) fn get_vector(
        &self,
        kind: VectorKind,
        out: &mut [i32],
    ) -> Result<i32, FusionError> {
        if matches!(kind, VectorKind::AngularRate | VectorKind::Quaternion) {
            return Err(FusionError::NotSupported);
        }

        if out.len() < kind.width() {
            return Err(FusionError::InvalidArgument);
        }

        match kind {
            VectorKind::Magnetic => {
                let bias = self.estimator.offset();
                for i in 0..3 {
                    out[i] = to_q16(self.field[i]);
                    out[i + 3] = to_q16(bias[i]);
                }
                Ok(self.estimator.accuracy())
            }
            VectorKind::Acceleration => {
                for i in 0..3 {
                    out[i] = to_q16(self.acceleration[i]);
                }
                Ok(FIXED_STATUS)
            }
            VectorKind::Orientation => {
                out[0] = to_q16(self.orientation.azimuth);
                out[1] = to_q16(self.orientation.pitch);
                out[2] = to_q16(self.orientation.roll);
                Ok(FIXED_STATUS)
            }
            VectorKind::AngularRate | VectorKind::Quaternion => Err(FusionError::NotSupported),
        }
    }

    /// Reset calibration confidence and discard the in-memory estimate
    pub(crate) fn force_recalibration(&mut self) {
        self.estimator.reset();
        self.revision = self.revision.wrapping_add(1);
    }

    /// Calibration confidence in [0, 3]
    pub(crate) fn accuracy(&self) -> i32 {
        self.estimator.accuracy()
    }

    /// Canary counter for torn-write detection in tests
    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }
}
