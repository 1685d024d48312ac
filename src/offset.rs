//! Automatic magnetometer offset correction

use crate::buffer::VectorBuffer;
use crate::types::CompassSettings;
use nalgebra::Vector3;

/// Depth of the estimator's rolling window of accepted samples
const WINDOW_DEPTH: usize = 32;

/// Minimum accepted samples before a fit is attempted
const FIT_MIN_SAMPLES: usize = 8;

/// Highest accuracy level
const ACCURACY_MAX: i32 = 3;

/// Magnetometer offset and sensitivity estimator
///
/// Maintains a running estimate of the slowly-drifting hard-iron offset so
/// that `raw - offset` is zero-centered over time, and a sensitivity scale
/// normalizing the corrected magnitude toward an expected geomagnetic field
/// strength. Samples whose corrected magnitude falls outside the plausible
/// field window are treated as probable noise and excluded.
///
/// The estimate converges deterministically from a bounded rolling window:
/// once the accepted samples cover a sufficient per-axis spread, the offset
/// snaps to the per-axis midpoint of the window extents. Accuracy advances
/// monotonically with the observed coverage and is reset only by an explicit
/// recalibration request or by over-field interference.
#[derive(Debug, Clone)]
pub struct OffsetEstimator {
    settings: CompassSettings,
    /// Rolling window of accepted raw samples
    window: VectorBuffer<WINDOW_DEPTH>,
    /// Current best-estimate hard-iron offset in µT
    offset: Vector3<f32>,
    /// Per-axis sensitivity scale, unit on cold start
    sensitivity: Vector3<f32>,
    /// Calibration confidence, 0 (uncalibrated) to 3 (high)
    accuracy: i32,
}

impl OffsetEstimator {
    /// Create an estimator with zero offset and unit sensitivity
    pub fn new(settings: CompassSettings) -> Self {
        Self {
            settings,
            window: VectorBuffer::new(),
            offset: Vector3::zeros(),
            sensitivity: Vector3::repeat(1.0),
            accuracy: 0,
        }
    }

    /// Feed one raw magnetometer sample in µT
    ///
    /// Returns true when the offset estimate was replaced by a new fit.
    pub fn update(&mut self, raw: Vector3<f32>) -> bool {
        // Plausibility gate: correct with the current estimate and reject
        // magnitudes outside the believable geomagnetic range.
        let corrected = self.correct(raw);
        let magnitude = corrected.norm();
        if magnitude < self.settings.geomag_min || magnitude > self.settings.geomag_max {
            return false;
        }

        self.window.push(raw);
        if self.window.len() < FIT_MIN_SAMPLES {
            return false;
        }

        let Some((min, max)) = self.window.extents() else {
            return false;
        };
        let half_spread = (max - min) * 0.5;
        let min_spread = half_spread.x.min(half_spread.y).min(half_spread.z);
        if min_spread < self.settings.calibration_spread {
            return false;
        }

        // The window covers enough of the field sphere on every axis to
        // place its center. Offset becomes the per-axis midpoint; the
        // sensitivity scale maps the mean center distance to the expected
        // field strength.
        let center = (max + min) * 0.5;
        let mut radius = 0.0;
        for v in self.window.iter() {
            radius += (v - center).norm();
        }
        radius /= self.window.len() as f32;

        self.offset = center;
        if radius > 0.0 && self.settings.expected_field > 0.0 {
            self.sensitivity = Vector3::repeat(radius / self.settings.expected_field);
        }

        let level = if min_spread >= 2.0 * self.settings.calibration_spread {
            ACCURACY_MAX
        } else if min_spread >= 1.5 * self.settings.calibration_spread {
            2
        } else {
            1
        };
        self.accuracy = self.accuracy.max(level);

        true
    }

    /// Apply the current offset and sensitivity to a raw sample
    pub fn correct(&self, raw: Vector3<f32>) -> Vector3<f32> {
        (raw - self.offset).component_div(&self.sensitivity)
    }

    /// Current offset estimate in µT
    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    /// Current per-axis sensitivity scale
    pub fn sensitivity(&self) -> Vector3<f32> {
        self.sensitivity
    }

    /// Calibration confidence in [0, 3]
    pub fn accuracy(&self) -> i32 {
        self.accuracy
    }

    /// Drop confidence to 0 after over-field interference
    pub fn demote(&mut self) {
        self.accuracy = 0;
    }

    /// Discard the in-memory estimate and restart convergence from zero
    pub fn reset(&mut self) {
        self.window.clear();
        self.offset = Vector3::zeros();
        self.sensitivity = Vector3::repeat(1.0);
        self.accuracy = 0;
    }

    /// Resume from a persisted offset with cold convergence bookkeeping
    ///
    /// The restored offset stays in effect until a full window of accepted
    /// samples produces a better fit; partial data never degrades it.
    pub fn restore(&mut self, offset: Vector3<f32>) {
        self.window.clear();
        self.offset = offset;
        self.sensitivity = Vector3::repeat(1.0);
        self.accuracy = 0;
    }
}
