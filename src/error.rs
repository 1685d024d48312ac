//! Error taxonomy for the fusion compass library

use thiserror::Error;

/// Errors returned by the fusion compass API
///
/// All failures are reported as explicit results, never panics. Callers are
/// expected to log and continue; no variant is fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FusionError {
    /// An argument is out of range or a caller buffer is undersized
    #[error("invalid argument")]
    InvalidArgument,
    /// The requested feature is declared but not implemented in this build
    ///
    /// Gyroscope input, quaternion output, formation change and PDC all
    /// report this variant.
    #[error("operation not supported")]
    NotSupported,
    /// The fusion pipeline could not produce a geometrically valid result
    #[error("fusion computation failed")]
    ComputeFailed,
    /// Fewer samples than the averaging window have been pushed
    ///
    /// This is an expected transient state during cold start, not a fault.
    #[error("not enough samples buffered")]
    InsufficientData,
}

/// Direction solver failure
///
/// Raised when the accelerometer vector's magnitude is near zero and the
/// gravity reference is undefined. Mapped to [`FusionError::ComputeFailed`]
/// at the pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("gravity reference undefined")]
pub struct DegenerateInput;
