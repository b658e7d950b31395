//! Error types shared by every operation in the crate.

/// Errors produced by array operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumpyExtError {
    #[error("step_mult should be bigger than 0 (got {0})")]
    InvalidStepMultiplier(f64),

    #[error("min_step should be bigger than 0 (got {0})")]
    InvalidMinStep(f64),

    #[error("range bounds must be finite (start {start}, end {end})")]
    NonFiniteBound { start: f64, end: f64 },

    #[error("step is too small to advance past {at}")]
    StepUnderflow { at: f64 },

    #[error("window should be bigger than 0")]
    InvalidWindow,

    #[error("array size ({len}) should be bigger than window ({window})")]
    WindowTooLarge { window: usize, len: usize },

    #[error("min_periods should be bigger than 0")]
    InvalidMinPeriods,

    #[error("array size ({len}) should be bigger than min_periods ({min_periods})")]
    MinPeriodsTooLarge { min_periods: usize, len: usize },

    #[error("at least one input array is required")]
    NoArrays,

    #[error("arrays must be the same length (expected {expected}, got {found})")]
    LengthMismatch { expected: usize, found: usize },

    #[error("wrong array shape ({ndim} dimensions), supported only 1D arrays")]
    NotOneDimensional { ndim: usize },

    #[error("n_jobs == 0 has no meaning")]
    InvalidJobs,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Result type for array operations.
pub type Result<T> = std::result::Result<T, NumpyExtError>;

impl From<rayon::ThreadPoolBuildError> for NumpyExtError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        NumpyExtError::ThreadPool(err.to_string())
    }
}
