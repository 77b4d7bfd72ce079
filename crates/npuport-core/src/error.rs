use thiserror::Error;

use crate::BackendRc;

/// Failure taxonomy for every public entry point. `Unsupported` (the bound
/// backend lacks the capability slot) is deliberately distinct from
/// `BackendFailure` (the slot exists and reported an error).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NpuError {
    #[error("operation not provided by the bound backend")]
    Unsupported,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("backend returned failure code {0:?}")]
    BackendFailure(BackendRc),
    #[error("backend load failed: {0}")]
    LoadFailure(&'static str),
    #[error("no backend could service the request")]
    Exhausted,
}

pub type NpuResult<T> = Result<T, NpuError>;
