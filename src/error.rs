use thiserror::Error;

/// Errors returned by the anomaly detectors and their dataset plumbing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnomalyError {
    /// Out-of-range hyperparameter or input the detector cannot use.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Inference was requested before a successful `train`.
    #[error("not fitted: {0}")]
    NotFitted(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, AnomalyError>;

#[cfg(feature = "python")]
impl From<AnomalyError> for pyo3::PyErr {
    fn from(err: AnomalyError) -> Self {
        match err {
            AnomalyError::InvalidArgument(_) => {
                pyo3::exceptions::PyValueError::new_err(err.to_string())
            }
            AnomalyError::NotFitted(_) | AnomalyError::Runtime(_) => {
                pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
            }
        }
    }
}
