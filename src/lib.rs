//! Batch anomaly detection with isolation forests and robust z-scores.
//!
//! ```
//! use isoforest_rust::{Dataset, Detector, IsolationForest, IsolationForestParams};
//!
//! let mut rows: Vec<Vec<f64>> = (0..100)
//!     .map(|i| vec![(i % 10) as f64, (i / 10) as f64])
//!     .collect();
//! rows.push(vec![100.0, -100.0]);
//! let dataset = Dataset::from_rows(rows).unwrap();
//!
//! let mut forest = IsolationForest::from_params(IsolationForestParams {
//!     trees: 100,
//!     ratio: 0.5,
//!     random_state: Some(0),
//!     ..IsolationForestParams::default()
//! })
//! .unwrap();
//! forest.train(&dataset).unwrap();
//!
//! let labels = forest.predict(&dataset).unwrap();
//! assert_eq!(labels[100], 1);
//! ```

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod error;
pub mod models;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use error::{AnomalyError, Result};
pub use models::base_model::{Detector, Scoring};
pub use models::isolation_forest::{IsolationForest, IsolationForestParams};
pub use models::isolation_tree::{Isolation, IsolationTree, Leaf};
pub use models::robust_zscore::RobustZScore;
pub use utils::dataset::{DataType, Dataset, Value};

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn isoforest_rust(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<python::PyIsolationForest>()?;
    m.add_class::<python::PyRobustZScore>()?;
    Ok(())
}
