use numpy::{PyArray1, PyReadonlyArray2, ToPyArray};
use pyo3::prelude::*;

use crate::models::base_model::{Detector, Scoring};
use crate::models::isolation_forest::{IsolationForest, IsolationForestParams};
use crate::models::robust_zscore::RobustZScore;
use crate::utils::dataset::Dataset;

/// Python‐exposed wrapper around IsolationForest
#[pyclass(name = "IsolationForest")]
pub struct PyIsolationForest {
    inner: IsolationForest,
}

#[pymethods]
impl PyIsolationForest {
    #[new]
    #[pyo3(signature = (trees=300, ratio=0.2, threshold=0.5, random_state=None, n_jobs=None))]
    fn new(
        trees: usize,
        ratio: f64,
        threshold: f64,
        random_state: Option<u64>,
        n_jobs: Option<usize>,
    ) -> PyResult<Self> {
        let inner = IsolationForest::from_params(IsolationForestParams {
            trees,
            ratio,
            threshold,
            random_state,
            n_jobs,
        })?;
        Ok(PyIsolationForest { inner })
    }

    fn train(&mut self, py: Python<'_>, x: PyReadonlyArray2<f64>) -> PyResult<()> {
        let dataset = Dataset::from_array(x.as_array());
        let inner = &mut self.inner;
        py.allow_threads(|| inner.train(&dataset))?;
        Ok(())
    }

    fn predict<'py>(&self, py: Python<'py>, x: PyReadonlyArray2<f64>) -> PyResult<&'py PyArray1<u8>> {
        let dataset = Dataset::from_array(x.as_array());
        let labels = self.inner.predict(&dataset)?;
        Ok(labels.to_pyarray(py))
    }

    fn score<'py>(&self, py: Python<'py>, x: PyReadonlyArray2<f64>) -> PyResult<&'py PyArray1<f64>> {
        let dataset = Dataset::from_array(x.as_array());
        let scores = self.inner.score(&dataset)?;
        Ok(scores.to_pyarray(py))
    }

    #[getter]
    fn trained(&self) -> bool {
        self.inner.trained()
    }

    #[getter]
    fn n_trees(&self) -> usize {
        self.inner.trees().len()
    }
}

/// Python‐exposed wrapper around RobustZScore
#[pyclass(name = "RobustZScore")]
pub struct PyRobustZScore {
    inner: RobustZScore,
}

#[pymethods]
impl PyRobustZScore {
    #[new]
    #[pyo3(signature = (tolerance=3.0, threshold=3.5))]
    fn new(tolerance: f64, threshold: f64) -> PyResult<Self> {
        Ok(PyRobustZScore {
            inner: RobustZScore::new(tolerance, threshold)?,
        })
    }

    fn train(&mut self, x: PyReadonlyArray2<f64>) -> PyResult<()> {
        let dataset = Dataset::from_array(x.as_array());
        self.inner.train(&dataset)?;
        Ok(())
    }

    fn predict<'py>(&self, py: Python<'py>, x: PyReadonlyArray2<f64>) -> PyResult<&'py PyArray1<u8>> {
        let dataset = Dataset::from_array(x.as_array());
        let labels = self.inner.predict(&dataset)?;
        Ok(labels.to_pyarray(py))
    }

    #[getter]
    fn trained(&self) -> bool {
        self.inner.trained()
    }
}
