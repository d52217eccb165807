//! In-memory tabular dataset consumed by the detectors.
//!
//! Rows are ordered feature vectors. Every column carries a single
//! [`DataType`], fixed by the first row and enforced on the rest.

use ndarray::{Array2, ArrayView2};
use rand::seq::index;
use rand::Rng;

use crate::error::{AnomalyError, Result};

/// Kind of values held by a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Continuous,
    Categorical,
}

/// A single feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Continuous(f64),
    Categorical(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Continuous(_) => DataType::Continuous,
            Value::Categorical(_) => DataType::Categorical,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Continuous(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Categorical(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Categorical(s)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    samples: Vec<Vec<Value>>,
    column_types: Vec<DataType>,
}

impl Dataset {
    /// Build a dataset from heterogeneous rows.
    ///
    /// Fails if the rows do not share the same arity or if a column mixes
    /// continuous and categorical values.
    pub fn new(samples: Vec<Vec<Value>>) -> Result<Self> {
        let column_types: Vec<DataType> = match samples.first() {
            Some(first) => first.iter().map(Value::data_type).collect(),
            None => Vec::new(),
        };

        for (i, row) in samples.iter().enumerate() {
            if row.len() != column_types.len() {
                return Err(AnomalyError::InvalidArgument(format!(
                    "row {} has {} features, expected {}",
                    i,
                    row.len(),
                    column_types.len()
                )));
            }

            for (j, value) in row.iter().enumerate() {
                if value.data_type() != column_types[j] {
                    return Err(AnomalyError::InvalidArgument(format!(
                        "row {} column {} is {:?}, expected {:?}",
                        i,
                        j,
                        value.data_type(),
                        column_types[j]
                    )));
                }
            }
        }

        Ok(Dataset {
            samples,
            column_types,
        })
    }

    /// Build a purely continuous dataset.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let samples = rows
            .into_iter()
            .map(|row| row.into_iter().map(Value::Continuous).collect())
            .collect();

        Self::new(samples)
    }

    /// Build a continuous dataset from a samples-by-features matrix.
    pub fn from_array(x: ArrayView2<f64>) -> Self {
        let samples = x
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&v| Value::Continuous(v)).collect())
            .collect();

        Dataset {
            samples,
            column_types: vec![DataType::Continuous; x.ncols()],
        }
    }

    pub fn samples(&self) -> &[Vec<Value>] {
        &self.samples
    }

    pub fn num_rows(&self) -> usize {
        self.samples.len()
    }

    pub fn num_columns(&self) -> usize {
        self.column_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn column_types(&self) -> &[DataType] {
        &self.column_types
    }

    /// Iterate over the values of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.samples.iter().filter_map(move |row| row.get(index))
    }

    /// Draw `n` distinct rows at random. The source dataset is left untouched.
    pub fn random_subset<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Dataset> {
        if n > self.num_rows() {
            return Err(AnomalyError::InvalidArgument(format!(
                "cannot draw {} rows from a dataset of {}",
                n,
                self.num_rows()
            )));
        }

        let samples = index::sample(rng, self.num_rows(), n)
            .into_iter()
            .map(|i| self.samples[i].clone())
            .collect();

        Ok(Dataset {
            samples,
            column_types: self.column_types.clone(),
        })
    }

    /// Rows as plain float vectors.
    ///
    /// Only continuous, finite data is accepted.
    pub fn continuous_rows(&self) -> Result<Vec<Vec<f64>>> {
        if let Some(column) = self
            .column_types
            .iter()
            .position(|&t| t == DataType::Categorical)
        {
            return Err(AnomalyError::InvalidArgument(format!(
                "column {} is categorical, only continuous features are supported",
                column
            )));
        }

        let mut rows = Vec::with_capacity(self.samples.len());
        for (i, row) in self.samples.iter().enumerate() {
            let mut values = Vec::with_capacity(row.len());
            for (j, value) in row.iter().enumerate() {
                match value {
                    Value::Continuous(x) if x.is_finite() => values.push(*x),
                    Value::Continuous(x) => {
                        return Err(AnomalyError::InvalidArgument(format!(
                            "row {} contains non-finite value {}",
                            i, x
                        )));
                    }
                    Value::Categorical(_) => {
                        return Err(AnomalyError::InvalidArgument(format!(
                            "row {} column {} is categorical",
                            i, j
                        )));
                    }
                }
            }
            rows.push(values);
        }

        Ok(rows)
    }

    /// Samples-by-features matrix of a continuous dataset.
    pub fn to_array(&self) -> Result<Array2<f64>> {
        let rows = self.continuous_rows()?;
        let flat: Vec<f64> = rows.into_iter().flatten().collect();

        Array2::from_shape_vec((self.num_rows(), self.num_columns()), flat)
            .map_err(|e| AnomalyError::Runtime(e.to_string()))
    }
}
