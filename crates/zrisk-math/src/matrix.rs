//! Validated row-stochastic transition matrices.
//!
//! A [`StochasticMatrix`] pairs a square `nalgebra` matrix with the [`RatingScale`] that
//! indexes its rows and columns. Construction enforces that every entry is finite and
//! non-negative and that every row sums to one within [`ROW_SUM_TOLERANCE`]. All
//! operations return new matrices; inputs are never mutated.

use std::borrow::Cow;
use std::sync::Arc;

use nalgebra::DMatrix;
use zrisk_core::{EclError, EclResult, RatingScale};

/// Maximum permitted deviation of a row sum from one.
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// A square transition matrix whose rows are probability distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticMatrix {
    scale: Arc<RatingScale>,
    values: DMatrix<f64>,
}

impl StochasticMatrix {
    /// Creates a matrix, validating shape, entries and row sums.
    pub fn new(scale: Arc<RatingScale>, values: DMatrix<f64>) -> EclResult<Self> {
        validate(&scale, &values)?;
        Ok(Self { scale, values })
    }

    /// Creates a matrix from row vectors.
    pub fn from_rows(scale: Arc<RatingScale>, rows: &[Vec<f64>]) -> EclResult<Self> {
        let values = rows_to_matrix(&scale, rows)?;
        Self::new(scale, values)
    }

    /// Creates a matrix from `(from, to) -> probability` entries keyed by state name.
    ///
    /// Entries not listed are zero.
    pub fn from_entries<'a>(
        scale: Arc<RatingScale>,
        entries: impl IntoIterator<Item = ((&'a str, &'a str), f64)>,
    ) -> EclResult<Self> {
        let n = scale.len();
        let mut values = DMatrix::zeros(n, n);
        for ((from, to), p) in entries {
            let i = scale.resolve(from)?;
            let j = scale.resolve(to)?;
            values[(i, j)] = p;
        }
        Self::new(scale, values)
    }

    /// Creates a matrix after clipping negative entries to zero and rescaling each row to
    /// sum to one.
    ///
    /// Rows with no positive mass are rejected.
    pub fn normalised(scale: Arc<RatingScale>, rows: &[Vec<f64>]) -> EclResult<Self> {
        let mut values = rows_to_matrix(&scale, rows)?;
        for i in 0..values.nrows() {
            let mut row = values.row_mut(i);
            for x in row.iter_mut() {
                if !x.is_finite() {
                    return Err(EclError::invalid_matrix(format!(
                        "row {i} contains a non-finite entry"
                    )));
                }
                if *x < 0.0 {
                    *x = 0.0;
                }
            }
            let sum = row.sum();
            if sum <= 0.0 {
                return Err(EclError::invalid_matrix(format!(
                    "row {i} has no positive probability mass"
                )));
            }
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                log::debug!("renormalising row {i} (sum {sum})");
            }
            row /= sum;
        }
        Self::new(scale, values)
    }

    /// The identity matrix on `scale`.
    #[must_use]
    pub fn identity(scale: Arc<RatingScale>) -> Self {
        let n = scale.len();
        Self {
            scale,
            values: DMatrix::identity(n, n),
        }
    }

    /// The rating scale indexing rows and columns.
    #[must_use]
    pub fn scale(&self) -> &RatingScale {
        &self.scale
    }

    /// Shared handle to the rating scale.
    #[must_use]
    pub fn scale_handle(&self) -> &Arc<RatingScale> {
        &self.scale
    }

    /// Number of states.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    /// The underlying matrix.
    #[must_use]
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Probability of moving from state `from` to state `to`.
    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[(from, to)]
    }

    /// Transition probabilities out of state `from`.
    #[must_use]
    pub fn row(&self, from: usize) -> Vec<f64> {
        self.values.row(from).iter().copied().collect()
    }

    /// Transition probabilities out of the named state.
    pub fn row_by_name(&self, from: &str) -> EclResult<Vec<f64>> {
        Ok(self.row(self.scale.resolve(from)?))
    }

    /// All rows as vectors.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.dim()).map(|i| self.row(i)).collect()
    }

    /// Probability mass at or beyond each column, `C[j] = sum_{k >= j} p[k]`.
    ///
    /// Columns are ordered best to worst, so `C[j]` is the default-ward mass from `j`.
    #[must_use]
    pub fn cumulative_default_ward(&self, from: usize) -> Vec<f64> {
        let row = self.values.row(from);
        let mut acc = 0.0;
        let mut out = vec![0.0; row.len()];
        for j in (0..row.len()).rev() {
            acc += row[j];
            out[j] = acc;
        }
        out
    }

    /// Matrix product `self * other`, the two-step transition matrix.
    pub fn multiply(&self, other: &Self) -> EclResult<Self> {
        if self.scale != other.scale {
            return Err(EclError::invalid_matrix(
                "cannot multiply matrices defined on different rating scales",
            ));
        }
        Self::new(Arc::clone(&self.scale), &self.values * &other.values)
    }

    /// The `n`-step transition matrix, computed by repeated squaring.
    pub fn power(&self, n: u32) -> EclResult<Self> {
        let dim = self.dim();
        let mut result = DMatrix::identity(dim, dim);
        let mut base = self.values.clone();
        let mut exp = n;
        while exp > 0 {
            if exp & 1 == 1 {
                result = &result * &base;
            }
            exp >>= 1;
            if exp > 0 {
                base = &base * &base;
            }
        }
        Self::new(Arc::clone(&self.scale), result)
    }

    /// The matrix with its write-off row made absorbing.
    ///
    /// Any probability of leaving the write-off state is removed. Matrices without a
    /// write-off state, or whose write-off row is already absorbing, are borrowed as is.
    #[must_use]
    pub fn with_absorbing_write_off(&self) -> Cow<'_, Self> {
        let Some(w) = self.scale.write_off_index() else {
            return Cow::Borrowed(self);
        };
        if self.values[(w, w)] == 1.0 {
            return Cow::Borrowed(self);
        }
        let mut values = self.values.clone();
        values.fill_row(w, 0.0);
        values[(w, w)] = 1.0;
        Cow::Owned(Self {
            scale: Arc::clone(&self.scale),
            values,
        })
    }
}

fn rows_to_matrix(scale: &RatingScale, rows: &[Vec<f64>]) -> EclResult<DMatrix<f64>> {
    let n = scale.len();
    if rows.len() != n {
        return Err(EclError::invalid_matrix(format!(
            "expected {n} rows for the rating scale, got {}",
            rows.len()
        )));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(EclError::invalid_matrix(format!(
            "row {i} has {} entries, expected {n}",
            row.len()
        )));
    }
    Ok(DMatrix::from_fn(n, n, |i, j| rows[i][j]))
}

fn validate(scale: &RatingScale, values: &DMatrix<f64>) -> EclResult<()> {
    let n = scale.len();
    if values.nrows() != n || values.ncols() != n {
        return Err(EclError::invalid_matrix(format!(
            "matrix is {}x{}, rating scale has {n} states",
            values.nrows(),
            values.ncols()
        )));
    }
    for i in 0..n {
        let row = values.row(i);
        for (j, &p) in row.iter().enumerate() {
            if !p.is_finite() || p < 0.0 {
                return Err(EclError::invalid_matrix(format!(
                    "entry ({i}, {j}) = {p} is not a probability"
                )));
            }
        }
        let sum = row.sum();
        if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
            return Err(EclError::invalid_matrix(format!(
                "row {i} ('{}') sums to {sum}",
                scale.state(i).map_or("?", |s| s.name.as_str())
            )));
        }
    }
    Ok(())
}
