//! Dense matrices over GF(2^8)
//!
//! Row-major storage with dimensions fixed at construction. Cell contents are
//! only mutated while a matrix is being built or inverted; the codec treats
//! every matrix it holds as immutable.

use super::error::{Result, RsError};
use super::galois::Galois8;
use log::trace;
use std::fmt;

/// Matrix of field elements
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Galois8>,
}

// ============================================================================
// Construction and Access
// ============================================================================

impl Matrix {
    /// Create a zero matrix
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Galois8::ZERO; rows * cols],
        }
    }

    /// Create an identity matrix
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zero(size, size);
        for i in 0..size {
            matrix.data[i * size + i] = Galois8::ONE;
        }
        matrix
    }

    /// Build a matrix from raw byte rows, which must all have the same length
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(RsError::InvalidArgument(format!(
                    "Row {} has {} columns, expected {}",
                    r,
                    row.len(),
                    cols
                )));
            }
            data.extend(row.iter().copied().map(Galois8::new));
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(RsError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Get element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<Galois8> {
        self.check_index(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Set element at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: Galois8) -> Result<()> {
        self.check_index(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Borrow a row
    pub fn row(&self, row: usize) -> Result<&[Galois8]> {
        self.check_index(row, 0)?;
        let start = row * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// Copy a row out as raw bytes
    pub fn row_bytes(&self, row: usize) -> Result<Vec<u8>> {
        Ok(self.row(row)?.iter().map(|g| g.value()).collect())
    }

    /// Exchange two rows
    pub fn swap_rows(&mut self, r1: usize, r2: usize) -> Result<()> {
        self.check_index(r1, 0)?;
        self.check_index(r2, 0)?;
        if r1 != r2 {
            self.swap_rows_unchecked(r1, r2);
        }
        Ok(())
    }

    fn swap_rows_unchecked(&mut self, r1: usize, r2: usize) {
        let (low, high) = (r1.min(r2), r1.max(r2));
        let (head, tail) = self.data.split_at_mut(high * self.cols);
        head[low * self.cols..(low + 1) * self.cols].swap_with_slice(&mut tail[..self.cols]);
    }
}

// ============================================================================
// Algebra
// ============================================================================

impl Matrix {
    /// Standard matrix product `self × right`
    pub fn multiply(&self, right: &Matrix) -> Result<Matrix> {
        if self.cols != right.rows {
            return Err(self.mismatch(right));
        }

        let mut result = Matrix::zero(self.rows, right.cols);
        for r in 0..self.rows {
            for c in 0..right.cols {
                let mut value = Galois8::ZERO;
                for i in 0..self.cols {
                    value += self.data[r * self.cols + i] * right.data[i * right.cols + c];
                }
                result.data[r * right.cols + c] = value;
            }
        }
        Ok(result)
    }

    /// Horizontal concatenation `[self | right]`
    pub fn augment(&self, right: &Matrix) -> Result<Matrix> {
        if self.rows != right.rows {
            return Err(self.mismatch(right));
        }

        let cols = self.cols + right.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            data.extend_from_slice(&self.data[r * self.cols..(r + 1) * self.cols]);
            data.extend_from_slice(&right.data[r * right.cols..(r + 1) * right.cols]);
        }
        Ok(Matrix {
            rows: self.rows,
            cols,
            data,
        })
    }

    /// Extract rows `rmin..rmax` and columns `cmin..cmax`
    pub fn submatrix(&self, rmin: usize, cmin: usize, rmax: usize, cmax: usize) -> Result<Matrix> {
        if rmin > rmax || cmin > cmax || rmax > self.rows || cmax > self.cols {
            return Err(RsError::IndexOutOfRange {
                row: rmax,
                col: cmax,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let cols = cmax - cmin;
        let mut data = Vec::with_capacity((rmax - rmin) * cols);
        for r in rmin..rmax {
            data.extend_from_slice(&self.data[r * self.cols + cmin..r * self.cols + cmax]);
        }
        Ok(Matrix {
            rows: rmax - rmin,
            cols,
            data,
        })
    }

    /// Returns the inverse of this matrix.
    ///
    /// Works on `[self | I]` with Gauss-Jordan elimination. Field arithmetic is
    /// exact, so a zero column below the diagonal means the matrix really is
    /// singular.
    pub fn invert(&self) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(RsError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let mut work = self.augment(&Matrix::identity(self.rows))?;
        work.gaussian_elimination()?;
        work.submatrix(0, self.rows, self.rows, self.rows * 2)
    }

    /// Reduce the left square of an `n × 2n` matrix to the identity
    fn gaussian_elimination(&mut self) -> Result<()> {
        let n = self.rows;
        let width = self.cols;

        // Clear everything below the diagonal, scaling each pivot to 1
        for r in 0..n {
            if self.data[r * width + r].is_zero() {
                if let Some(below) = (r + 1..n).find(|&b| !self.data[b * width + r].is_zero()) {
                    trace!("Pivot {} is zero, swapping with row {}", r, below);
                    self.swap_rows_unchecked(r, below);
                }
            }

            let pivot = self.data[r * width + r];
            if pivot.is_zero() {
                return Err(RsError::Singular);
            }

            if pivot != Galois8::ONE {
                let scale = pivot.inverse()?;
                for value in &mut self.data[r * width..(r + 1) * width] {
                    *value *= scale;
                }
            }

            for below in r + 1..n {
                let factor = self.data[below * width + r];
                if !factor.is_zero() {
                    self.eliminate(below, r, factor);
                }
            }
        }

        // Now clear the part above the diagonal
        for d in (0..n).rev() {
            for above in 0..d {
                let factor = self.data[above * width + d];
                if !factor.is_zero() {
                    self.eliminate(above, d, factor);
                }
            }
        }

        Ok(())
    }

    /// `row[target] -= factor × row[source]`
    fn eliminate(&mut self, target: usize, source: usize, factor: Galois8) {
        let width = self.cols;
        for c in 0..width {
            let v = self.data[source * width + c];
            self.data[target * width + c] -= factor * v;
        }
    }

    fn mismatch(&self, right: &Matrix) -> RsError {
        RsError::DimensionMismatch {
            left_rows: self.rows,
            left_cols: self.cols,
            right_rows: right.rows,
            right_cols: right.cols,
        }
    }

    /// Render as whitespace-separated two digit hex, one row per line
    pub fn to_hex_string(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols * 3 + 1));
        for r in 0..self.rows {
            let bytes: Vec<u8> = self.data[r * self.cols..(r + 1) * self.cols]
                .iter()
                .map(|g| g.value())
                .collect();
            let encoded = hex::encode(&bytes);
            for (i, start) in (0..encoded.len()).step_by(2).enumerate() {
                if i != 0 {
                    out.push(' ');
                }
                out.push_str(&encoded[start..start + 2]);
            }
            out.push('\n');
        }
        out
    }
}

/// Formats as `[[1, 2], [3, 4]]`
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for r in 0..self.rows {
            if r != 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for c in 0..self.cols {
                if c != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.data[r * self.cols + c])?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
