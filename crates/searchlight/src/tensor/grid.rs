use crate::error::DecodeError;

/// Token ids, shape `(rows, length)`.
pub type TokenGrid = Grid<u32>;

/// Fixed-position mask, `true` where the caller supplied the token.
pub type MaskGrid = Grid<bool>;

/// An owned, row-major, two dimensional buffer.
///
/// Rows live along [`BATCH_DIM`](super::constant::BATCH_DIM) and columns along
/// [`SEQ_DIM`](super::constant::SEQ_DIM). The beam sampler keeps prompts,
/// masks and scores in this form so that flattening `(batch, beam)` into one
/// leading axis is a plain row repeat, and the beam reshuffle is a row gather.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Wraps `data` as a `(rows, cols)` grid.
    ///
    /// Fails with [`DecodeError::ShapeMismatch`] if `data` does not hold exactly
    /// `rows * cols` elements.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, DecodeError> {
        if data.len() != rows * cols {
            return Err(DecodeError::shape("grid data", &[rows * cols], &[data.len()]));
        }
        Ok(Self { rows, cols, data })
    }

    /// A `(rows, cols)` grid with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Builds a grid from nested rows, which must all have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, DecodeError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let num_rows = rows.len();
        let mut data = Vec::with_capacity(num_rows * cols);
        for row in rows {
            if row.len() != cols {
                return Err(DecodeError::shape("grid row", &[cols], &[row.len()]));
            }
            data.extend(row);
        }
        Ok(Self { rows: num_rows, cols, data })
    }

    /// Repeat every row `times` times, consecutively.
    ///
    /// Row `i` of the input becomes rows `i * times .. (i + 1) * times` of the
    /// output, which is how a `(batch, ...)` buffer becomes a flattened
    /// `(batch * beams, ...)` one.
    pub fn repeat_rows(&self, times: usize) -> Self {
        let mut data = Vec::with_capacity(self.data.len() * times);
        for row in self.iter_rows() {
            for _ in 0..times {
                data.extend_from_slice(row);
            }
        }
        Self {
            rows: self.rows * times,
            cols: self.cols,
            data,
        }
    }

    /// Gather rows: output row `j` is input row `indices[j]`.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &index in indices {
            if index >= self.rows {
                return Err(DecodeError::IndexOutOfRange { index, len: self.rows });
            }
            data.extend_from_slice(self.row(index));
        }
        Ok(Self {
            rows: indices.len(),
            cols: self.cols,
            data,
        })
    }

    /// Copy the grid out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }
}

impl<T> Grid<T> {
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// Borrow row `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Element at `(row, col)`, if in bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col)
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics, and a zero-width grid still has rows
        (0..self.rows).map(move |row| self.row(row))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}
