use std::fmt;
use crate::backend::{BeamCache, Logits};
use crate::error::DecodeError;

// A simple mock tensor implementation for testing.
// Each leading-axis row carries a tag, so tests can see where rows ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct MockTensor {
    pub(crate) shape: Vec<usize>,
    pub(crate) tags: Vec<i32>,
    pub(crate) value: f32,
}

impl MockTensor {
    /// A tensor whose rows are tagged `0..shape[0]`
    pub fn new(shape: Vec<usize>, value: f32) -> Self {
        let rows = shape.first().copied().unwrap_or(0);
        let tags = (0..rows as i32).collect();
        Self { shape, tags, value }
    }

    pub fn tags(&self) -> &[i32] {
        &self.tags
    }
}

impl fmt::Display for MockTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockTensor({:?}, {:?}, {})", self.shape, self.tags, self.value)
    }
}

impl BeamCache for MockTensor {
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
        let mut shape = self.shape.clone();
        if let Some(rows) = shape.first_mut() {
            *rows *= num_beams;
        }
        let tags = self.tags.iter()
            .flat_map(|tag| std::iter::repeat_n(*tag, num_beams))
            .collect();
        Ok(Self { shape, tags, value: self.value })
    }

    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        let mut shape = self.shape.clone();
        if let Some(rows) = shape.first_mut() {
            *rows = indices.len();
        }
        let tags = indices.iter()
            .map(|&index| {
                self.tags.get(index)
                    .copied()
                    .ok_or(DecodeError::IndexOutOfRange { index, len: self.tags.len() })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { shape, tags, value: self.value })
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        Ok(Some(self.tags.len()))
    }
}

impl Logits for MockTensor {
    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }

    // Every row is filled with the same value, a uniform distribution
    fn to_rows(&self) -> Result<Vec<Vec<f32>>, DecodeError> {
        let rows = self.shape.first().copied().unwrap_or(0);
        let cols = self.shape.get(1).copied().unwrap_or(0);
        Ok(vec![vec![self.value; cols]; rows])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_then_select_tracks_tags() {
        let tensor = MockTensor::new(vec![2, 4], 0.0);
        let repeated = tensor.repeat_beams(3).unwrap();
        assert_eq!(repeated.tags(), &[0, 0, 0, 1, 1, 1]);
        assert_eq!(repeated.shape, vec![6, 4]);

        let selected = repeated.select_beams(&[3, 0, 0]).unwrap();
        assert_eq!(selected.tags(), &[1, 0, 0]);
        assert_eq!(selected.shape, vec![3, 4]);
    }

    #[test]
    fn test_empty_shape_has_no_rows() {
        let tensor = MockTensor::new(Vec::new(), 0.0);
        assert!(tensor.tags().is_empty());
        assert_eq!(tensor.leading_len().unwrap(), Some(0));
        assert!(tensor.to_rows().unwrap().is_empty());
        assert_eq!(tensor.repeat_beams(3).unwrap().shape, Vec::<usize>::new());
    }

    #[test]
    fn test_uniform_rows() {
        let logits = MockTensor::new(vec![2, 3], 1.5).to_rows().unwrap();
        assert_eq!(logits, vec![vec![1.5; 3]; 2]);
    }
}
