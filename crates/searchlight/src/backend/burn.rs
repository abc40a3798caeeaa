//! The burn implementation for backend provision.
//! Burn tensors carry their rank as a const generic; reindexing the batch
//! dimension never changes it, so one impl covers every rank.
use super::{BeamCache, Logits};
use crate::error::DecodeError;
use crate::tensor::constant::BATCH_DIM;
use crate::tensor::operations::repeat_interleave_indices;
use burn::tensor::backend::Backend as BurnBackend;
use burn::tensor::{Int, Numeric, Tensor, TensorData};

fn index_select_batch<B, const D: usize, K>(
    tensor: &Tensor<B, D, K>,
    indices: &[usize],
) -> Result<Tensor<B, D, K>, DecodeError>
where B: BurnBackend,
      K: Numeric<B> + 'static
{
    let len = tensor.dims()[BATCH_DIM];
    let mut ids = Vec::with_capacity(indices.len());
    for &index in indices {
        if index >= len {
            return Err(DecodeError::IndexOutOfRange { index, len });
        }
        ids.push(index as i64);
    }
    let ids = Tensor::<B, 1, Int>::from_data(
        TensorData::new(ids, [indices.len()]),
        &tensor.device(),
    );
    Ok(tensor.clone().select(BATCH_DIM, ids))
}

impl<B, const D: usize, K> BeamCache for Tensor<B, D, K>
where B: BurnBackend,
      K: Numeric<B> + 'static,
      Tensor<B, D, K>: Send
{
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
        let len = self.dims()[BATCH_DIM];
        index_select_batch(self, &repeat_interleave_indices(len, num_beams))
    }

    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        index_select_batch(self, indices)
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        Ok(self.dims().get(BATCH_DIM).copied())
    }
}

impl<B: BurnBackend> Logits for Tensor<B, 2> {
    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn to_rows(&self) -> Result<Vec<Vec<f32>>, DecodeError> {
        let [rows, cols] = self.dims();
        let flat = self.to_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|err| DecodeError::Backend(format!("{err:?}")))?;
        if cols == 0 {
            return Ok(vec![Vec::new(); rows]);
        }
        Ok(flat.chunks(cols).map(<[f32]>::to_vec).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_repeat_beams_interleaves_rows() {
        let device = Default::default();
        let cache = Tensor::<TestBackend, 2>::from_data([[1.0f32, 2.0], [3.0, 4.0]], &device);

        let repeated = cache.repeat_beams(2).unwrap();

        assert_eq!(repeated.dims(), [4, 2]);
        assert_eq!(
            repeated.to_data().to_vec::<f32>().unwrap(),
            vec![1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_select_beams_rank_three() {
        let device = Default::default();
        let cache = Tensor::<TestBackend, 1, Int>::arange(0..12, &device)
            .float()
            .reshape([3, 2, 2]);

        let selected = cache.select_beams(&[1, 0]).unwrap();

        assert_eq!(selected.dims(), [2, 2, 2]);
        assert_eq!(
            selected.to_data().to_vec::<f32>().unwrap(),
            vec![4.0, 5.0, 6.0, 7.0, 0.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_select_beams_out_of_range() {
        let device = Default::default();
        let cache = Tensor::<TestBackend, 2>::zeros([2, 2], &device);
        let err = cache.select_beams(&[0, 2]).unwrap_err();
        assert!(matches!(err, DecodeError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_leading_len() {
        let device = Default::default();
        let cache = Tensor::<TestBackend, 3>::zeros([3, 2, 2], &device);
        assert_eq!(cache.leading_len().unwrap(), Some(3));
        assert_eq!(cache.select_beams(&[0]).unwrap().leading_len().unwrap(), Some(1));
    }

    #[test]
    fn test_logits_to_rows() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 2>::from_data([[0.5f32, 1.5, 2.5], [3.5, 4.5, 5.5]], &device);
        assert_eq!(Logits::shape(&logits), vec![2, 3]);
        assert_eq!(
            logits.to_rows().unwrap(),
            vec![vec![0.5, 1.5, 2.5], vec![3.5, 4.5, 5.5]]
        );
    }
}
