use super::{BeamCache, Logits};
use crate::error::DecodeError;
use crate::tensor::constant::BATCH_DIM;
use crate::tensor::operations::repeat_interleave_indices;
use crate::tensor::TokenGrid;
use candle_core::{DType, Device, Tensor};

fn backend_error(err: candle_core::Error) -> DecodeError {
    DecodeError::Backend(err.to_string())
}

/// Select `indices` along the batch dimension, as a `u32` index tensor on the
/// same device.
fn index_select_batch(tensor: &Tensor, indices: &[usize]) -> Result<Tensor, DecodeError> {
    let len = tensor.dim(BATCH_DIM).map_err(backend_error)?;
    let mut ids = Vec::with_capacity(indices.len());
    for &index in indices {
        if index >= len {
            return Err(DecodeError::IndexOutOfRange { index, len });
        }
        ids.push(index as u32);
    }
    let ids = Tensor::from_vec(ids, indices.len(), tensor.device()).map_err(backend_error)?;
    tensor.index_select(&ids, BATCH_DIM).map_err(backend_error)
}

impl BeamCache for Tensor {
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
        let len = self.dim(BATCH_DIM).map_err(backend_error)?;
        index_select_batch(self, &repeat_interleave_indices(len, num_beams))
    }

    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        index_select_batch(self, indices)
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        self.dim(BATCH_DIM).map(Some).map_err(backend_error)
    }
}

impl Logits for Tensor {
    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn to_rows(&self) -> Result<Vec<Vec<f32>>, DecodeError> {
        self.to_dtype(DType::F32)
            .and_then(|logits| logits.to_vec2::<f32>())
            .map_err(backend_error)
    }
}

impl TokenGrid {
    /// Copy the token ids onto `device` as a `(rows, length)` `u32` tensor,
    /// for oracles that run a candle model.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor, DecodeError> {
        Tensor::from_slice(self.as_slice(), (self.num_rows(), self.num_cols()), device)
            .map_err(backend_error)
    }
}
