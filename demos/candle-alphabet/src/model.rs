use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use searchlight::sampler::{StepOracle, StepOutput};
use searchlight::tensor::TokenGrid;

pub const ALPHABET: usize = 26;

/// Every letter equally likely; the cache is carried through untouched.
pub struct Uniform {
    pub device: Device,
}

#[async_trait]
impl StepOracle<Tensor> for Uniform {
    type Logits = Tensor;
    type Hidden = ();
    type Error = candle_core::Error;

    async fn next(&self, tokens: &TokenGrid, cache: Tensor, _index: usize) -> candle_core::Result<StepOutput<Tensor, (), Tensor>> {
        let logits = Tensor::ones((tokens.num_rows(), ALPHABET), DType::F32, &self.device)?;
        Ok(StepOutput::new(logits, (), cache))
    }
}

/// Scores each letter by its distance from the successor of the previous
/// letter, damped by how many steps the beam has taken.
///
/// The cache is a `(rows, 1)` step counter, so it has to follow its beam
/// through every reshuffle.
pub struct Model {
    device: Device,
    letters: Tensor,
}

impl Model {
    pub fn new(device: Device) -> candle_core::Result<Self> {
        let letters = Tensor::arange(0u32, ALPHABET as u32, &device)?
            .to_dtype(DType::F32)?
            .unsqueeze(0)?;
        Ok(Self { device, letters })
    }

    pub fn empty_cache(&self, batch_size: usize) -> candle_core::Result<Tensor> {
        Tensor::zeros((batch_size, 1), DType::F32, &self.device)
    }
}

#[async_trait]
impl StepOracle<Tensor> for Model {
    type Logits = Tensor;
    type Hidden = ();
    type Error = candle_core::Error;

    async fn next(&self, tokens: &TokenGrid, cache: Tensor, index: usize) -> candle_core::Result<StepOutput<Tensor, (), Tensor>> {
        let tokens = tokens
            .to_tensor(&self.device)
            .map_err(|err| candle_core::Error::Msg(err.to_string()))?;
        let previous = tokens
            .narrow(1, index.saturating_sub(1), 1)?
            .to_dtype(DType::F32)?;
        let steps = cache.affine(1.0, 1.0)?;
        let logits = self
            .letters
            .broadcast_sub(&previous.affine(1.0, 1.0)?)?
            .abs()?
            .neg()?
            .broadcast_div(&steps)?;
        Ok(StepOutput::new(logits, (), steps))
    }
}
