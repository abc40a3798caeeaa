use async_trait::async_trait;
use searchlight::backend::BeamCache;
use searchlight::sampler::{StepOracle, StepOutput};
use searchlight::tensor::TokenGrid;
use std::convert::Infallible;

pub const ALPHABET: usize = 26;

pub fn spell(row: &[u32]) -> String {
    row.iter().map(|&id| char::from(b'a' + id as u8)).collect()
}

/// Every letter equally likely at every position.
pub struct Uniform;

#[async_trait]
impl<C: BeamCache + 'static> StepOracle<C> for Uniform {
    type Logits = Vec<Vec<f32>>;
    type Hidden = ();
    type Error = Infallible;

    async fn next(&self, tokens: &TokenGrid, cache: C, _index: usize) -> Result<StepOutput<Self::Logits, (), C>, Infallible> {
        Ok(StepOutput::new(vec![vec![1.0; ALPHABET]; tokens.num_rows()], (), cache))
    }
}

/// Prefers the letter after the previous one, with the one after that a
/// close second.
pub struct Successor;

#[async_trait]
impl<C: BeamCache + 'static> StepOracle<C> for Successor {
    type Logits = Vec<Vec<f32>>;
    type Hidden = ();
    type Error = Infallible;

    async fn next(&self, tokens: &TokenGrid, cache: C, index: usize) -> Result<StepOutput<Self::Logits, (), C>, Infallible> {
        let logits = tokens
            .iter_rows()
            .map(|row| {
                let previous = index.checked_sub(1).map(|i| row[i] as usize).unwrap_or(0);
                let mut logits = vec![0.0; ALPHABET];
                logits[(previous + 1) % ALPHABET] = 3.0;
                logits[(previous + 2) % ALPHABET] = 2.5;
                logits
            })
            .collect();
        Ok(StepOutput::new(logits, (), cache))
    }
}
