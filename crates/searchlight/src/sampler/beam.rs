use async_trait::async_trait;
use tracing::Instrument;
use crate::backend::{BeamCache, Logits};
use crate::error::DecodeError;
use crate::tensor::operations::{log_softmax, top_k};
use super::config::BeamSamplerConfig;
use super::core_trait::{Sampler, StepOracle};
use super::output::{select_best, Beams, SamplerOutput};
use super::request::DecodeRequest;
use super::state::BeamState;

/// Beam search.
///
/// At every position, each of the `num_beams` live hypotheses of a batch
/// element is extended by every vocabulary token, and the `num_beams`
/// extensions with the highest cumulative log-probability survive. A
/// surviving extension may come from any parent beam, so a strong beam can
/// replace its weaker siblings.
///
/// ```rust
/// use searchlight::sampler::{BeamSampler, DecodeRequest, FnOracle, Sampler, StepOutput};
/// use searchlight::tensor::{MaskGrid, TokenGrid};
/// use std::convert::Infallible;
///
/// // A uniform distribution over a 26 letter alphabet.
/// let oracle = FnOracle::new(|tokens: &TokenGrid, cache: (), _index: usize| {
///     let logits = vec![vec![1.0f32; 26]; tokens.num_rows()];
///     Ok::<_, Infallible>(StepOutput::new(logits, (), cache))
/// });
///
/// let z = 25;
/// let prompt = TokenGrid::filled(1, 12, z);
/// let mask = MaskGrid::from_rows(vec![(0..12).map(|i| i < 5).collect()]).unwrap();
/// let request = DecodeRequest::new(prompt).starting_at(5).with_mask(mask);
///
/// let output = BeamSampler::default()
///     .decode_blocking(&oracle, request)
///     .unwrap()
///     .into_best()
///     .unwrap();
/// assert_eq!(&output.row(0)[..5], &[z; 5]);
/// ```
#[derive(Debug, Clone)]
pub struct BeamSampler {
    config: BeamSamplerConfig,
}

impl BeamSampler {
    /// Fails if `config` is invalid, see [`BeamSamplerConfig::validate`].
    pub fn new(config: BeamSamplerConfig) -> Result<Self, DecodeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// A sampler keeping `num_beams` beams, with every other setting at its default.
    pub fn with_num_beams(num_beams: usize) -> Result<Self, DecodeError> {
        Self::new(BeamSamplerConfig { num_beams, ..Default::default() })
    }

    pub fn config(&self) -> &BeamSamplerConfig {
        &self.config
    }

    /// Runs the oracle for position `state.index` and keeps the best
    /// `num_beams` extensions per batch element.
    async fn step<O, C>(&self, oracle: &O, state: BeamState<C>) -> Result<BeamState<C>, DecodeError>
    where
        O: StepOracle<C>,
        C: BeamCache + 'static,
    {
        let flat_len = state.flat_len();
        let BeamState { mut sequences, mask, cache, log_probs, index, batch_size, num_beams } = state;

        let output = oracle
            .next(&sequences, cache, index)
            .await
            .map_err(|err| DecodeError::Oracle(Box::new(err)))?;

        let shape = output.logits.shape();
        if shape.len() != 2 || shape[0] != flat_len || (flat_len > 0 && shape[1] == 0) {
            let vocab_size = shape.get(1).copied().unwrap_or(0).max(1);
            return Err(DecodeError::shape("logits", &[flat_len, vocab_size], &shape));
        }
        let vocab_size = shape[1];
        let rows = output.logits.to_rows()?;
        if rows.len() != flat_len {
            return Err(DecodeError::shape("logits", &[flat_len, vocab_size], &[rows.len(), vocab_size]));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != vocab_size) {
            return Err(DecodeError::shape("logits row", &[vocab_size], &[row.len()]));
        }
        tracing::trace!(index, vocab_size, "beam search step");

        let mut parents = Vec::with_capacity(flat_len);
        let mut next_tokens = Vec::with_capacity(flat_len);
        let mut next_log_probs = Vec::with_capacity(flat_len);

        for batch in 0..batch_size {
            // Running score of every (beam, token) extension, beam-major
            let mut candidates = Vec::with_capacity(num_beams * vocab_size);
            for row in batch * num_beams..(batch + 1) * num_beams {
                let running = log_probs[row];
                candidates.extend(
                    log_softmax(&rows[row], self.config.temperature)
                        .into_iter()
                        .map(|log_prob| running + log_prob),
                );
            }

            let winners = top_k(&candidates, num_beams);
            if winners.iter().all(|(_, score)| !score.is_finite()) {
                tracing::warn!(batch, index, "no finite candidate scores, beams are degenerate");
            }
            for (candidate, score) in winners {
                parents.push(batch * num_beams + candidate / vocab_size);
                let token = u32::try_from(candidate % vocab_size)
                    .map_err(|_| DecodeError::shape("vocabulary", &[u32::MAX as usize], &[vocab_size]))?;
                next_tokens.push(token);
                next_log_probs.push(score);
            }
        }

        if let Some(cache_rows) = output.cache.leading_len()? {
            if cache_rows != flat_len {
                return Err(DecodeError::shape("cache", &[flat_len], &[cache_rows]));
            }
        }

        // Reshuffle: each surviving beam takes its parent's history and cache
        sequences = sequences.select_rows(&parents)?;
        let cache = output.cache.select_beams(&parents)?;

        for (row, token) in next_tokens.into_iter().enumerate() {
            if !mask.get(row, index).copied().unwrap_or(false) {
                sequences.set(row, index, token);
            }
        }

        Ok(BeamState {
            sequences,
            mask,
            cache,
            log_probs: next_log_probs,
            index: index + 1,
            batch_size,
            num_beams,
        })
    }

    async fn run<O, C>(&self, oracle: &O, request: DecodeRequest<C>) -> Result<SamplerOutput, DecodeError>
    where
        O: StepOracle<C>,
        C: BeamCache + 'static,
    {
        let (prompt, cache, index, mask, end_token_id) = request.into_parts();
        let mut state = BeamState::new(prompt, mask, cache, index, self.config.num_beams)?;

        // Hard ceiling, independent of the end token
        let max_steps = state.length() - index;
        for _ in 0..max_steps {
            if state.is_finished(end_token_id, self.config.stop_policy) {
                tracing::debug!(index = state.index, "every batch element produced an end token");
                break;
            }
            state = self.step(oracle, state).await?;
        }

        let (sequences, scores) = state.unflatten()?;
        if self.config.return_all_beams {
            Ok(SamplerOutput::AllBeams(Beams::sorted(sequences, scores)?))
        } else {
            Ok(SamplerOutput::Best(select_best(&sequences, &scores)?))
        }
    }
}

impl Default for BeamSampler {
    fn default() -> Self {
        Self { config: BeamSamplerConfig::default() }
    }
}

#[async_trait]
impl Sampler for BeamSampler {
    async fn decode<O, C>(
        &self,
        oracle: &O,
        request: DecodeRequest<C>,
    ) -> Result<SamplerOutput, DecodeError>
    where
        O: StepOracle<C>,
        C: BeamCache + 'static,
    {
        let [batch_size, length] = request.prompt().shape();
        let span = tracing::debug_span!(
            "beam_search",
            batch_size,
            length,
            num_beams = self.config.num_beams,
            start = request.index(),
        );
        self.run(oracle, request).instrument(span).await
    }
}
