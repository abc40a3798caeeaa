use crate::backend::BeamCache;
use crate::error::DecodeError;
use crate::tensor::constant::INITIAL_BEAM_SENTINEL;
use crate::tensor::{Grid, MaskGrid, TokenGrid};
use super::config::StopPolicy;

/// Everything a beam search carries from one step to the next.
///
/// Batch and beam share the leading axis: row `b * num_beams + k` is beam `k`
/// of batch element `b`. The state is created per decode, moved through each
/// step by value, and unflattened once at the end.
#[derive(Debug)]
pub(crate) struct BeamState<C> {
    pub(crate) sequences: TokenGrid,
    pub(crate) mask: MaskGrid,
    pub(crate) cache: C,
    pub(crate) log_probs: Vec<f32>,
    pub(crate) index: usize,
    pub(crate) batch_size: usize,
    pub(crate) num_beams: usize,
}

impl<C: BeamCache> BeamState<C> {
    /// Replicate prompt, mask and cache into `num_beams` copies each and fold
    /// the beam axis into the batch axis.
    pub(crate) fn new(
        prompt: TokenGrid,
        mask: Option<MaskGrid>,
        cache: C,
        index: usize,
        num_beams: usize,
    ) -> Result<Self, DecodeError> {
        if num_beams == 0 {
            return Err(DecodeError::InvalidNumBeams(num_beams));
        }
        let [batch_size, length] = prompt.shape();
        if index >= length {
            return Err(DecodeError::StartIndexOutOfRange { index, length });
        }
        let mask = match mask {
            Some(mask) if mask.shape() != prompt.shape() => {
                return Err(DecodeError::shape("mask", &prompt.shape(), &mask.shape()));
            }
            Some(mask) => mask,
            None => Grid::filled(batch_size, length, false),
        };
        if let Some(rows) = cache.leading_len()? {
            if rows != batch_size {
                return Err(DecodeError::shape("cache", &[batch_size], &[rows]));
            }
        }

        // Only the first beam of each batch element may expand on the first step
        let log_probs = (0..batch_size * num_beams)
            .map(|row| if row % num_beams == 0 { 0.0 } else { INITIAL_BEAM_SENTINEL })
            .collect();

        Ok(Self {
            sequences: prompt.repeat_rows(num_beams),
            mask: mask.repeat_rows(num_beams),
            cache: cache.repeat_beams(num_beams)?,
            log_probs,
            index,
            batch_size,
            num_beams,
        })
    }
}

impl<C> BeamState<C> {
    pub(crate) fn flat_len(&self) -> usize {
        self.batch_size * self.num_beams
    }

    pub(crate) fn length(&self) -> usize {
        self.sequences.num_cols()
    }

    /// Whether flattened row `row` holds `token` at a position the mask does not fix.
    fn generated(&self, row: usize, token: u32) -> bool {
        self.sequences
            .row(row)
            .iter()
            .zip(self.mask.row(row))
            .any(|(&id, &fixed)| id == token && !fixed)
    }

    /// The early-termination test, evaluated before every step.
    ///
    /// Without an end token a decode always runs to the end of the buffer.
    pub(crate) fn is_finished(&self, end_token_id: Option<u32>, policy: StopPolicy) -> bool {
        let Some(end_token_id) = end_token_id else {
            return false;
        };
        (0..self.batch_size).all(|batch| {
            let mut rows = batch * self.num_beams..(batch + 1) * self.num_beams;
            match policy {
                StopPolicy::AnyBeam => rows.any(|row| self.generated(row, end_token_id)),
                StopPolicy::AllBeams => rows.all(|row| self.generated(row, end_token_id)),
            }
        })
    }

    /// Separate the beam axis back out to
    /// [`BEAM_DIM`](crate::tensor::constant::BEAM_DIM): one `(num_beams, length)`
    /// grid per batch element and a `(batch, num_beams)` score grid.
    pub(crate) fn unflatten(self) -> Result<(Vec<TokenGrid>, Grid<f32>), DecodeError> {
        let num_beams = self.num_beams;
        let sequences = (0..self.batch_size)
            .map(|batch| {
                let rows: Vec<usize> = (batch * num_beams..(batch + 1) * num_beams).collect();
                self.sequences.select_rows(&rows)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let scores = Grid::new(self.batch_size, num_beams, self.log_probs)?;
        Ok((sequences, scores))
    }
}
