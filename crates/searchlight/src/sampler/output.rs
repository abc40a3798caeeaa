use crate::error::DecodeError;
use crate::tensor::operations::{argmax, argsort_descending};
use crate::tensor::{Grid, TokenGrid};

/// Every beam of every batch element, best first.
///
/// Logically a `(batch, num_beams, length)` sequence tensor next to a
/// `(batch, num_beams)` score tensor, with beams along
/// [`BEAM_DIM`](crate::tensor::constant::BEAM_DIM); stored as one
/// `(num_beams, length)` grid per batch element.
#[derive(Debug, Clone, PartialEq)]
pub struct Beams {
    sequences: Vec<TokenGrid>,
    scores: Grid<f32>,
}

impl Beams {
    /// Reorder each batch element's beams by descending score. Equal scores
    /// keep their beam order.
    pub(crate) fn sorted(sequences: Vec<TokenGrid>, scores: Grid<f32>) -> Result<Self, DecodeError> {
        let [batch, num_beams] = scores.shape();
        let mut sorted_sequences = Vec::with_capacity(batch);
        let mut sorted_scores = Vec::with_capacity(batch * num_beams);
        for (beams, row) in sequences.iter().zip(scores.iter_rows()) {
            let order = argsort_descending(row);
            sorted_sequences.push(beams.select_rows(&order)?);
            sorted_scores.extend(order.iter().map(|&beam| row[beam]));
        }
        Ok(Self {
            sequences: sorted_sequences,
            scores: Grid::new(batch, num_beams, sorted_scores)?,
        })
    }

    /// `[batch, num_beams, length]`, indexed by
    /// [`BATCH_DIM`](crate::tensor::constant::BATCH_DIM) and
    /// [`BEAM_DIM`](crate::tensor::constant::BEAM_DIM)
    pub fn shape(&self) -> [usize; 3] {
        let [batch, num_beams] = self.scores.shape();
        let length = self.sequences.first().map(TokenGrid::num_cols).unwrap_or(0);
        [batch, num_beams, length]
    }

    /// The `(num_beams, length)` beams of batch element `batch`.
    pub fn sequences(&self, batch: usize) -> Option<&TokenGrid> {
        self.sequences.get(batch)
    }

    /// Cumulative log-probabilities, `(batch, num_beams)`, descending per row.
    pub fn scores(&self) -> &Grid<f32> {
        &self.scores
    }

    pub fn into_parts(self) -> (Vec<TokenGrid>, Grid<f32>) {
        (self.sequences, self.scores)
    }
}

/// The highest-scoring beam of each batch element, first beam on ties,
/// as a `(batch, length)` grid.
pub(crate) fn select_best(sequences: &[TokenGrid], scores: &Grid<f32>) -> Result<TokenGrid, DecodeError> {
    let length = sequences.first().map(TokenGrid::num_cols).unwrap_or(0);
    let mut best = Vec::with_capacity(sequences.len() * length);
    for (beams, row) in sequences.iter().zip(scores.iter_rows()) {
        let top = argmax(row).unwrap_or(0);
        best.extend_from_slice(beams.row(top));
    }
    Grid::new(sequences.len(), length, best)
}

/// The result of a decode.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerOutput {
    /// The top-scoring sequence per batch element, `(batch, length)`.
    Best(TokenGrid),

    /// All beams sorted by descending score.
    AllBeams(Beams),
}

impl SamplerOutput {
    pub fn into_best(self) -> Option<TokenGrid> {
        match self {
            SamplerOutput::Best(best) => Some(best),
            SamplerOutput::AllBeams(_) => None,
        }
    }

    pub fn into_all_beams(self) -> Option<Beams> {
        match self {
            SamplerOutput::Best(_) => None,
            SamplerOutput::AllBeams(beams) => Some(beams),
        }
    }
}
