//! Property-based tests for the beam sampler.
//!
//! The oracle is a random but fixed bigram table: the logits at position `i`
//! depend only on `i` and the token at `i - 1`, so every property can be
//! checked against a direct walk of the same table.
//!
//!   1. Every batch element returns exactly `num_beams` beams of full length.
//!   2. Beam scores are finite and sorted best first.
//!   3. Masked positions keep their prompt token in every beam.
//!   4. One beam is greedy decoding.
//!   5. The best sequence is the first of the sorted beams.

use proptest::prelude::*;
use searchlight::sampler::{BeamSampler, BeamSamplerConfig, DecodeRequest, FnOracle, Sampler, StepOracle, StepOutput};
use searchlight::tensor::{MaskGrid, TokenGrid};
use std::convert::Infallible;

const VOCAB: usize = 5;
const LENGTH: usize = 6;
const MAX_BATCH: usize = 3;

type Table = Vec<i32>;

fn logits_at(table: &[i32], row: &[u32], index: usize) -> Vec<f32> {
    let previous = index.checked_sub(1).map(|i| row[i] as usize).unwrap_or(0);
    let offset = (index * VOCAB + previous) * VOCAB;
    table[offset..offset + VOCAB].iter().map(|&logit| logit as f32).collect()
}

fn bigram_oracle(table: Table) -> impl StepOracle<(), Logits = Vec<Vec<f32>>, Hidden = (), Error = Infallible> {
    FnOracle::new(move |tokens: &TokenGrid, cache: (), index: usize| {
        let logits = tokens.iter_rows().map(|row| logits_at(&table, row, index)).collect();
        Ok::<_, Infallible>(StepOutput::new(logits, (), cache))
    })
}

fn greedy(table: &[i32], prompt: &[u32], mask: &[bool], start: usize) -> Vec<u32> {
    let mut row = prompt.to_vec();
    for index in start..row.len() {
        let logits = logits_at(table, &row, index);
        let best = (0..VOCAB).fold(0, |best, token| if logits[token] > logits[best] { token } else { best });
        if !mask[index] {
            row[index] = best as u32;
        }
    }
    row
}

fn sampler(num_beams: usize, return_all_beams: bool) -> BeamSampler {
    BeamSampler::new(BeamSamplerConfig { num_beams, return_all_beams, ..Default::default() })
        .expect("valid config")
}

fn case() -> impl Strategy<Value = (Table, usize, Vec<Vec<u32>>, Vec<Vec<bool>>, usize)> {
    (1..=MAX_BATCH).prop_flat_map(|batch| {
        (
            prop::collection::vec(-4i32..4, LENGTH * VOCAB * VOCAB),
            1usize..=4,
            prop::collection::vec(prop::collection::vec(0u32..VOCAB as u32, LENGTH), batch),
            prop::collection::vec(prop::collection::vec(any::<bool>(), LENGTH), batch),
            0..LENGTH,
        )
    })
}

proptest! {
    /// All beams come back, at full length, with finite scores sorted best first.
    #[test]
    fn all_beams_are_complete_and_sorted((table, num_beams, prompt, _mask, start) in case()) {
        let batch = prompt.len();
        let request = DecodeRequest::new(TokenGrid::from_rows(prompt).unwrap()).starting_at(start);

        let beams = sampler(num_beams, true)
            .decode_blocking(&bigram_oracle(table), request)
            .unwrap()
            .into_all_beams()
            .unwrap();

        prop_assert_eq!(beams.shape(), [batch, num_beams, LENGTH]);
        for scores in beams.scores().iter_rows() {
            prop_assert!(scores.iter().all(|score| score.is_finite()));
            prop_assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]), "scores not sorted: {:?}", scores);
        }
    }

    /// No beam ever overwrites a masked position, nor anything before the start index.
    #[test]
    fn masked_positions_are_preserved((table, num_beams, prompt, mask, start) in case()) {
        let prompt = TokenGrid::from_rows(prompt).unwrap();
        let mask = MaskGrid::from_rows(mask).unwrap();
        let request = DecodeRequest::new(prompt.clone()).starting_at(start).with_mask(mask.clone());

        let beams = sampler(num_beams, true)
            .decode_blocking(&bigram_oracle(table), request)
            .unwrap()
            .into_all_beams()
            .unwrap();

        for batch in 0..prompt.num_rows() {
            for beam in beams.sequences(batch).unwrap().iter_rows() {
                for col in 0..LENGTH {
                    if col < start || mask.row(batch)[col] {
                        prop_assert_eq!(beam[col], prompt.row(batch)[col]);
                    }
                }
            }
        }
    }

    /// A single beam follows the argmax of every step.
    #[test]
    fn single_beam_matches_greedy((table, _num_beams, prompt, mask, start) in case()) {
        let expected: Vec<Vec<u32>> = prompt
            .iter()
            .zip(&mask)
            .map(|(row, fixed)| greedy(&table, row, fixed, start))
            .collect();
        let request = DecodeRequest::new(TokenGrid::from_rows(prompt).unwrap())
            .starting_at(start)
            .with_mask(MaskGrid::from_rows(mask).unwrap());

        let best = sampler(1, false)
            .decode_blocking(&bigram_oracle(table), request)
            .unwrap()
            .into_best()
            .unwrap();

        prop_assert_eq!(best.to_rows(), expected);
    }

    /// The best sequence and the top sorted beam agree.
    #[test]
    fn best_is_first_sorted_beam((table, num_beams, prompt, _mask, start) in case()) {
        let request = DecodeRequest::new(TokenGrid::from_rows(prompt).unwrap()).starting_at(start);
        let oracle = bigram_oracle(table);

        let best = sampler(num_beams, false)
            .decode_blocking(&oracle, request.clone())
            .unwrap()
            .into_best()
            .unwrap();
        let beams = sampler(num_beams, true)
            .decode_blocking(&oracle, request)
            .unwrap()
            .into_all_beams()
            .unwrap();

        for (batch, row) in best.iter_rows().enumerate() {
            prop_assert_eq!(row, beams.sequences(batch).unwrap().row(0));
        }
    }
}
