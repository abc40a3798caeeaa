//! # Sampling
//!
//! Beam search decoding against a caller-supplied step oracle.
//!
//! ## Overview
//!
//! A decode fills the unmasked positions of a `(batch, length)` token buffer
//! one position at a time, from a start index to the end of the buffer. At each
//! position the [`StepOracle`] is asked for next-token logits, and the
//! [`BeamSampler`] keeps the `num_beams` highest-scoring continuations of every
//! batch element.
//!
//! ## Key Components
//!
//! * [`StepOracle`] - The model: tokens and cache in, logits and cache out
//! * [`Sampler`] - A decoding strategy, with a single `decode` operation
//! * [`BeamSampler`] - Beam search, configured by a [`BeamSamplerConfig`]
//! * [`DecodeRequest`] - Prompt, cache, start index, mask and end token of one decode
//! * [`SamplerOutput`] - Either the best sequence per batch element, or every [`Beams`]
//!
//! # Example
//!
//! ```rust
//! use searchlight::sampler::{BeamSampler, BeamSamplerConfig, DecodeRequest, FnOracle, Sampler, StepOutput};
//! use searchlight::tensor::TokenGrid;
//! use std::convert::Infallible;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), searchlight::error::DecodeError> {
//! // Always prefers token `1`, then token `0`.
//! let oracle = FnOracle::new(|tokens: &TokenGrid, cache: (), _index: usize| {
//!     let logits = vec![vec![1.0f32, 2.0, 0.0]; tokens.num_rows()];
//!     Ok::<_, Infallible>(StepOutput::new(logits, (), cache))
//! });
//!
//! let sampler = BeamSampler::new(BeamSamplerConfig {
//!     num_beams: 2,
//!     return_all_beams: true,
//!     ..Default::default()
//! })?;
//!
//! let request = DecodeRequest::new(TokenGrid::filled(1, 3, 0)).starting_at(1);
//! let beams = sampler.decode(&oracle, request).await?.into_all_beams().unwrap();
//!
//! assert_eq!(beams.shape(), [1, 2, 3]);
//! assert_eq!(beams.sequences(0).unwrap().row(0), &[0, 1, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Implementation Details
//!
//! Batch and beam are folded into one leading axis for the whole decode, so the
//! oracle always sees a `(batch * num_beams, length)` buffer and a cache with
//! `batch * num_beams` leading rows. After each step the buffer and the cache
//! are reindexed so every surviving beam carries its parent's history.

mod beam;
mod config;
mod core_trait;
mod output;
mod request;
mod state;

pub use beam::BeamSampler;
pub use config::{BeamSamplerConfig, StopPolicy};
pub use core_trait::*;
pub use output::{Beams, SamplerOutput};
pub use request::DecodeRequest;
