//! # Searchlight
//!
//! Beam search decoding for autoregressive models over pluggable tensor backends.
//!
//! ## Overview
//!
//! This library keeps the `num_beams` most probable partial sequences per batch
//! element while a model extends them one token at a time. The model is reached
//! through an asynchronous step oracle, so any inference engine, local or
//! remote, can drive the search.
//!
//! Key components include:
//!
//! - A small backend abstraction for caches and logits
//! - Host token and mask grids, plus the numeric kernels the search runs on
//! - The beam sampler itself, with a serde-friendly configuration
//!
//! ## Architecture
//!
//! ### Assumptions
//! Regardless of backend used, searchlight reserves two dimensions with special meanings:
//!  - The `0th` dimension is reserved as the batch dimension. During a decode
//!    it holds `batch * num_beams` rows, beam-major within each batch element
//!  - The `1st` dimension of token buffers is the sequence dimension
//!  - Caches may fill in other dimensions
//!
//! ### Backend Traits
//!
//! The `BeamCache` and `Logits` traits define what a tensor implementation must
//! provide. The search itself never inspects a cache; it only replicates it
//! per beam and reorders it after every step.
//!
//! ### Sampling
//!
//! The `StepOracle` trait is the model, the `Sampler` trait a decoding
//! strategy, and `BeamSampler` the beam search strategy.
//!
//! ## Features
//!
//! - **candle** - Enables candle backend
//! - **burn** - Enables burn backend
//!
//! ## Implementation Details
//!
//! Scores are cumulative natural-log probabilities. At the first step only the
//! first beam of each batch element is live, so the search does not start with
//! `num_beams` identical hypotheses. Positions fixed by the caller's mask keep
//! their prompt token throughout.

pub mod backend;
pub mod error;
pub mod sampler;
pub mod tensor;

/// Constants for client reference
pub use tensor::constant;

pub use error::DecodeError;
pub use sampler::{BeamSampler, BeamSamplerConfig, DecodeRequest, Sampler, SamplerOutput, StepOracle, StepOutput};
pub use tensor::{Grid, MaskGrid, TokenGrid};
