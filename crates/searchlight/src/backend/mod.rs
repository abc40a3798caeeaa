//! # Tensor Backend
//!
//! This module provides the two capabilities the beam sampler needs from a
//! tensor library, so that decoding works in a backend-agnostic manner:
//!
//! - [`BeamCache`]: replicate and reindex a value along its leading (batch) axis,
//!   and report that axis' size so mismatched caches fail instead of being
//!   silently trimmed. This is all the sampler ever does with the caller's cache payload.
//! - [`Logits`]: read an oracle's `(batch * beam, vocab)` output back as `f32` rows.
//!
//! ## Feature Flags
//!
//! The module uses feature flags to conditionally compile support for different backends:
//!
//! - `candle`: Enables support for the Candle tensor library
//! - `burn`: Enables support for the Burn tensor library
//!
//! Without either flag, host [`Grid`](crate::tensor::Grid)s and nested containers
//! (`Vec`, `Option`, `HashMap`, tuples) of caches are still supported.

mod core_trait;

#[cfg_attr(docsrs, doc(cfg(feature = "candle")))]
#[cfg(feature = "candle")]
/// Candle tensor backend implementation.
///
/// This module is only available when the `candle` feature flag is enabled.
/// It provides an implementation of the [`BeamCache`] and [`Logits`] traits
/// for Candle's `Tensor` type, reindexing with `index_select` on dimension `0`.
pub mod candle;

#[cfg_attr(docsrs, doc(cfg(feature = "burn")))]
#[cfg(feature = "burn")]
/// Burn tensor backend implementation.
///
/// This module is only available when the `burn` feature flag is enabled.
/// It provides [`BeamCache`] for numeric Burn tensors of any rank, and
/// [`Logits`] for rank 2 float tensors.
pub mod burn;


// Re-export the core traits for convenient imports
pub use core_trait::*;


#[cfg(test)]
/// Mock tensor implementation.
///
/// Tracks which source row every leading-axis slot holds
pub(crate) mod mock_tensor;
