//! Host-side buffers and the numeric kernels the beam sampler runs on them.

pub mod constant;
mod grid;
pub(crate) mod operations;

pub use grid::{Grid, MaskGrid, TokenGrid};
