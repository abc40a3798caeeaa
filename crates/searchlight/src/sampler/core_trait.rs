use std::marker::PhantomData;
use async_trait::async_trait;
use crate::backend::{BeamCache, Logits};
use crate::error::DecodeError;
use crate::tensor::TokenGrid;
use super::output::SamplerOutput;
use super::request::DecodeRequest;

/// What a [`StepOracle`] hands back for one decode position.
#[derive(Debug, Clone)]
pub struct StepOutput<L, H, C> {
    /// Next-token logits, shape `(batch * beam, vocab)`
    pub logits: L,

    /// Auxiliary per-step state. Samplers pass it through without looking at it.
    pub hidden_states: H,

    /// The cache to use for the next call, same structure as the one passed in
    pub cache: C,
}

impl<L, H, C> StepOutput<L, H, C> {
    pub fn new(logits: L, hidden_states: H, cache: C) -> Self {
        Self { logits, hidden_states, cache }
    }
}

/// # StepOracle
///
/// The next-token distribution a sampler decodes against.
/// ```rust
/// use searchlight::backend::BeamCache;
/// use searchlight::sampler::{StepOracle, StepOutput};
/// use searchlight::tensor::TokenGrid;
/// use async_trait::async_trait;
/// use std::convert::Infallible;
///
/// /// Always prefers the token after the previous one.
/// pub struct Counter {
///     vocab_size: usize,
/// }
///
/// #[async_trait]
/// impl<C: BeamCache + 'static> StepOracle<C> for Counter {
///     type Logits = Vec<Vec<f32>>;
///     type Hidden = ();
///     type Error = Infallible;
///
///     async fn next(
///         &self,
///         tokens: &TokenGrid,
///         cache: C,
///         index: usize,
///     ) -> Result<StepOutput<Self::Logits, (), C>, Infallible> {
///         let logits = tokens
///             .iter_rows()
///             .map(|row| {
///                 let previous = index.checked_sub(1).map(|i| row[i] as usize).unwrap_or(0);
///                 let mut logits = vec![0.0; self.vocab_size];
///                 logits[(previous + 1) % self.vocab_size] = 10.0;
///                 logits
///             })
///             .collect();
///         Ok(StepOutput::new(logits, (), cache))
///     }
/// }
/// ```
///
/// ## Contract
///
/// - `tokens` is the flattened `(batch * beam, length)` sequence buffer. Only
///   positions before `index` hold decoded (or prompt) tokens that matter.
/// - `index` increases by one on every call of a decode.
/// - `cache` arrives replicated and reindexed to follow the beams; the
///   returned cache must keep the same structure.
/// - The returned logits must have shape `(batch * beam, vocab)` with the
///   same vocabulary size on every call.
///
/// Errors are surfaced to the caller as [`DecodeError::Oracle`]; samplers
/// never retry.
#[async_trait]
pub trait StepOracle<C: Send + 'static>: Send + Sync {
    /// Logits type, read back through [`Logits::to_rows`]
    type Logits: Logits + Send + 'static;

    /// Auxiliary state returned alongside the logits
    type Hidden: Send + 'static;

    /// Failure type of a single call
    type Error: std::error::Error + Send + Sync + 'static;

    /// Compute next-token logits for position `index`.
    async fn next(
        &self,
        tokens: &TokenGrid,
        cache: C,
        index: usize,
    ) -> Result<StepOutput<Self::Logits, Self::Hidden, C>, Self::Error>;
}

/// # Sampler
///
/// A decoding strategy: turns a prompt and a [`StepOracle`] into finished
/// sequences.
///
/// Every strategy exposes the same single operation; the beam sampler is
/// [`BeamSampler`](super::BeamSampler).
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Decode `request` against `oracle`, running to completion.
    ///
    /// The only suspension points are the oracle calls, each awaited fully
    /// before the next step starts.
    async fn decode<O, C>(
        &self,
        oracle: &O,
        request: DecodeRequest<C>,
    ) -> Result<SamplerOutput, DecodeError>
    where
        O: StepOracle<C>,
        C: BeamCache + 'static;

    /// Blocking form of [`decode`](Sampler::decode) for synchronous callers.
    ///
    /// Must not be called from inside an async runtime's worker thread.
    fn decode_blocking<O, C>(
        &self,
        oracle: &O,
        request: DecodeRequest<C>,
    ) -> Result<SamplerOutput, DecodeError>
    where
        O: StepOracle<C>,
        C: BeamCache + 'static,
    {
        futures::executor::block_on(self.decode(oracle, request))
    }
}

/// Adapts a synchronous closure into a [`StepOracle`].
///
/// ```rust
/// use searchlight::sampler::{FnOracle, StepOutput};
/// use searchlight::tensor::TokenGrid;
/// use std::convert::Infallible;
///
/// let uniform = FnOracle::new(|tokens: &TokenGrid, cache: (), _index: usize| {
///     let logits = vec![vec![1.0f32; 26]; tokens.num_rows()];
///     Ok::<_, Infallible>(StepOutput::new(logits, (), cache))
/// });
/// # let _ = uniform;
/// ```
pub struct FnOracle<F, L, H, E> {
    f: F,
    _marker: PhantomData<fn() -> (L, H, E)>,
}

impl<F, L, H, E> FnOracle<F, L, H, E> {
    pub fn new<C>(f: F) -> Self
    where F: Fn(&TokenGrid, C, usize) -> Result<StepOutput<L, H, C>, E>
    {
        Self { f, _marker: PhantomData }
    }
}

#[async_trait]
impl<F, C, L, H, E> StepOracle<C> for FnOracle<F, L, H, E>
where
    F: Fn(&TokenGrid, C, usize) -> Result<StepOutput<L, H, C>, E> + Send + Sync + 'static,
    C: Send + 'static,
    L: Logits + Send + 'static,
    H: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Logits = L;
    type Hidden = H;
    type Error = E;

    async fn next(
        &self,
        tokens: &TokenGrid,
        cache: C,
        index: usize,
    ) -> Result<StepOutput<L, H, C>, E> {
        (self.f)(tokens, cache, index)
    }
}
