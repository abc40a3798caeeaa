/// # Constants with reserved meanings in Searchlight

/// In a given tensor shape, Searchlight reserves the `0th` dimension for batching
pub const BATCH_DIM: usize = 0;

/// In a sequence buffer, the `1st` dimension is the sequence
pub const SEQ_DIM: usize = 1;

/// Once beams are unflattened, `(batch, beam, ...)`, the `1st` dimension is the beam
pub const BEAM_DIM: usize = 1;

/// Number of beams kept per batch element unless configured otherwise
pub const DEFAULT_NUM_BEAMS: usize = 5;

/// Starting log-probability of every beam but the first, per batch element.
/// Keeps the first expansion from selecting `num_beams` copies of one prefix.
pub const INITIAL_BEAM_SENTINEL: f32 = -1e9;
