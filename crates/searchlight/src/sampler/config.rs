use serde::{Deserialize, Serialize};
use crate::error::DecodeError;
use crate::tensor::constant::DEFAULT_NUM_BEAMS;

/// When a decode with an end token is allowed to stop early.
///
/// A beam "holds" the end token once the token appears at a position the
/// mask does not fix, i.e. the sampler generated it rather than the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Stop once every batch element has at least one beam holding the end token.
    #[default]
    AnyBeam,

    /// Stop once every beam of every batch element holds the end token.
    AllBeams,
}

/// Construction-time configuration of a [`BeamSampler`](super::BeamSampler).
///
/// Every field has a default, so partial configs deserialize:
///
/// ```rust
/// use searchlight::sampler::{BeamSamplerConfig, StopPolicy};
///
/// let config: BeamSamplerConfig = serde_json::from_str(r#"{"num_beams": 3}"#).unwrap();
/// assert_eq!(config.num_beams, 3);
/// assert!(!config.return_all_beams);
/// assert_eq!(config.stop_policy, StopPolicy::AnyBeam);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSamplerConfig {
    /// Beams kept per batch element at every step. Must be at least `1`.
    pub num_beams: usize,

    /// Return every beam with its score instead of only the best sequence.
    pub return_all_beams: bool,

    /// Logits are divided by this before the probability transform.
    pub temperature: f32,

    pub stop_policy: StopPolicy,
}

impl Default for BeamSamplerConfig {
    fn default() -> Self {
        Self {
            num_beams: DEFAULT_NUM_BEAMS,
            return_all_beams: false,
            temperature: 1.0,
            stop_policy: StopPolicy::default(),
        }
    }
}

impl BeamSamplerConfig {
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.num_beams == 0 {
            return Err(DecodeError::InvalidNumBeams(self.num_beams));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(DecodeError::InvalidTemperature(self.temperature));
        }
        Ok(())
    }
}
