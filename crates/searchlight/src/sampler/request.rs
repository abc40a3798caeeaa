use crate::tensor::{MaskGrid, TokenGrid};

/// Per-call arguments of [`Sampler::decode`](super::Sampler::decode).
///
/// ```rust
/// use searchlight::sampler::DecodeRequest;
/// use searchlight::tensor::{MaskGrid, TokenGrid};
///
/// let prompt = TokenGrid::from_rows(vec![vec![7, 8, 0, 0, 0]]).unwrap();
/// let mask = MaskGrid::from_rows(vec![vec![true, true, false, false, false]]).unwrap();
///
/// let request = DecodeRequest::new(prompt)
///     .starting_at(2)
///     .with_mask(mask)
///     .with_end_token(1);
/// assert_eq!(request.index(), 2);
/// ```
///
/// The request is consumed by the decode; the caller's prompt is never
/// written to.
#[derive(Debug, Clone)]
pub struct DecodeRequest<C = ()> {
    prompt: TokenGrid,
    cache: C,
    index: usize,
    mask: Option<MaskGrid>,
    end_token_id: Option<u32>,
}

impl DecodeRequest<()> {
    /// A request with no cache, generating from position `0`, with nothing
    /// masked and no end token.
    pub fn new(prompt: TokenGrid) -> Self {
        Self {
            prompt,
            cache: (),
            index: 0,
            mask: None,
            end_token_id: None,
        }
    }
}

impl<C> DecodeRequest<C> {
    /// Attach a cache payload, laid out `(batch, ...)` along its leading axis.
    pub fn with_cache<D>(self, cache: D) -> DecodeRequest<D> {
        DecodeRequest {
            prompt: self.prompt,
            cache,
            index: self.index,
            mask: self.mask,
            end_token_id: self.end_token_id,
        }
    }

    /// First position to generate at.
    pub fn starting_at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Positions marked `true` keep their prompt token.
    pub fn with_mask(mut self, mask: MaskGrid) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_end_token(mut self, end_token_id: u32) -> Self {
        self.end_token_id = Some(end_token_id);
        self
    }

    pub fn prompt(&self) -> &TokenGrid {
        &self.prompt
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mask(&self) -> Option<&MaskGrid> {
        self.mask.as_ref()
    }

    pub fn end_token_id(&self) -> Option<u32> {
        self.end_token_id
    }

    pub(crate) fn into_parts(self) -> (TokenGrid, C, usize, Option<MaskGrid>, Option<u32>) {
        (self.prompt, self.cache, self.index, self.mask, self.end_token_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Grid;

    #[test]
    fn test_defaults() {
        let request = DecodeRequest::new(Grid::filled(2, 4, 0));
        assert_eq!(request.index(), 0);
        assert!(request.mask().is_none());
        assert_eq!(request.end_token_id(), None);
        assert_eq!(request.prompt().shape(), [2, 4]);
    }

    #[test]
    fn test_with_cache_keeps_other_arguments() {
        let request = DecodeRequest::new(Grid::filled(1, 6, 3))
            .starting_at(4)
            .with_end_token(9)
            .with_cache(vec![Grid::filled(1, 2, 0.5f32)]);

        assert_eq!(request.index(), 4);
        assert_eq!(request.end_token_id(), Some(9));
        assert_eq!(request.cache().len(), 1);
    }
}
