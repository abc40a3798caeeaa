use std::collections::HashMap;
use std::hash::Hash;
use crate::error::DecodeError;
use crate::tensor::Grid;


/// The trait that must be fulfilled by a cache payload to survive beam search.
///
/// The sampler never reads or writes a cache's contents. It only needs to
/// line the cache up with the beams: once when the prompt is replicated into
/// `num_beams` copies, and once per step when beams are reshuffled. Both
/// operations act on the leading ([`BATCH_DIM`](crate::tensor::constant::BATCH_DIM)) axis.
///
/// Containers of caches are caches themselves, which covers the usual
/// "one key/value pair per layer" payloads without any tree traversal.
pub trait BeamCache: Sized + Send {
    /// Replicate every leading-axis row `num_beams` times, consecutively,
    /// so row `i` becomes rows `i * num_beams .. (i + 1) * num_beams`
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError>;

    /// Reindex the leading axis: output row `j` is input row `indices[j]`
    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError>;

    /// Size of the leading axis, `None` when the cache holds no tensors.
    ///
    /// Nested caches report the size shared by all their leaves, and fail if
    /// two leaves disagree
    fn leading_len(&self) -> Result<Option<usize>, DecodeError>;
}

/// The leading-axis size every leaf agrees on, skipping empty leaves.
fn common_leading_len<I>(lens: I) -> Result<Option<usize>, DecodeError>
where I: IntoIterator<Item = Result<Option<usize>, DecodeError>>
{
    let mut common = None;
    for len in lens {
        match (common, len?) {
            (Some(expected), Some(actual)) if expected != actual => {
                return Err(DecodeError::shape("cache leaf", &[expected], &[actual]));
            }
            (None, Some(actual)) => common = Some(actual),
            _ => {}
        }
    }
    Ok(common)
}

/// The trait that must be fulfilled by the logits a step oracle returns.
pub trait Logits {
    /// Return the shape of the logits, expected to be `(batch * beam, vocab)`
    fn shape(&self) -> Vec<usize>;

    /// Copy the logits out as one `f32` row per flattened beam
    fn to_rows(&self) -> Result<Vec<Vec<f32>>, DecodeError>;
}


impl BeamCache for () {
    fn repeat_beams(&self, _num_beams: usize) -> Result<Self, DecodeError> {
        Ok(())
    }

    fn select_beams(&self, _indices: &[usize]) -> Result<Self, DecodeError> {
        Ok(())
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        Ok(None)
    }
}

impl<C: BeamCache> BeamCache for Option<C> {
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
        self.as_ref().map(|cache| cache.repeat_beams(num_beams)).transpose()
    }

    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        self.as_ref().map(|cache| cache.select_beams(indices)).transpose()
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        self.as_ref().map_or(Ok(None), BeamCache::leading_len)
    }
}

impl<C: BeamCache> BeamCache for Vec<C> {
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
        self.iter().map(|cache| cache.repeat_beams(num_beams)).collect()
    }

    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        self.iter().map(|cache| cache.select_beams(indices)).collect()
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        common_leading_len(self.iter().map(BeamCache::leading_len))
    }
}

impl<K, C> BeamCache for HashMap<K, C>
where K: Eq + Hash + Clone + Send,
      C: BeamCache
{
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
        self.iter()
            .map(|(key, cache)| Ok((key.clone(), cache.repeat_beams(num_beams)?)))
            .collect()
    }

    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        self.iter()
            .map(|(key, cache)| Ok((key.clone(), cache.select_beams(indices)?)))
            .collect()
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        common_leading_len(self.values().map(BeamCache::leading_len))
    }
}

macro_rules! impl_beam_cache_for_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name),+> BeamCache for ($($name,)+)
        where $($name: BeamCache),+ {
            fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
                Ok(($(self.$idx.repeat_beams(num_beams)?,)+))
            }

            fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
                Ok(($(self.$idx.select_beams(indices)?,)+))
            }

            fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
                common_leading_len([$(self.$idx.leading_len()),+])
            }
        }
    }
}

impl_beam_cache_for_tuple!(K: 0, V: 1);
impl_beam_cache_for_tuple!(A: 0, B: 1, C: 2);

impl<T: Clone + Send> BeamCache for Grid<T> {
    fn repeat_beams(&self, num_beams: usize) -> Result<Self, DecodeError> {
        Ok(self.repeat_rows(num_beams))
    }

    fn select_beams(&self, indices: &[usize]) -> Result<Self, DecodeError> {
        self.select_rows(indices)
    }

    fn leading_len(&self) -> Result<Option<usize>, DecodeError> {
        Ok(Some(self.num_rows()))
    }
}


impl Logits for Vec<Vec<f32>> {
    fn shape(&self) -> Vec<usize> {
        vec![self.len(), self.first().map(Vec::len).unwrap_or(0)]
    }

    fn to_rows(&self) -> Result<Vec<Vec<f32>>, DecodeError> {
        Ok(self.clone())
    }
}

impl Logits for Grid<f32> {
    fn shape(&self) -> Vec<usize> {
        Grid::shape(self).to_vec()
    }

    fn to_rows(&self) -> Result<Vec<Vec<f32>>, DecodeError> {
        Ok(Grid::to_rows(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(rows: &[u32]) -> Grid<u32> {
        Grid::from_rows(rows.iter().map(|r| vec![*r, *r]).collect()).unwrap()
    }

    fn first_column(grid: &Grid<u32>) -> Vec<u32> {
        grid.iter_rows().map(|row| row[0]).collect()
    }

    #[test]
    fn test_unit_cache_is_noop() {
        assert!(().repeat_beams(4).is_ok());
        assert!(().select_beams(&[3, 2, 1]).is_ok());
    }

    #[test]
    fn test_nested_cache_repeats_every_leaf() {
        let mut named = HashMap::new();
        named.insert("cross", layer(&[7, 8]));
        let cache = (vec![layer(&[1, 2]), layer(&[3, 4])], Some(named));

        let (layers, named) = cache.repeat_beams(2).unwrap();

        assert_eq!(first_column(&layers[0]), vec![1, 1, 2, 2]);
        assert_eq!(first_column(&layers[1]), vec![3, 3, 4, 4]);
        let named = named.unwrap();
        assert_eq!(first_column(&named["cross"]), vec![7, 7, 8, 8]);
    }

    #[test]
    fn test_nested_cache_selects_every_leaf() {
        let cache = (layer(&[10, 11, 12]), None::<Grid<u32>>, vec![layer(&[20, 21, 22])]);

        let (a, b, c) = cache.select_beams(&[2, 0, 0]).unwrap();

        assert_eq!(first_column(&a), vec![12, 10, 10]);
        assert!(b.is_none());
        assert_eq!(first_column(&c[0]), vec![22, 20, 20]);
    }

    #[test]
    fn test_nested_cache_propagates_errors() {
        let cache = vec![layer(&[1, 2, 3]), layer(&[1])];
        let err = cache.select_beams(&[2]).unwrap_err();
        assert!(matches!(err, DecodeError::IndexOutOfRange { index: 2, len: 1 }));
    }

    #[test]
    fn test_leading_len_of_nested_cache() {
        assert_eq!(().leading_len().unwrap(), None);
        assert_eq!(Vec::<Grid<u32>>::new().leading_len().unwrap(), None);

        let mut named = HashMap::new();
        named.insert("cross", layer(&[7, 8]));
        let cache = (vec![layer(&[1, 2]), layer(&[3, 4])], Some(named), ());
        assert_eq!(cache.leading_len().unwrap(), Some(2));
    }

    #[test]
    fn test_leading_len_rejects_disagreeing_leaves() {
        let cache = (layer(&[1, 2]), vec![layer(&[3, 4]), layer(&[5, 6, 7])]);
        let err = cache.leading_len().unwrap_err();
        assert!(matches!(err, DecodeError::ShapeMismatch { what: "cache leaf", .. }));
    }

    #[test]
    fn test_vec_logits_shape() {
        let logits = vec![vec![0.0f32; 26]; 5];
        assert_eq!(Logits::shape(&logits), vec![5, 26]);
        assert_eq!(logits.to_rows().unwrap().len(), 5);
    }
}
