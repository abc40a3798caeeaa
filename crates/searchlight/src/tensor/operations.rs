use std::cmp::Ordering;

/// Ranking key for a score. NaN sorts below every other value, `-0.0` and
/// `0.0` compare equal.
fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Orders `(index, score)` pairs best first: descending score, then ascending index.
fn best_first(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    rank_key(b.1)
        .partial_cmp(&rank_key(a.1))
        .unwrap_or(Ordering::Equal)
        .then(a.0.cmp(&b.0))
}

/// Log-probabilities of `logits / temperature` under a softmax.
///
/// A row that assigns zero probability everywhere (every logit `-inf`)
/// comes back as all `-inf` rather than NaN. Logits at `+inf` split the
/// whole mass evenly between themselves.
pub(crate) fn log_softmax(logits: &[f32], temperature: f32) -> Vec<f32> {
    let scaled: Vec<f32> = logits.iter().map(|logit| logit / temperature).collect();
    let max = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if max == f32::NEG_INFINITY {
        return vec![f32::NEG_INFINITY; scaled.len()];
    }

    if max == f32::INFINITY {
        let count = scaled.iter().filter(|x| **x == f32::INFINITY).count() as f32;
        let share = -count.ln();
        return scaled
            .iter()
            .map(|x| if *x == f32::INFINITY { share } else { f32::NEG_INFINITY })
            .collect();
    }

    let log_sum = scaled.iter().map(|x| (x - max).exp()).sum::<f32>().ln();
    scaled.iter().map(|x| x - max - log_sum).collect()
}

/// The `k` best `(index, score)` pairs of `scores`, best first.
///
/// Equal scores are ordered by ascending index, so the selection is fully
/// deterministic. Returns fewer than `k` pairs only when `scores` is shorter
/// than `k`.
pub(crate) fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut candidates: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    let k = k.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, best_first);
        candidates.truncate(k);
    }
    candidates.sort_by(best_first);
    candidates
}

/// Index of the largest value, first occurrence on ties.
pub(crate) fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, value) in values.iter().copied().enumerate() {
        let key = rank_key(value);
        match best {
            Some((_, best_key)) if key <= best_key => {}
            _ => best = Some((index, key)),
        }
    }
    best.map(|(index, _)| index)
}

/// Indices that sort `values` in descending order. Stable: equal values keep
/// their original relative order.
pub(crate) fn argsort_descending(values: &[f32]) -> Vec<usize> {
    let mut indexed: Vec<(usize, f32)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(best_first);
    indexed.into_iter().map(|(index, _)| index).collect()
}

/// Leading-axis indices that replicate each of `len` rows `times` times,
/// consecutively: `[0, 0, .., 1, 1, ..]`.
#[cfg(any(feature = "candle", feature = "burn"))]
pub(crate) fn repeat_interleave_indices(len: usize, times: usize) -> Vec<usize> {
    (0..len)
        .flat_map(|row| std::iter::repeat_n(row, times))
        .collect()
}
