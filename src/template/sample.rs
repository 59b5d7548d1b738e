//! Weighted and uniform picks from a shared random stream

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Result of a single pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampled {
    pub index: usize,
    /// The weights were unusable and the pick was made uniformly instead
    pub fell_back: bool,
}

/// Pick one index. Uniform when no weight is given; otherwise missing weights count
/// as 1.0. Negative, non-finite or all-zero weights fall back to uniform.
pub fn pick_index<R: Rng + ?Sized>(weights: &[Option<f64>], rng: &mut R) -> Option<Sampled> {
    if weights.is_empty() {
        return None;
    }
    if weights.iter().all(Option::is_none) {
        return Some(Sampled {
            index: rng.gen_range(0..weights.len()),
            fell_back: false,
        });
    }

    let resolved: Vec<f64> = weights.iter().map(|w| w.unwrap_or(1.0)).collect();
    let usable = resolved.iter().all(|w| w.is_finite() && *w >= 0.0);
    match usable.then(|| WeightedIndex::new(&resolved).ok()).flatten() {
        Some(dist) => Some(Sampled {
            index: dist.sample(rng),
            fell_back: false,
        }),
        None => Some(Sampled {
            index: rng.gen_range(0..weights.len()),
            fell_back: true,
        }),
    }
}

/// Pick up to `count` distinct indices, in pick order
///
/// Returns the indices and whether any pick fell back to uniform.
pub fn pick_distinct<R: Rng + ?Sized>(
    weights: &[Option<f64>],
    count: usize,
    rng: &mut R,
) -> (Vec<usize>, bool) {
    let mut remaining: Vec<usize> = (0..weights.len()).collect();
    let mut picked = Vec::with_capacity(count.min(weights.len()));
    let mut fell_back = false;

    while picked.len() < count && !remaining.is_empty() {
        let candidate_weights: Vec<Option<f64>> = remaining.iter().map(|&i| weights[i]).collect();
        let Some(sampled) = pick_index(&candidate_weights, rng) else {
            break;
        };
        fell_back |= sampled.fell_back;
        picked.push(remaining.remove(sampled.index));
    }
    (picked, fell_back)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_has_no_pick() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_index(&[], &mut rng), None);
    }

    #[test]
    fn test_uniform_covers_all() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = [None, None, None];
        let mut seen = [false; 3];
        for _ in 0..200 {
            let sampled = pick_index(&weights, &mut rng).unwrap();
            assert!(!sampled.fell_back);
            seen[sampled.index] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_zero_weight_never_picked() {
        let mut rng = StdRng::seed_from_u64(3);
        let weights = [Some(0.0), Some(1.0)];
        for _ in 0..100 {
            assert_eq!(pick_index(&weights, &mut rng).unwrap().index, 1);
        }
    }

    #[test]
    fn test_invalid_weights_fall_back() {
        let mut rng = StdRng::seed_from_u64(3);
        for weights in [
            vec![Some(-1.0), Some(1.0)],
            vec![Some(0.0), Some(0.0)],
            vec![Some(f64::NAN), None],
        ] {
            let sampled = pick_index(&weights, &mut rng).unwrap();
            assert!(sampled.fell_back);
            assert!(sampled.index < weights.len());
        }
    }

    #[test]
    fn test_distinct_picks() {
        let mut rng = StdRng::seed_from_u64(11);
        let (picked, fell_back) = pick_distinct(&[None, None, None, None], 3, &mut rng);
        assert!(!fell_back);
        assert_eq!(picked.len(), 3);
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn test_distinct_count_capped() {
        let mut rng = StdRng::seed_from_u64(11);
        let (picked, _) = pick_distinct(&[None, None], 5, &mut rng);
        assert_eq!(picked.len(), 2);
    }
}
