use crate::core::matcher::NeighborPair;

/// Lowe ratio threshold. 0.5 is deliberately stricter than the 0.8 the
/// feature-matching literature uses for correspondence: this classifier
/// detects duplication, not merely overlap.
pub const DEFAULT_RATIO: f32 = 0.5;

/// Confident-match count above which a frame is deemed redundant.
pub const DEFAULT_CUTOFF: usize = 10;

/// Count the pairs that pass the ratio test: best strictly closer than
/// `ratio` times the second-best. The accept/reject decision against the
/// cutoff belongs to the selector, not here.
pub fn confident_matches(pairs: &[NeighborPair], ratio: f32) -> usize {
    pairs.iter().filter(|p| p.best < ratio * p.second).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(best: f32, second: f32) -> NeighborPair {
        NeighborPair {
            query_idx: 0,
            best,
            second,
        }
    }

    #[test]
    fn empty_input_counts_zero() {
        assert_eq!(confident_matches(&[], DEFAULT_RATIO), 0);
    }

    #[test]
    fn counts_only_pairs_below_ratio() {
        let pairs = [pair(10.0, 40.0), pair(30.0, 40.0), pair(0.0, 1.0)];
        assert_eq!(confident_matches(&pairs, 0.5), 2);
    }

    #[test]
    fn boundary_is_strict() {
        // best == ratio * second is not confident.
        let pairs = [pair(20.0, 40.0)];
        assert_eq!(confident_matches(&pairs, 0.5), 0);
        assert_eq!(confident_matches(&pairs, 0.51), 1);
    }

    #[test]
    fn identical_descriptors_are_confident() {
        // Exact duplicate: best distance 0 against any nonzero second.
        let pairs = [pair(0.0, 12.0)];
        assert_eq!(confident_matches(&pairs, DEFAULT_RATIO), 1);
    }

    #[test]
    fn zero_second_best_is_never_confident() {
        // Degenerate tie at distance 0: 0 < ratio * 0 is false.
        let pairs = [pair(0.0, 0.0)];
        assert_eq!(confident_matches(&pairs, DEFAULT_RATIO), 0);
    }
}
