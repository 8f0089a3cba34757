use anyhow::Result;
use opencv::{
    core::{self, DMatch, Vector},
    features2d::BFMatcher,
    prelude::*,
};

/// Hamming distances from one query descriptor to its two nearest
/// neighbors in the reference set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborPair {
    pub query_idx: i32,
    pub best: f32,
    pub second: f32,
}

/// Brute-force Hamming matcher, cross-check off. Exact top-2 is required
/// for the ratio test downstream, so no approximate index here.
pub struct HammingMatcher {
    matcher: BFMatcher,
}

impl HammingMatcher {
    pub fn new() -> Result<Self> {
        let matcher = BFMatcher::new(core::NORM_HAMMING, false)?;
        Ok(Self { matcher })
    }

    /// Two nearest reference neighbors for every query descriptor.
    ///
    /// Either side empty yields an empty list. A query whose neighbor list
    /// comes back shorter than two (reference set of size one) is dropped;
    /// without a second-best distance the ratio test cannot call it
    /// confident anyway.
    pub fn knn2(&self, query: &Mat, reference: &Mat) -> Result<Vec<NeighborPair>> {
        if query.empty() || reference.empty() {
            return Ok(Vec::new());
        }

        let mut matches = Vector::<Vector<DMatch>>::new();
        self.matcher
            .knn_train_match(query, reference, &mut matches, 2, &core::no_array(), false)?;

        let mut pairs = Vec::with_capacity(matches.len());
        for neighbors in matches.iter() {
            if neighbors.len() < 2 {
                continue;
            }
            let best = neighbors.get(0)?;
            let second = neighbors.get(1)?;
            pairs.push(NeighborPair {
                query_idx: best.query_idx,
                best: best.distance,
                second: second.distance,
            });
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor_mat(rows: &[[u8; 4]]) -> Mat {
        Mat::from_slice_2d(rows).unwrap()
    }

    #[test]
    fn empty_side_yields_no_pairs() {
        let matcher = HammingMatcher::new().unwrap();
        let some = descriptor_mat(&[[0xFF, 0x00, 0x00, 0x00]]);
        let none = Mat::default();
        assert!(matcher.knn2(&none, &some).unwrap().is_empty());
        assert!(matcher.knn2(&some, &none).unwrap().is_empty());
        assert!(matcher.knn2(&none, &none).unwrap().is_empty());
    }

    #[test]
    fn finds_exact_top_two_by_hamming_distance() {
        let matcher = HammingMatcher::new().unwrap();
        let query = descriptor_mat(&[[0b1111_0000, 0, 0, 0]]);
        let reference = descriptor_mat(&[
            [0b1111_0000, 0, 0, 0], // distance 0
            [0b1111_1100, 0, 0, 0], // distance 2
            [0b0000_1111, 0, 0, 0], // distance 8
        ]);

        let pairs = matcher.knn2(&query, &reference).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].query_idx, 0);
        assert_eq!(pairs[0].best, 0.0);
        assert_eq!(pairs[0].second, 2.0);
    }

    #[test]
    fn single_reference_descriptor_produces_no_pair() {
        let matcher = HammingMatcher::new().unwrap();
        let query = descriptor_mat(&[[0xAA, 0xAA, 0xAA, 0xAA]]);
        let reference = descriptor_mat(&[[0xAA, 0xAA, 0xAA, 0xAA]]);
        assert!(matcher.knn2(&query, &reference).unwrap().is_empty());
    }
}
