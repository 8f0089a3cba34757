use anyhow::Result;
use opencv::prelude::*;

use crate::core::classify;
use crate::core::features::{FrameFeatures, OrbExtractor};
use crate::core::matcher::HammingMatcher;
use crate::core::selector::SimilarityModel;

/// ORB extraction + brute-force Hamming k-NN + ratio test, glued into the
/// selector's similarity contract.
pub struct OrbSimilarity {
    extractor: OrbExtractor,
    matcher: HammingMatcher,
    ratio: f32,
}

impl OrbSimilarity {
    pub fn new(ratio: f32) -> Result<Self> {
        Ok(Self {
            extractor: OrbExtractor::new()?,
            matcher: HammingMatcher::new()?,
            ratio,
        })
    }
}

impl SimilarityModel for OrbSimilarity {
    type Frame = Mat;
    type Features = FrameFeatures;

    fn extract(&mut self, frame: &Mat) -> Result<FrameFeatures> {
        self.extractor.extract(frame)
    }

    fn confident_matches(
        &mut self,
        retained: &FrameFeatures,
        current: &FrameFeatures,
    ) -> Result<usize> {
        // Either side without descriptors means no evidence of similarity.
        if retained.is_empty() || current.is_empty() {
            return Ok(0);
        }
        // The retained frame's descriptors are the query side, matching the
        // reference pipeline's orientation.
        let pairs = self
            .matcher
            .knn2(&retained.descriptors, &current.descriptors)?;
        Ok(classify::confident_matches(&pairs, self.ratio))
    }
}
