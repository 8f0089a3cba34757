use anyhow::Result;
use opencv::{
    core::{self, KeyPoint, Vector},
    features2d::{ORB_ScoreType, ORB},
    imgproc,
    prelude::*,
};

/// Upper bound on keypoints detected per frame (backend default).
pub const MAX_FEATURES: i32 = 500;

/// ORB keypoints plus their binary descriptors for one frame.
///
/// `descriptors` holds one 256-bit row per keypoint. A frame with no
/// detectable texture yields an empty set; that is data, not an error.
pub struct FrameFeatures {
    pub keypoints: Vector<KeyPoint>,
    pub descriptors: Mat,
}

impl FrameFeatures {
    pub fn is_empty(&self) -> bool {
        self.descriptors.empty()
    }

    pub fn len(&self) -> usize {
        self.descriptors.rows() as usize
    }
}

pub struct OrbExtractor {
    orb: core::Ptr<ORB>,
}

impl OrbExtractor {
    pub fn new() -> Result<Self> {
        // (nfeatures, scaleFactor, nlevels, edgeThreshold, firstLevel,
        //  WTA_K, scoreType, patchSize, fastThreshold)
        let orb = ORB::create(
            MAX_FEATURES,
            1.2,
            8,
            31,
            0,
            2,
            ORB_ScoreType::HARRIS_SCORE,
            31,
            20,
        )?;
        Ok(Self { orb })
    }

    /// Detect keypoints and compute descriptors for one frame.
    pub fn extract(&mut self, frame: &Mat) -> Result<FrameFeatures> {
        // ORB runs on single-channel input; captures arrive as BGR.
        let gray = if frame.channels() > 1 {
            let mut gray = Mat::default();
            imgproc::cvt_color(
                frame,
                &mut gray,
                imgproc::COLOR_BGR2GRAY,
                0,
            )?;
            gray
        } else {
            frame.clone()
        };

        let mut keypoints = Vector::<KeyPoint>::new();
        let mut descriptors = Mat::default();
        self.orb.detect_and_compute(
            &gray,
            &core::no_array(),
            &mut keypoints,
            &mut descriptors,
            false,
        )?;

        Ok(FrameFeatures {
            keypoints,
            descriptors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC1};

    #[test]
    fn flat_frame_has_no_features() {
        let frame =
            Mat::new_rows_cols_with_default(64, 64, CV_8UC1, Scalar::all(128.0)).unwrap();
        let mut extractor = OrbExtractor::new().unwrap();
        let features = extractor.extract(&frame).unwrap();
        assert!(features.is_empty());
        assert_eq!(features.len(), 0);
    }

    #[test]
    fn textured_frame_has_features() {
        // Isolated white blocks on black: their corners are easy prey for
        // the FAST detector inside ORB.
        let mut frame =
            Mat::new_rows_cols_with_default(160, 160, CV_8UC1, Scalar::all(0.0)).unwrap();
        for block_row in 0..3 {
            for block_col in 0..3 {
                let top = 36 + block_row * 36;
                let left = 36 + block_col * 36;
                for row in top..top + 16 {
                    for col in left..left + 16 {
                        *frame.at_2d_mut::<u8>(row, col).unwrap() = 255;
                    }
                }
            }
        }
        let mut extractor = OrbExtractor::new().unwrap();
        let features = extractor.extract(&frame).unwrap();
        assert!(!features.is_empty());
        assert_eq!(features.len(), features.descriptors.rows() as usize);
    }
}
