use anyhow::Result;
use opencv::{prelude::*, videoio};
use std::path::{Path, PathBuf};

use crate::core::error::PipelineError;

/// Forward-only frame source over a video container.
///
/// CAP_ANY lets the backend pick the best decoder for the platform.
pub struct FrameSource {
    capture: videoio::VideoCapture,
    path: PathBuf,
    fps: f64,
}

impl FrameSource {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let unavailable = |reason: String| PipelineError::SourceUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let path_str = path
            .to_str()
            .ok_or_else(|| unavailable("non-UTF-8 path".into()))?;
        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .map_err(|e| unavailable(e.to_string()))?;
        if !capture.is_opened().map_err(|e| unavailable(e.to_string()))? {
            return Err(unavailable("backend reports the source as closed".into()));
        }

        let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);

        Ok(Self {
            capture,
            path: path.to_path_buf(),
            fps,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Next decoded frame, or `None` once the stream is exhausted. A grab
    /// that decodes to an empty Mat counts as exhaustion too.
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? {
            return Ok(None);
        }
        if frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}
