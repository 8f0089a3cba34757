use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::classify::{DEFAULT_CUTOFF, DEFAULT_RATIO};
use crate::core::error::PipelineError;
use crate::core::output::KeyframeWriter;
use crate::core::selector::{KeyframeSelector, Verdict};
use crate::core::similarity::OrbSimilarity;
use crate::decoder::video::FrameSource;

pub struct PipelineConfig {
    /// Confident-match count at or above which a frame is rejected.
    pub cutoff: usize,
    /// Lowe ratio threshold for the classifier.
    pub ratio: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            ratio: DEFAULT_RATIO,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub frames_read: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub saved: usize,
    pub interrupted: bool,
}

/// One pass over the video: pull frames, select keyframes, write them out.
///
/// The source is opened before the output folder is touched, so an
/// unopenable source aborts with no side effects. Zero readable frames is
/// reported as `PipelineError::EmptySource` (the recreated folder stays
/// empty). Ctrl-C stops the pull; the last-seen frame is still flushed.
pub fn run(video: &Path, folder: &Path, config: &PipelineConfig) -> Result<Summary> {
    if config.cutoff == 0 {
        bail!("cutoff must be a positive integer");
    }
    if !(config.ratio > 0.0 && config.ratio < 1.0) {
        bail!("ratio must lie in (0, 1), got {}", config.ratio);
    }

    let mut source = FrameSource::open(video)?;
    println!(
        "Opened {} ({:.2} fps reported)",
        source.path().display(),
        source.fps()
    );

    let writer = KeyframeWriter::create(folder)?;
    let model = OrbSimilarity::new(config.ratio)?;
    let mut selector = KeyframeSelector::new(model, config.cutoff);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to register Ctrl-C handler")?;

    let mut summary = Summary {
        frames_read: 0,
        accepted: 0,
        rejected: 0,
        saved: 0,
        interrupted: false,
    };

    while running.load(Ordering::SeqCst) {
        let Some(frame) = source.read_frame()? else {
            break;
        };
        summary.frames_read += 1;

        match selector.offer(&frame)? {
            Verdict::Accepted { index } => {
                summary.accepted += 1;
                let path = writer.save(index, &frame)?;
                summary.saved += 1;
                println!("New frame saved: {}", path.display());
            }
            Verdict::Rejected { .. } => {
                summary.rejected += 1;
            }
        }
    }
    summary.interrupted = !running.load(Ordering::SeqCst);

    if summary.frames_read == 0 {
        return Err(PipelineError::EmptySource {
            path: video.to_path_buf(),
        }
        .into());
    }

    // End of stream: the last-seen frame goes out unconditionally so the
    // output spans to the end of the video.
    if let Some((index, frame)) = selector.finish() {
        let path = writer.save(index, &frame)?;
        summary.saved += 1;
        println!("New frame saved: {}", path.display());
    }

    Ok(summary)
}
