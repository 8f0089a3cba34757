use anyhow::{bail, Context, Result};
use opencv::{
    core::Vector,
    imgcodecs,
    prelude::*,
    stitching::{Stitcher, Stitcher_Mode, Stitcher_Status},
};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const PANO_CONFIDENCE_THRESH: f64 = 0.7;

#[derive(Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum StitchMode {
    /// Wide-angle scenes with rotation about the camera.
    Panorama,
    /// Flat translated content (scanned documents, overhead sweeps).
    Scans,
}

/// Stitch every readable image in the folder (sorted filename order) into
/// one panorama and save it.
pub fn stitch_folder(folder: &Path, output: &Path, mode: StitchMode) -> Result<()> {
    let images = load_images(folder)?;
    if images.is_empty() {
        bail!("no readable images in {}", folder.display());
    }
    println!("Stitching {} images...", images.len());

    let mode = match mode {
        StitchMode::Panorama => Stitcher_Mode::PANORAMA,
        StitchMode::Scans => Stitcher_Mode::SCANS,
    };
    let mut stitcher = Stitcher::create(mode)?;
    stitcher.set_pano_confidence_thresh(PANO_CONFIDENCE_THRESH)?;

    let mut panorama = Mat::default();
    let status = stitcher.stitch(&images, &mut panorama)?;
    if status != Stitcher_Status::OK {
        bail!("stitching failed with status {:?}", status);
    }

    let output_str = output
        .to_str()
        .with_context(|| format!("non-UTF-8 path {}", output.display()))?;
    if !imgcodecs::imwrite(output_str, &panorama, &Vector::new())? {
        bail!("failed to write {}", output.display());
    }
    println!("Panorama saved to {}", output.display());
    Ok(())
}

/// Decode every image in the folder in parallel, keeping sorted filename
/// order. Unreadable files are skipped.
fn load_images(folder: &Path) -> Result<Vector<Mat>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(folder)
        .with_context(|| format!("cannot read folder {}", folder.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let decoded: Vec<Option<Mat>> = paths
        .par_iter()
        .map(|path| {
            let path_str = path.to_str()?;
            let image = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR).ok()?;
            if image.empty() {
                None
            } else {
                Some(image)
            }
        })
        .collect();

    let mut images = Vector::<Mat>::new();
    for image in decoded.into_iter().flatten() {
        images.push(image);
    }
    Ok(images)
}
