use anyhow::{bail, Context, Result};
use opencv::{
    core::{self, Rect, Size, Vector},
    imgcodecs, imgproc,
    prelude::*,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::labels;

pub struct CropRequest<'a> {
    pub image: &'a Path,
    pub label: &'a Path,
    pub depth_map: &'a Path,
    pub output_folder: &'a Path,
    pub diagonals_file: &'a Path,
    pub depth_file: &'a Path,
}

/// Crop each YOLO-labeled object out of the image, and record per box its
/// diagonal size and the average depth of the cropped region, one line per
/// box in label order.
pub fn crop_objects(req: &CropRequest) -> Result<()> {
    let image = read_image(req.image)?;
    let (img_width, img_height) = (image.cols(), image.rows());

    // Depth arrives at an arbitrary resolution; bring it to image scale.
    let raw_depth = read_image(req.depth_map)?;
    let mut depth_map = Mat::default();
    imgproc::resize(
        &raw_depth,
        &mut depth_map,
        Size::new(img_width, img_height),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let boxes = labels::load_labels(req.label)?;

    fs::create_dir_all(req.output_folder).with_context(|| {
        format!("failed to create output folder {}", req.output_folder.display())
    })?;
    let mut diagonals = File::create(req.diagonals_file)
        .with_context(|| format!("failed to create {}", req.diagonals_file.display()))?;
    let mut depths = File::create(req.depth_file)
        .with_context(|| format!("failed to create {}", req.depth_file.display()))?;

    for (index, tag) in boxes.iter().enumerate() {
        let px = tag.to_pixels(img_width, img_height).clamped(img_width, img_height);
        if px.is_degenerate() {
            eprintln!("Skipping degenerate box {index}");
            continue;
        }
        let rect = Rect::new(px.x1, px.y1, px.width(), px.height());

        let cropped = Mat::roi(&image, rect)?;
        let crop_path = req
            .output_folder
            .join(format!("object_{index}_class_{}.jpg", tag.class_id));
        let crop_str = crop_path
            .to_str()
            .with_context(|| format!("non-UTF-8 path {}", crop_path.display()))?;
        if !imgcodecs::imwrite(crop_str, &cropped, &Vector::new())? {
            bail!("failed to write {}", crop_path.display());
        }

        let diagonal = tag.diagonal(img_width, img_height);
        writeln!(diagonals, "{diagonal:.2}")?;

        let cropped_depth = Mat::roi(&depth_map, rect)?;
        let avg_depth = mean_over_channels(&cropped_depth)?;
        writeln!(depths, "{avg_depth:.2}")?;

        println!(
            "Processed object {index}: diagonal = {diagonal:.2} px, average depth = {avg_depth:.2}"
        );
    }

    Ok(())
}

fn read_image(path: &Path) -> Result<Mat> {
    let path_str = path
        .to_str()
        .with_context(|| format!("non-UTF-8 path {}", path.display()))?;
    let image = imgcodecs::imread(path_str, imgcodecs::IMREAD_UNCHANGED)?;
    if image.empty() {
        bail!("image not found: {}", path.display());
    }
    Ok(image)
}

/// Mean pixel value across every channel of the region, matching a flat
/// array mean over a gray or colorized depth raster.
fn mean_over_channels<M: MatTraitConst + core::ToInputArray>(region: &M) -> Result<f64> {
    let channels = region.channels();
    let per_channel = core::mean(region, &core::no_array())?;
    let sum: f64 = (0..channels as usize).map(|c| per_channel[c]).sum();
    Ok(sum / channels as f64)
}
