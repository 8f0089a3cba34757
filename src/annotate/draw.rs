use anyhow::{bail, Context, Result};
use opencv::{
    core::{Point, Rect, Scalar, Vector},
    imgcodecs, imgproc,
    prelude::*,
};
use std::path::Path;

use crate::labels;

const BOX_THICKNESS: i32 = 2;

/// Draw every YOLO-labeled box onto the image as a green rectangle with
/// its ordinal index above the top-left corner, and save the result.
pub fn draw_boxes(image_path: &Path, label_path: &Path, output_path: &Path) -> Result<()> {
    let image_str = image_path
        .to_str()
        .with_context(|| format!("non-UTF-8 path {}", image_path.display()))?;
    let mut image = imgcodecs::imread(image_str, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        bail!("image not found: {}", image_path.display());
    }
    let (img_width, img_height) = (image.cols(), image.rows());

    let boxes = labels::load_labels(label_path)?;
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);

    for (index, tag) in boxes.iter().enumerate() {
        let px = tag.to_pixels(img_width, img_height);
        let rect = Rect::new(px.x1, px.y1, px.width(), px.height());
        imgproc::rectangle(&mut image, rect, green, BOX_THICKNESS, imgproc::LINE_8, 0)?;
        imgproc::put_text(
            &mut image,
            &index.to_string(),
            Point::new(px.x1, (px.y1 - 10).max(0)),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            green,
            BOX_THICKNESS,
            imgproc::LINE_8,
            false,
        )?;
    }

    let output_str = output_path
        .to_str()
        .with_context(|| format!("non-UTF-8 path {}", output_path.display()))?;
    if !imgcodecs::imwrite(output_str, &image, &Vector::new())? {
        bail!("failed to write {}", output_path.display());
    }
    println!("Image with bounding boxes saved to {}", output_path.display());
    Ok(())
}
