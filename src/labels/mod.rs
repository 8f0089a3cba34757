use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// One YOLO-format label line: class id plus a box in normalized
/// center/size coordinates, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub class_id: i32,
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
}

/// A box converted to pixel space, in corner form. Corners may lie outside
/// the image; use `clamped` before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl YoloBox {
    /// Parse one label line (`class cx cy w h`). Returns `None` for lines
    /// that are not exactly five numbers; callers skip those with a
    /// warning rather than aborting.
    pub fn parse_line(line: &str) -> Option<YoloBox> {
        let fields: Vec<f32> = line
            .split_whitespace()
            .map(|f| f.parse::<f32>())
            .collect::<Result<_, _>>()
            .ok()?;
        if fields.len() != 5 {
            return None;
        }
        Some(YoloBox {
            class_id: fields[0] as i32,
            x_center: fields[1],
            y_center: fields[2],
            width: fields[3],
            height: fields[4],
        })
    }

    /// Box size scaled to pixels and truncated.
    pub fn pixel_size(&self, img_width: i32, img_height: i32) -> (i32, i32) {
        (
            (self.width * img_width as f32) as i32,
            (self.height * img_height as f32) as i32,
        )
    }

    /// Diagonal length of the box in pixels.
    pub fn diagonal(&self, img_width: i32, img_height: i32) -> f64 {
        let (w, h) = self.pixel_size(img_width, img_height);
        (w as f64).hypot(h as f64)
    }

    /// Corner-form pixel box: center and size scaled by the image
    /// dimensions and truncated, corners from half-extents.
    pub fn to_pixels(&self, img_width: i32, img_height: i32) -> PixelBox {
        let cx = (self.x_center * img_width as f32) as i32;
        let cy = (self.y_center * img_height as f32) as i32;
        let (w, h) = self.pixel_size(img_width, img_height);
        PixelBox {
            x1: cx - w / 2,
            y1: cy - h / 2,
            x2: cx + w / 2,
            y2: cy + h / 2,
        }
    }
}

impl PixelBox {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Bounded to the image rectangle.
    pub fn clamped(&self, img_width: i32, img_height: i32) -> PixelBox {
        PixelBox {
            x1: self.x1.max(0),
            y1: self.y1.max(0),
            x2: self.x2.min(img_width),
            y2: self.y2.min(img_height),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Read a label file, one box per line. Unparseable lines are skipped with
/// a warning, matching the tolerant reference behavior.
pub fn load_labels(path: &Path) -> Result<Vec<YoloBox>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("label file not found: {}", path.display()))?;
    let mut boxes = Vec::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match YoloBox::parse_line(line) {
            Some(b) => boxes.push(b),
            None => eprintln!("Skipping invalid label line: {line}"),
        }
    }
    Ok(boxes)
}
