use anyhow::{bail, Context, Result};
use opencv::core::Vector;
use opencv::imgcodecs;
use opencv::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Zero-padded keyframe file name, minimum width 5.
pub fn keyframe_file_name(index: usize) -> String {
    format!("{index:05}.png")
}

/// Writes accepted keyframes into a folder that is cleared and recreated
/// on construction. Destructive by contract.
pub struct KeyframeWriter {
    folder: PathBuf,
}

impl KeyframeWriter {
    pub fn create(folder: &Path) -> Result<Self> {
        if folder.is_dir() {
            fs::remove_dir_all(folder)
                .with_context(|| format!("failed to clear output folder {}", folder.display()))?;
        }
        fs::create_dir_all(folder)
            .with_context(|| format!("failed to create output folder {}", folder.display()))?;
        Ok(Self {
            folder: folder.to_path_buf(),
        })
    }

    pub fn save(&self, index: usize, frame: &Mat) -> Result<PathBuf> {
        let path = self.folder.join(keyframe_file_name(index));
        let path_str = path
            .to_str()
            .with_context(|| format!("non-UTF-8 output path {}", path.display()))?;
        let written = imgcodecs::imwrite(path_str, frame, &Vector::new())?;
        if !written {
            bail!("failed to write keyframe {}", path.display());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_zero_padded_to_five_digits() {
        assert_eq!(keyframe_file_name(0), "00000.png");
        assert_eq!(keyframe_file_name(42), "00042.png");
        assert_eq!(keyframe_file_name(123456), "123456.png");
    }
}
