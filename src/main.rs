mod annotate;
mod core;
mod decoder;
mod labels;
mod stitch;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::annotate::depth::CropRequest;
use crate::core::classify;
use crate::core::error::PipelineError;
use crate::core::pipeline::{self, PipelineConfig};
use crate::stitch::StitchMode;

#[derive(Parser)]
#[command(author, version, about = "Keyframe selection and labeling tools for video capture", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select non-redundant keyframes from a video via ORB feature matching
    Keyframes {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,
        /// Output folder for selected frames (cleared if it exists)
        #[arg(short, long)]
        folder: PathBuf,
        /// Minimum number of confident matches to reject a frame as redundant
        #[arg(short, long, default_value_t = classify::DEFAULT_CUTOFF)]
        cutoff: usize,
        /// Lowe ratio-test threshold, in (0, 1)
        #[arg(short, long, default_value_t = classify::DEFAULT_RATIO)]
        ratio: f32,
        /// Print the run summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Draw YOLO bounding boxes on an image
    DrawBoxes {
        /// Input image
        #[arg(short, long)]
        image: PathBuf,
        /// YOLO label file
        #[arg(short, long)]
        label: PathBuf,
        /// Annotated output image
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Crop YOLO-labeled objects; record diagonals and average depths
    CropObjects {
        /// Input image
        #[arg(short, long)]
        image: PathBuf,
        /// YOLO label file
        #[arg(short, long)]
        label: PathBuf,
        /// Depth raster, resized to the image dimensions
        #[arg(short, long)]
        depth_map: PathBuf,
        /// Folder for cropped objects (created if absent)
        #[arg(short, long)]
        output_folder: PathBuf,
        /// Output file for per-box diagonal sizes
        #[arg(long)]
        diagonals_file: PathBuf,
        /// Output file for per-box average depths
        #[arg(long)]
        depth_file: PathBuf,
    },
    /// Stitch a folder of images into a panorama
    Stitch {
        /// Folder of input images, stitched in sorted filename order
        #[arg(short, long)]
        folder: PathBuf,
        /// Output panorama image
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t = StitchMode::Scans)]
        mode: StitchMode,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Keyframes {
            video,
            folder,
            cutoff,
            ratio,
            json,
        } => {
            let config = PipelineConfig { cutoff, ratio };
            match pipeline::run(&video, &folder, &config) {
                Ok(summary) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    } else {
                        println!("Total frames saved: {}", summary.saved);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                // An empty source is a clean stop, not a crash.
                Err(err) => match err.downcast_ref::<PipelineError>() {
                    Some(PipelineError::EmptySource { .. }) => {
                        eprintln!("Warning: {err}");
                        Ok(ExitCode::SUCCESS)
                    }
                    _ => Err(err),
                },
            }
        }
        Commands::DrawBoxes {
            image,
            label,
            output,
        } => {
            annotate::draw::draw_boxes(&image, &label, &output)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CropObjects {
            image,
            label,
            depth_map,
            output_folder,
            diagonals_file,
            depth_file,
        } => {
            annotate::depth::crop_objects(&CropRequest {
                image: &image,
                label: &label,
                depth_map: &depth_map,
                output_folder: &output_folder,
                diagonals_file: &diagonals_file,
                depth_file: &depth_file,
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stitch {
            folder,
            output,
            mode,
        } => {
            stitch::stitch_folder(&folder, &output, mode)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
