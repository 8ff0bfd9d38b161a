use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::categories::Taxonomy;
use crate::tiling::Size;

/// Command-line arguments for converting SoccerNet MOT ground truth to COCO.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory holding one sub-directory of sequences per split
    #[arg(short = 'd', long = "data_dir")]
    pub data_dir: String,

    /// Directory receiving `annotations/` and one image directory per split
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: String,

    /// Splits to convert, each read from `<data_dir>/<split>`
    #[arg(long = "splits", value_delimiter = ',', default_value = "train,test")]
    pub splits: Vec<String>,

    /// Keep one generated sample out of every `stride`
    #[arg(long = "stride", default_value_t = 5, value_parser = validate_stride)]
    pub stride: u64,

    /// Whether to copy whole frames or cut them into crops
    #[arg(long = "mode", value_enum, default_value = "tiled")]
    pub mode: Mode,

    /// Crop width in pixels
    #[arg(long = "crop_width", default_value_t = 640, value_parser = validate_positive)]
    pub crop_width: u32,

    /// Crop height in pixels
    #[arg(long = "crop_height", default_value_t = 640, value_parser = validate_positive)]
    pub crop_height: u32,

    /// Number of crop rows per frame
    #[arg(long = "rows", default_value_t = 4, value_parser = validate_positive)]
    pub rows: u32,

    /// Number of crop columns per frame
    #[arg(long = "cols", default_value_t = 2, value_parser = validate_positive)]
    pub cols: u32,

    /// Category layout of the output dataset
    #[arg(long = "taxonomy", value_enum, default_value = "full")]
    pub taxonomy: Taxonomy,

    /// Drop boxes whose width or height is zero after clipping
    #[arg(long = "drop_degenerate")]
    pub drop_degenerate: bool,

    /// JPEG quality of written images
    #[arg(long = "jpeg_quality", default_value_t = 95, value_parser = validate_quality)]
    pub jpeg_quality: u8,

    /// Number of image worker threads (0 = one per core)
    #[arg(long = "workers", default_value_t = 0)]
    pub workers: usize,
}

// How frames become output samples
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum Mode {
    /// One output image per crop, boxes clipped to the crop
    #[default]
    Tiled,
    /// One output image per frame, boxes unchanged
    Whole,
}

/// Resolved conversion settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub splits: Vec<String>,
    pub stride: u64,
    pub mode: Mode,
    pub crop_size: Size,
    pub rows: u32,
    pub cols: u32,
    pub taxonomy: Taxonomy,
    pub drop_degenerate: bool,
    pub jpeg_quality: u8,
    pub workers: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            splits: vec!["train".to_string(), "test".to_string()],
            stride: 5,
            mode: Mode::Tiled,
            crop_size: Size::new(640, 640),
            rows: 4,
            cols: 2,
            taxonomy: Taxonomy::Full,
            drop_degenerate: false,
            jpeg_quality: 95,
            workers: 0,
        }
    }
}

impl Args {
    pub fn to_convert_config(&self) -> Result<ConvertConfig, String> {
        let splits: Vec<String> = self
            .splits
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if splits.is_empty() {
            return Err("at least one split is required".to_string());
        }

        Ok(ConvertConfig {
            data_dir: PathBuf::from(&self.data_dir),
            output_dir: PathBuf::from(&self.output_dir),
            splits,
            stride: self.stride,
            mode: self.mode,
            crop_size: Size::new(self.crop_width, self.crop_height),
            rows: self.rows,
            cols: self.cols,
            taxonomy: self.taxonomy,
            drop_degenerate: self.drop_degenerate,
            jpeg_quality: self.jpeg_quality,
            workers: self.workers,
        })
    }
}

/// Command-line arguments for printing YOLOX experiment presets.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ExpArgs {
    /// Name of the preset to print as JSON
    #[arg(short = 'n', long = "name", required_unless_present = "list")]
    pub name: Option<String>,

    /// List the available preset names
    #[arg(long = "list")]
    pub list: bool,
}

fn validate_stride(s: &str) -> Result<u64, String> {
    match u64::from_str(s) {
        Ok(val) if val >= 1 => Ok(val),
        _ => Err("STRIDE must be a positive integer".to_string()),
    }
}

fn validate_positive(s: &str) -> Result<u32, String> {
    match u32::from_str(s) {
        Ok(val) if val >= 1 => Ok(val),
        _ => Err("value must be a positive integer".to_string()),
    }
}

fn validate_quality(s: &str) -> Result<u8, String> {
    match u8::from_str(s) {
        Ok(val) if (1..=100).contains(&val) => Ok(val),
        _ => Err("QUALITY must be between 1 and 100".to_string()),
    }
}
