//! SoccerNet MOT to COCO dataset converter
//!
//! This library converts multi-object-tracking ground truth of soccer broadcasts
//! into COCO detection datasets, optionally tiling full-HD frames into
//! overlapping crops, and describes the YOLOX experiments trained on them.

pub mod categories;
pub mod clip;
pub mod coco;
pub mod coco_dataset;
pub mod config;
pub mod error;
pub mod exp;
pub mod io;
pub mod tiling;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use categories::{resolve_category, Taxonomy};
pub use clip::{clip_to_region, PixelBox};
pub use coco::{CocoFile, CocoWriter, SampleCounter};
pub use coco_dataset::{convert_dataset, convert_split, plan_split, SplitSummary};
pub use config::{Args, ConvertConfig, ExpArgs, Mode};
pub use error::{Error, Result};
pub use exp::Experiment;
pub use tiling::{region_origin_points, Region, Size};
