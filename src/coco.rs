//! COCO format data structures and identifier allocation
//!
//! The writer here produces the `instances_<split>.json` files read by the
//! YOLOX COCO dataset loader.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::categories::Taxonomy;
use crate::clip::PixelBox;
use crate::error::{Error, Result};

/// COCO dataset information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub year: u32,
    pub version: String,
    pub description: String,
    pub contributor: String,
    pub url: String,
    pub date_created: String,
}

impl Default for Info {
    fn default() -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            year: today.year() as u32,
            version: "1.0".to_string(),
            description: "Converted from SoccerNet MOT ground truth".to_string(),
            contributor: "mot2coco".to_string(),
            url: String::new(),
            date_created: today.to_string(),
        }
    }
}

/// COCO license information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: u32,
    pub name: String,
    pub url: String,
}

impl Default for License {
    fn default() -> Self {
        Self {
            id: 1,
            name: "Unknown".to_string(),
            url: String::new(),
        }
    }
}

/// COCO category information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
}

/// COCO image information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub license: u32,
}

impl Image {
    pub fn new(id: u64, file_name: String, width: u32, height: u32) -> Self {
        Self {
            id,
            file_name,
            width,
            height,
            license: 1,
        }
    }
}

/// COCO annotation information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u32,
    pub bbox: [i64; 4], // [x, y, width, height]
    pub area: i64,
    pub iscrowd: u32,
    pub segmentation: Vec<Vec<i64>>,
}

impl Annotation {
    pub fn from_box(id: u64, image_id: u64, category_id: u32, bbox: &PixelBox) -> Self {
        Self {
            id,
            image_id,
            category_id,
            bbox: bbox.to_bbox(),
            area: bbox.area(),
            iscrowd: 0,
            segmentation: vec![bbox.to_polygon()],
        }
    }
}

/// Complete COCO dataset structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoFile {
    pub info: Info,
    pub licenses: Vec<License>,
    pub categories: Vec<Category>,
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
}

/// Output file name of a sample, e.g. `000000000005.jpg`
pub fn sample_file_name(image_id: u64) -> String {
    format!("{:012}.jpg", image_id)
}

/// Counts every generated sample and keeps one in `stride`.
///
/// The counter is 1-based and never reset within a split; a kept sample's
/// counter value becomes its image id.
#[derive(Debug, Clone)]
pub struct SampleCounter {
    generated: u64,
    stride: u64,
}

impl SampleCounter {
    pub fn new(stride: u64) -> Self {
        Self {
            generated: 0,
            stride: stride.max(1),
        }
    }

    /// Register one more sample; returns its image id if it is kept.
    pub fn next_sample(&mut self) -> Option<u64> {
        self.generated += 1;
        (self.generated % self.stride == 0).then_some(self.generated)
    }

    pub fn generated(&self) -> u64 {
        self.generated
    }
}

/// Writer for COCO format datasets
pub struct CocoWriter {
    categories: Vec<Category>,
    images: Vec<Image>,
    annotations: Vec<Annotation>,
    next_annotation_id: u64,
}

impl CocoWriter {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            categories: taxonomy.categories(),
            images: Vec::new(),
            annotations: Vec::new(),
            next_annotation_id: 1,
        }
    }

    /// Add an image to the COCO dataset
    pub fn add_image(&mut self, image_id: u64, width: u32, height: u32) {
        self.images
            .push(Image::new(image_id, sample_file_name(image_id), width, height));
    }

    /// Attach an annotation to the most recently added image
    pub fn add_annotation(&mut self, category_id: u32, bbox: &PixelBox) -> Option<u64> {
        let image_id = self.images.last()?.id;
        let annotation_id = self.next_annotation_id;
        self.next_annotation_id += 1;
        self.annotations
            .push(Annotation::from_box(annotation_id, image_id, category_id, bbox));
        Some(annotation_id)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Build the complete COCO dataset structure
    pub fn build(self) -> CocoFile {
        CocoFile {
            info: Info::default(),
            licenses: vec![License::default()],
            categories: self.categories,
            images: self.images,
            annotations: self.annotations,
        }
    }
}

/// Serialize `coco` to `path` as compact JSON
pub fn write_coco_file(path: &Path, coco: &CocoFile) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, coco)?;
    writer.flush().map_err(|e| Error::io(path, e))
}
