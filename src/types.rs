use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::clip::PixelBox;
use crate::tiling::Size;

// Metadata of one MOT sequence, from the [Sequence] section of seqinfo.ini
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    pub name: String,
    pub frame_rate: u32,
    pub im_dir: String,
    pub im_ext: String,
    pub width: u32,
    pub height: u32,
    pub seq_length: Option<u32>,
}

impl SequenceInfo {
    pub fn image_size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

// Tracklet id to category id, resolved from gameinfo.ini
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracklets {
    pub categories: BTreeMap<u32, u32>,
}

impl Tracklets {
    pub fn category(&self, track: u32) -> Option<u32> {
        self.categories.get(&track).copied()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// One row of gt/gt.txt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GtRecord {
    pub frame: u32,
    pub track: u32,
    pub bbox: PixelBox,
}

// Ground-truth rows grouped by frame number
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    frames: BTreeMap<u32, Vec<GtRecord>>,
}

impl GroundTruth {
    pub fn push(&mut self, record: GtRecord) {
        self.frames.entry(record.frame).or_default().push(record);
    }

    pub fn frame(&self, frame: u32) -> &[GtRecord] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// A frame image on disk together with its parsed frame number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    pub number: u32,
    pub path: PathBuf,
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub sequences: usize,
    pub frames: usize,
    pub samples_generated: u64,
    pub images_written: usize,
    pub annotations: usize,
    pub boxes_outside: usize,
    pub boxes_degenerate: usize,
}

impl ProcessingStats {
    pub fn print_summary(&self, split: &str) {
        log::info!("=== Summary for split '{}' ===", split);
        log::info!("Sequences: {}", self.sequences);
        log::info!("Frames: {}", self.frames);
        log::info!("Samples generated: {}", self.samples_generated);
        log::info!("Images written: {}", self.images_written);
        log::info!("Annotations written: {}", self.annotations);
        log::info!("Boxes outside their crop: {}", self.boxes_outside);

        if self.boxes_degenerate > 0 {
            log::warn!(
                "Dropped {} zero-area boxes after clipping",
                self.boxes_degenerate
            );
        }
    }
}
