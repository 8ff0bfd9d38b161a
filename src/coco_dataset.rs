//! COCO dataset processing module
//!
//! Converts the sequences of each split into one COCO annotation file plus a flat
//! directory of renamed images. Conversion runs in two phases: a sequential
//! planning pass that allocates ids and clips boxes, and a parallel pass that
//! decodes frames and writes the planned images.

use image::ImageReader;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::clip::clip_to_region;
use crate::coco::{sample_file_name, write_coco_file, CocoFile, CocoWriter, SampleCounter};
use crate::config::{ConvertConfig, Mode};
use crate::error::{Error, Result};
use crate::io::{list_frames, list_sequences, read_game_info, read_ground_truth, read_sequence_info};
use crate::tiling::{crop_region, region_origin_points, Region, Size};
use crate::types::ProcessingStats;
use crate::utils::{create_io_thread_pool, create_output_directory, create_progress_bar, write_jpeg};

/// Struct to hold the paths to the output directories of one split
#[derive(Debug, Clone)]
pub struct CocoOutputDirs {
    pub annotations_dir: PathBuf,
    pub images_dir: PathBuf,
}

/// One image to be written from a source frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedImage {
    /// Crop to cut out of the frame, `None` for the whole frame
    pub region: Option<Region>,
    pub path: PathBuf,
}

/// All images produced from one source frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameJob {
    pub source: PathBuf,
    pub frame_size: Size,
    pub outputs: Vec<PlannedImage>,
}

/// Planned output of a split before any image is written
#[derive(Debug)]
pub struct SplitPlan {
    pub coco: CocoFile,
    pub jobs: Vec<FrameJob>,
    pub stats: ProcessingStats,
}

/// Result of converting one split
#[derive(Debug, Clone)]
pub struct SplitSummary {
    pub split: String,
    pub json_path: PathBuf,
    pub stats: ProcessingStats,
}

/// Set up `<output_dir>/annotations` and `<output_dir>/<split>`
pub fn setup_coco_output_directories(output_dir: &Path, split: &str) -> Result<CocoOutputDirs> {
    let annotations_dir = output_dir.join("annotations");
    fs::create_dir_all(&annotations_dir).map_err(|e| Error::io(&annotations_dir, e))?;
    let images_dir = create_output_directory(&output_dir.join(split))?;

    Ok(CocoOutputDirs {
        annotations_dir,
        images_dir,
    })
}

/// Convert every split named in `config`
pub fn convert_dataset(config: &ConvertConfig) -> Result<Vec<SplitSummary>> {
    config
        .splits
        .iter()
        .map(|split| convert_split(config, split))
        .collect()
}

/// Convert `<data_dir>/<split>` into `instances_<split>.json` and `<output_dir>/<split>/`
pub fn convert_split(config: &ConvertConfig, split: &str) -> Result<SplitSummary> {
    let source_dir = config.data_dir.join(split);
    info!("Converting split '{}' from {}", split, source_dir.display());

    let output_dirs = setup_coco_output_directories(&config.output_dir, split)?;
    let SplitPlan {
        coco,
        jobs,
        mut stats,
    } = plan_split(config, &source_dir, &output_dirs.images_dir)?;

    info!(
        "Writing {} images from {} frames...",
        coco.images.len(),
        jobs.len()
    );
    let pb = create_progress_bar(jobs.len() as u64, split);
    stats.images_written = write_images(config, &jobs, &pb)?;
    pb.finish_with_message(format!("{} images complete", split));

    let json_path = output_dirs
        .annotations_dir
        .join(format!("instances_{}.json", split));
    write_coco_file(&json_path, &coco)?;
    info!("Wrote {}", json_path.display());

    Ok(SplitSummary {
        split: split.to_string(),
        json_path,
        stats,
    })
}

/// Allocate image and annotation ids for every sequence under `source_dir`.
///
/// Sequences are visited in name order and frames in frame-number order, so the
/// plan does not depend on directory enumeration order. No image is decoded here.
pub fn plan_split(config: &ConvertConfig, source_dir: &Path, images_dir: &Path) -> Result<SplitPlan> {
    let mut writer = CocoWriter::new(config.taxonomy);
    let mut counter = SampleCounter::new(config.stride);
    let mut stats = ProcessingStats::default();
    let mut jobs = Vec::new();

    for sequence_dir in list_sequences(source_dir)? {
        let sequence = read_sequence_info(&sequence_dir)?;
        let tracklets = read_game_info(&sequence_dir)?;
        let ground_truth = read_ground_truth(&sequence_dir.join("gt").join("gt.txt"))?;
        let frames = list_frames(&sequence_dir.join(&sequence.im_dir), &sequence.im_ext)?;
        debug!(
            "Sequence {}: {} frames at {} fps, {} tracklets, {} boxes",
            sequence.name,
            frames.len(),
            sequence.frame_rate,
            tracklets.len(),
            ground_truth.len()
        );
        if let Some(expected) = sequence.seq_length {
            if expected as usize != frames.len() {
                warn!(
                    "Sequence {} declares seqLength={} but {} frames were found",
                    sequence.name,
                    expected,
                    frames.len()
                );
            }
        }

        let frame_size = sequence.image_size();
        let regions = match config.mode {
            Mode::Tiled => region_origin_points(frame_size, config.crop_size, config.rows, config.cols)?,
            Mode::Whole => vec![Region::full(frame_size)],
        };

        stats.sequences += 1;
        stats.frames += frames.len();

        for frame in frames {
            let records = ground_truth.frame(frame.number);
            let mut outputs = Vec::new();

            for region in &regions {
                let Some(image_id) = counter.next_sample() else {
                    continue;
                };
                writer.add_image(image_id, region.width, region.height);

                for record in records {
                    let bbox = match config.mode {
                        Mode::Tiled => match clip_to_region(&record.bbox, region) {
                            Some(clipped) => clipped,
                            None => {
                                stats.boxes_outside += 1;
                                continue;
                            }
                        },
                        Mode::Whole => record.bbox,
                    };
                    // tracks are only resolved for boxes that reach the sample
                    let category = tracklets.category(record.track).ok_or_else(|| Error::UnknownTrack {
                        sequence: sequence.name.clone(),
                        track: record.track,
                    })?;
                    if config.drop_degenerate && bbox.is_degenerate() {
                        stats.boxes_degenerate += 1;
                        continue;
                    }

                    writer.add_annotation(config.taxonomy.remap(category), &bbox);
                }

                outputs.push(PlannedImage {
                    region: (config.mode == Mode::Tiled).then_some(*region),
                    path: images_dir.join(sample_file_name(image_id)),
                });
            }

            if !outputs.is_empty() {
                jobs.push(FrameJob {
                    source: frame.path,
                    frame_size,
                    outputs,
                });
            }
        }
    }

    stats.samples_generated = counter.generated();
    stats.annotations = writer.annotation_count();
    info!(
        "Planned {} of {} samples with {} annotations",
        writer.image_count(),
        stats.samples_generated,
        stats.annotations
    );

    Ok(SplitPlan {
        coco: writer.build(),
        jobs,
        stats,
    })
}

/// Write every planned image on the I/O pool; returns the number written
fn write_images(config: &ConvertConfig, jobs: &[FrameJob], pb: &ProgressBar) -> Result<usize> {
    let thread_pool = create_io_thread_pool(config.workers)?;
    thread_pool.install(|| {
        jobs.par_iter()
            .map(|job| -> Result<usize> {
                let written = write_frame_job(config, job)?;
                pb.inc(1);
                Ok(written)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    })
}

fn write_frame_job(config: &ConvertConfig, job: &FrameJob) -> Result<usize> {
    // whole JPEG frames are copied byte for byte
    if config.mode == Mode::Whole && is_jpeg(&job.source) {
        let actual = image::image_dimensions(&job.source).map_err(|e| Error::image(&job.source, e))?;
        check_frame_size(job, actual)?;
        for output in &job.outputs {
            fs::copy(&job.source, &output.path).map_err(|e| Error::io(&output.path, e))?;
        }
        return Ok(job.outputs.len());
    }

    let frame = ImageReader::open(&job.source)
        .map_err(|e| Error::io(&job.source, e))?
        .with_guessed_format()
        .map_err(|e| Error::io(&job.source, e))?
        .decode()
        .map_err(|e| Error::image(&job.source, e))?
        .into_rgb8();

    check_frame_size(job, frame.dimensions())?;

    for output in &job.outputs {
        match &output.region {
            Some(region) => write_jpeg(&output.path, &crop_region(&frame, region), config.jpeg_quality)?,
            None => write_jpeg(&output.path, &frame, config.jpeg_quality)?,
        }
    }
    Ok(job.outputs.len())
}

fn check_frame_size(job: &FrameJob, actual: (u32, u32)) -> Result<()> {
    let expected = (job.frame_size.width, job.frame_size.height);
    if actual != expected {
        return Err(Error::FrameSize {
            path: job.source.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_jpeg() {
        assert!(is_jpeg(Path::new("img1/000001.jpg")));
        assert!(is_jpeg(Path::new("img1/000001.JPEG")));
        assert!(!is_jpeg(Path::new("img1/000001.png")));
        assert!(!is_jpeg(Path::new("img1/000001")));
    }
}
