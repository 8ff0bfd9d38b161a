use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Create an output directory, deleting it first if it already exists
pub fn create_output_directory(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        log::warn!(
            "Directory {:?} already exists. Deleting and recreating it.",
            path
        );
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Build the pool used for image decoding and encoding.
///
/// `workers == 0` lets rayon pick the thread count.
pub fn create_io_thread_pool(workers: usize) -> Result<rayon::ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("mot2coco-io-{}", index))
        .build()?)
}

/// Encode `image` as a JPEG file at `path`
pub fn write_jpeg(path: &Path, image: &RgbImage, quality: u8) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(image)
        .map_err(|e| Error::image(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))
}
