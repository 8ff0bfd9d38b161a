use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while converting a MOT dataset or resolving an experiment.
///
/// Every variant is fatal to the run; nothing is retried or salvaged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unexpected tracklet name: {0}")]
    UnexpectedTracklet(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid ini file {}: {message}", .path.display())]
    Ini { path: PathBuf, message: String },

    #[error("Invalid ground truth {} (line {line}): {message}", .path.display())]
    GroundTruth {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Track {track} in sequence {sequence} has no tracklet entry in gameinfo.ini")]
    UnknownTrack { sequence: String, track: u32 },

    #[error("Frame file name is not a frame number: {}", .0.display())]
    FrameName(PathBuf),

    #[error("Invalid tiling: {0}")]
    InvalidTiling(String),

    #[error("Frame {} is {actual:?}, expected {expected:?}", .path.display())]
    FrameSize {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Image error on {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn image(path: &Path, source: image::ImageError) -> Self {
        Error::Image {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
