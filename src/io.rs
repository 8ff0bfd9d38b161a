//! Readers for the SoccerNet MOT sequence layout.
//!
//! A sequence directory looks like:
//! ```text
//! SNMOT-060/
//!   seqinfo.ini
//!   gameinfo.ini
//!   gt/gt.txt
//!   img1/000001.jpg ...
//! ```

use glob::{glob, Pattern};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::categories::resolve_category;
use crate::clip::PixelBox;
use crate::error::{Error, Result};
use crate::types::{FrameFile, GroundTruth, GtRecord, SequenceInfo, Tracklets};

const SEQUENCE_SECTION: &str = "Sequence";

/// A parsed `key=value` ini file.
///
/// Keys are case-insensitive and values are trimmed. Both `=` and `:` are
/// accepted as delimiters, and lines starting with `#` or `;` are comments.
#[derive(Debug)]
pub struct IniFile {
    path: PathBuf,
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniFile {
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(path, &content)
    }

    /// Parse ini `content`; `path` is only used in error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some(section) = current.as_ref() else {
                return Err(ini_error(
                    path,
                    format!("line {}: entry before any section header", index + 1),
                ));
            };
            let Some(delimiter) = line.find(|c: char| c == '=' || c == ':') else {
                return Err(ini_error(
                    path,
                    format!("line {}: expected 'key=value', got '{}'", index + 1, line),
                ));
            };

            let key = line[..delimiter].trim().to_lowercase();
            let value = line[delimiter + 1..].trim().to_string();
            sections.entry(section.clone()).or_default().insert(key, value);
        }

        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        let entries = self
            .sections
            .get(section)
            .ok_or_else(|| ini_error(&self.path, format!("missing section [{}]", section)))?;
        entries
            .get(&key.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| ini_error(&self.path, format!("missing key '{}' in [{}]", key, section)))
    }

    pub fn get_parsed<T>(&self, section: &str, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.get(section, key)?;
        value.parse().map_err(|e| {
            ini_error(
                &self.path,
                format!("value '{}' for '{}' is invalid: {}", value, key, e),
            )
        })
    }
}

fn ini_error(path: &Path, message: String) -> Error {
    Error::Ini {
        path: path.to_path_buf(),
        message,
    }
}

/// Read `seqinfo.ini` of a sequence directory.
pub fn read_sequence_info(sequence_dir: &Path) -> Result<SequenceInfo> {
    let ini = IniFile::open(&sequence_dir.join("seqinfo.ini"))?;
    let seq_length = match ini.get(SEQUENCE_SECTION, "seqLength") {
        Ok(_) => Some(ini.get_parsed(SEQUENCE_SECTION, "seqLength")?),
        Err(_) => None,
    };

    Ok(SequenceInfo {
        name: ini.get(SEQUENCE_SECTION, "name")?.to_string(),
        frame_rate: ini.get_parsed(SEQUENCE_SECTION, "frameRate")?,
        im_dir: ini.get(SEQUENCE_SECTION, "imDir")?.to_string(),
        im_ext: ini.get(SEQUENCE_SECTION, "imExt")?.to_string(),
        width: ini.get_parsed(SEQUENCE_SECTION, "imWidth")?,
        height: ini.get_parsed(SEQUENCE_SECTION, "imHeight")?,
        seq_length,
    })
}

/// Read `gameinfo.ini` and resolve every `trackletID_<i>` into a category.
pub fn read_game_info(sequence_dir: &Path) -> Result<Tracklets> {
    let ini = IniFile::open(&sequence_dir.join("gameinfo.ini"))?;
    tracklets_from_ini(&ini)
}

pub fn tracklets_from_ini(ini: &IniFile) -> Result<Tracklets> {
    let count: u32 = ini.get_parsed(SEQUENCE_SECTION, "num_tracklets")?;
    let mut tracklets = Tracklets::default();
    for id in 1..=count {
        let label = ini.get(SEQUENCE_SECTION, &format!("trackletID_{}", id))?;
        tracklets.categories.insert(id, resolve_category(label)?);
    }
    Ok(tracklets)
}

/// Read a MOT `gt.txt` file.
pub fn read_ground_truth(path: &Path) -> Result<GroundTruth> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    parse_ground_truth(path, BufReader::new(file))
}

/// Parse MOT ground-truth rows `frame,track,x,y,w,h,conf,r1,r2,r3`.
///
/// Coordinates are truncated toward zero. The first non-blank line is taken as
/// a header and skipped when its first field is not numeric.
pub fn parse_ground_truth<R: BufRead>(path: &Path, reader: R) -> Result<GroundTruth> {
    let mut ground_truth = GroundTruth::default();
    let mut seen_content = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let first_line = !seen_content;
        seen_content = true;

        match parse_gt_line(line) {
            Ok(record) => ground_truth.push(record),
            Err(_) if first_line && !starts_with_number(line) => {
                debug!("Skipping header line of {}", path.display());
            }
            Err(message) => {
                return Err(Error::GroundTruth {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message,
                })
            }
        }
    }

    Ok(ground_truth)
}

fn starts_with_number(line: &str) -> bool {
    line.split(',')
        .next()
        .is_some_and(|field| field.trim().parse::<f64>().is_ok())
}

fn parse_gt_line(line: &str) -> std::result::Result<GtRecord, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 6 {
        return Err(format!("expected at least 6 fields, got {}", fields.len()));
    }

    let number = |index: usize, name: &str| -> std::result::Result<f64, String> {
        fields[index]
            .parse::<f64>()
            .map_err(|_| format!("{} '{}' is not a number", name, fields[index]))
    };
    let id = |index: usize, name: &str| -> std::result::Result<u32, String> {
        let value = number(index, name)?;
        if value < 0.0 || value > f64::from(u32::MAX) {
            return Err(format!("{} {} is out of range", name, value));
        }
        Ok(value as u32)
    };

    Ok(GtRecord {
        frame: id(0, "frame")?,
        track: id(1, "track")?,
        bbox: PixelBox::new(
            number(2, "x")?.trunc() as i64,
            number(3, "y")?.trunc() as i64,
            number(4, "w")?.trunc() as i64,
            number(5, "h")?.trunc() as i64,
        ),
    })
}

/// List the sequence directories below `base_dir`, sorted by name.
///
/// A sequence directory is any direct child holding a `seqinfo.ini`.
pub fn list_sequences(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*/seqinfo.ini",
        Pattern::escape(&base_dir.to_string_lossy())
    );
    let mut sequences: Vec<PathBuf> = glob(&pattern)
        .map_err(|e| Error::io(base_dir, std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?
        .filter_map(|entry| match entry {
            Ok(path) => path.parent().map(Path::to_path_buf),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();
    sequences.sort();

    if sequences.is_empty() {
        warn!("No sequences found under {}", base_dir.display());
    }
    Ok(sequences)
}

/// List the frame images of a sequence, sorted by frame number.
pub fn list_frames(frame_dir: &Path, im_ext: &str) -> Result<Vec<FrameFile>> {
    let pattern = format!(
        "{}/*{}",
        Pattern::escape(&frame_dir.to_string_lossy()),
        Pattern::escape(im_ext)
    );
    let paths = glob(&pattern)
        .map_err(|e| Error::io(frame_dir, std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;

    let mut frames = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io(&path, std::io::Error::new(e.error().kind(), e.to_string()))
        })?;
        let number = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(im_ext))
            .and_then(|stem| stem.parse::<u32>().ok())
            .ok_or_else(|| Error::FrameName(path.clone()))?;
        frames.push(FrameFile { number, path });
    }
    frames.sort_by_key(|frame| frame.number);

    Ok(frames)
}
