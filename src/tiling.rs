//! Fixed-size crop grids over full frames.

use image::{imageops, RgbImage};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A crop rectangle in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// The region covering an entire frame.
    pub fn full(size: Size) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }
}

/// Evenly spaced crop offsets along one axis.
///
/// The first offset is 0 and the last is exactly `dimension - crop`, so the
/// crops always cover the full axis.
pub fn axis_origins(dimension: u32, crop: u32, count: u32) -> Result<Vec<u32>> {
    if count == 0 {
        return Err(Error::InvalidTiling(
            "crop count must be at least 1".to_string(),
        ));
    }
    if crop == 0 || crop > dimension {
        return Err(Error::InvalidTiling(format!(
            "crop size {} does not fit in dimension {}",
            crop, dimension
        )));
    }

    let extent = u64::from(dimension - crop);
    if count == 1 {
        return Ok(vec![0]);
    }
    let intervals = u64::from(count - 1);
    Ok((0..u64::from(count))
        .map(|i| (i * extent / intervals) as u32)
        .collect())
}

/// Compute the `rows * cols` crop regions of a frame.
///
/// Regions are ordered column-major: every row offset of the first column, then
/// the next column. Sample ids are allocated in this order.
pub fn region_origin_points(image_size: Size, crop_size: Size, rows: u32, cols: u32) -> Result<Vec<Region>> {
    let xs = axis_origins(image_size.width, crop_size.width, cols)?;
    let ys = axis_origins(image_size.height, crop_size.height, rows)?;

    Ok(xs
        .iter()
        .flat_map(|&x| {
            ys.iter().map(move |&y| Region {
                x,
                y,
                width: crop_size.width,
                height: crop_size.height,
            })
        })
        .collect())
}

/// Slice the pixels of `region` out of a decoded frame.
pub fn crop_region(frame: &RgbImage, region: &Region) -> RgbImage {
    imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image()
}
