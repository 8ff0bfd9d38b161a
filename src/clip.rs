//! Clipping ground-truth boxes against crop regions.

use crate::tiling::Region;

/// An integer pixel box in `[left, top, width, height]` form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelBox {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }

    pub fn area(&self) -> i64 {
        self.width * self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn to_bbox(&self) -> [i64; 4] {
        [self.left, self.top, self.width, self.height]
    }

    /// The box outline as a flat COCO polygon: left-top, left-bottom,
    /// right-bottom, right-top.
    pub fn to_polygon(&self) -> Vec<i64> {
        let (l, t, r, b) = (self.left, self.top, self.right(), self.bottom());
        vec![l, t, l, b, r, b, r, t]
    }
}

/// Clip `bbox` to `region` and translate it into region-local coordinates.
///
/// Returns `None` when the box lies entirely outside the region. Boxes that only
/// touch an edge survive with zero width or height.
pub fn clip_to_region(bbox: &PixelBox, region: &Region) -> Option<PixelBox> {
    let (crop_l, crop_t) = (i64::from(region.x), i64::from(region.y));
    let (crop_r, crop_b) = (region.right(), region.bottom());

    if bbox.right() < crop_l || bbox.left > crop_r {
        return None;
    }
    if bbox.bottom() < crop_t || bbox.top > crop_b {
        return None;
    }

    let left = bbox.left.max(crop_l);
    let top = bbox.top.max(crop_t);
    let width = bbox.right().min(crop_r) - left;
    let height = bbox.bottom().min(crop_b) - top;

    Some(PixelBox::new(left - crop_l, top - crop_t, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: u32, y: u32) -> Region {
        Region {
            x,
            y,
            width: 640,
            height: 640,
        }
    }

    #[test]
    fn test_box_outside_is_dropped() {
        let crop = region(1280, 440);
        assert_eq!(clip_to_region(&PixelBox::new(100, 500, 50, 100), &crop), None);
        assert_eq!(clip_to_region(&PixelBox::new(1300, 100, 50, 100), &crop), None);
        assert_eq!(clip_to_region(&PixelBox::new(1300, 1081, 10, 10), &crop), None);
    }

    #[test]
    fn test_box_inside_is_translated_only() {
        let crop = region(1280, 440);
        let clipped = clip_to_region(&PixelBox::new(1300, 500, 50, 100), &crop).unwrap();
        assert_eq!(clipped, PixelBox::new(20, 60, 50, 100));
        assert_eq!(clipped.area(), 5000);
    }

    #[test]
    fn test_box_straddling_edges_is_clipped() {
        let crop = region(0, 146);
        // crosses the top edge and the right edge
        let clipped = clip_to_region(&PixelBox::new(620, 100, 40, 80), &crop).unwrap();
        assert_eq!(clipped, PixelBox::new(620, 0, 20, 34));
        assert_eq!(clipped.area(), 20 * 34);
        assert_eq!(clipped.to_polygon(), vec![620, 0, 620, 34, 640, 34, 640, 0]);
    }

    #[test]
    fn test_touching_edge_is_degenerate_but_kept() {
        let crop = region(1280, 0);
        let clipped = clip_to_region(&PixelBox::new(1260, 10, 20, 20), &crop).unwrap();
        assert_eq!(clipped, PixelBox::new(0, 10, 0, 20));
        assert!(clipped.is_degenerate());
        assert_eq!(clipped.area(), 0);
    }
}
