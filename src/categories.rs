//! Tracklet label resolution and the fixed soccer category taxonomy.

use clap::ValueEnum;

use crate::coco::Category;
use crate::error::{Error, Result};

pub const PLAYER: u32 = 1;
pub const GOALKEEPER: u32 = 2;
pub const REFEREE: u32 = 3;
pub const CAST: u32 = 4;
pub const BALL: u32 = 5;

// Checked in order, first match wins
const TRACKLET_KEYWORDS: [(&str, u32); 5] = [
    ("player", PLAYER),
    ("goalkeeper", GOALKEEPER),
    ("referee", REFEREE),
    ("other", CAST),
    ("ball", BALL),
];

/// Map a free-text tracklet label such as `player team left;7` to its category id.
///
/// Labels are matched by case-sensitive substring. A label matching none of the
/// known keywords is an [`Error::UnexpectedTracklet`].
pub fn resolve_category(tracklet_name: &str) -> Result<u32> {
    TRACKLET_KEYWORDS
        .iter()
        .find(|(keyword, _)| tracklet_name.contains(keyword))
        .map(|&(_, id)| id)
        .ok_or_else(|| Error::UnexpectedTracklet(tracklet_name.to_string()))
}

/// Category layout written into the COCO file
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum Taxonomy {
    /// player, goalkeeper, referee, cast, ball
    #[default]
    Full,
    /// person, ball
    Binary,
}

impl Taxonomy {
    /// Translate a full-taxonomy category id into this taxonomy.
    pub fn remap(self, category_id: u32) -> u32 {
        match self {
            Taxonomy::Full => category_id,
            Taxonomy::Binary if category_id == BALL => 2,
            Taxonomy::Binary => 1,
        }
    }

    pub fn categories(self) -> Vec<Category> {
        let entries: &[(u32, &str, &str)] = match self {
            Taxonomy::Full => &[
                (PLAYER, "player", "person"),
                (GOALKEEPER, "goalkeeper", "person"),
                (REFEREE, "referee", "person"),
                (CAST, "cast", "person"),
                (BALL, "ball", "others"),
            ],
            Taxonomy::Binary => &[(1, "person", "person"), (2, "ball", "others")],
        };
        entries
            .iter()
            .map(|&(id, name, supercategory)| Category {
                id,
                name: name.to_string(),
                supercategory: supercategory.to_string(),
            })
            .collect()
    }

    pub fn num_classes(self) -> usize {
        self.categories().len()
    }
}
