//! Pixel ownership grid shared by all objects of one frame.

use common::Buffer2;

use crate::error::{Result, SegmentationError};
use crate::region::{ObjectId, Region};

/// Ownership of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Label {
    /// Unclaimed territory.
    #[default]
    Background,
    /// Committed to an object's mask.
    Object(ObjectId),
    /// Reached this pass but not yet committed. Only used in scratch grids.
    Intermediate,
    /// Reached by several objects in the same pass; excluded from every mask.
    Terminal,
}

impl Label {
    #[inline]
    pub fn is_background(self) -> bool {
        self == Label::Background
    }
}

pub type LabelGrid = Buffer2<Label>;

/// Label grid holding the starting masks of `regions`.
///
/// Fails if two masks share a pixel.
pub fn label_grid<'a>(
    width: usize,
    height: usize,
    regions: impl IntoIterator<Item = &'a Region>,
) -> Result<LabelGrid> {
    let mut grid = LabelGrid::new_default(width, height);
    for region in regions {
        for idx in region.mask().iter_ones() {
            match grid[idx] {
                Label::Object(first) => {
                    return Err(SegmentationError::OverlappingSeeds {
                        first,
                        second: region.id(),
                        x: idx % width,
                        y: idx / width,
                    });
                }
                _ => grid[idx] = Label::Object(region.id()),
            }
        }
    }
    Ok(grid)
}
