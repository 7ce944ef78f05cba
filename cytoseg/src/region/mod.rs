//! Per-object mask, seed and border bookkeeping.

#[cfg(test)]
mod tests;

use std::fmt;

use common::{is_edge_pixel, neighbors8, BitBuffer2};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentationError};

/// Stable identifier of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Seed
// =============================================================================

/// Starting point of one object's growth in one frame.
///
/// A seed is always anchored at a pixel. Seeds derived from a previous
/// frame also carry the eroded mask the object regrows from.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub id: ObjectId,
    pub x: usize,
    pub y: usize,
    pub mask: Option<BitBuffer2>,
}

impl Seed {
    pub fn point(id: ObjectId, x: usize, y: usize) -> Self {
        Self {
            id,
            x,
            y,
            mask: None,
        }
    }

    /// Seed growing from a whole mask; `(x, y)` must be one of its pixels.
    pub fn with_mask(id: ObjectId, x: usize, y: usize, mask: BitBuffer2) -> Self {
        debug_assert!(mask.get_xy(x, y), "anchor pixel must lie inside the seed mask");
        Self {
            id,
            x,
            y,
            mask: Some(mask),
        }
    }
}

// =============================================================================
// Region
// =============================================================================

/// One object's state while it grows in a single frame.
#[derive(Debug, Clone)]
pub struct Region {
    id: ObjectId,
    seed: (usize, usize),
    mask: BitBuffer2,
    /// Linear indices of the current growth frontier.
    border: Vec<usize>,
    /// Next frontier, filled during a commit phase.
    expanded_border: Vec<usize>,
    active: bool,
    edge: bool,
    lost: bool,
    /// Pixels won during this frame.
    claimed: usize,
    centroid: Option<DVec2>,
}

impl Region {
    /// Build the starting region for `seed` in a `width` x `height` frame.
    pub fn from_seed(seed: &Seed, width: usize, height: usize) -> Result<Self> {
        if seed.x >= width || seed.y >= height {
            return Err(SegmentationError::SeedOutOfBounds {
                object: seed.id,
                x: seed.x,
                y: seed.y,
                width,
                height,
            });
        }

        let mask = match &seed.mask {
            Some(mask) => {
                if mask.width() != width || mask.height() != height {
                    return Err(SegmentationError::DimensionMismatch {
                        expected: (width, height),
                        actual: (mask.width(), mask.height()),
                    });
                }
                let mut mask = mask.clone();
                mask.set_xy(seed.x, seed.y, true);
                mask
            }
            None => {
                let mut mask = BitBuffer2::new_default(width, height);
                mask.set_xy(seed.x, seed.y, true);
                mask
            }
        };

        let border = boundary_pixels(&mask);
        Ok(Self {
            id: seed.id,
            seed: (seed.x, seed.y),
            mask,
            active: !border.is_empty(),
            lost: border.is_empty(),
            border,
            expanded_border: Vec::new(),
            edge: false,
            claimed: 0,
            centroid: None,
        })
    }

    /// A region that takes no part in growth and reports an empty mask.
    pub fn lost(id: ObjectId, x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            id,
            seed: (x, y),
            mask: BitBuffer2::new_default(width, height),
            border: Vec::new(),
            expanded_border: Vec::new(),
            active: false,
            edge: is_edge_pixel(width, height, x, y, 1),
            lost: true,
            claimed: 0,
            centroid: None,
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    pub fn seed(&self) -> (usize, usize) {
        self.seed
    }

    #[inline]
    pub fn mask(&self) -> &BitBuffer2 {
        &self.mask
    }

    #[inline]
    pub fn border(&self) -> &[usize] {
        &self.border
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn touches_edge(&self) -> bool {
        self.edge
    }

    #[inline]
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Pixels won by growth in this frame, excluding the seed mask.
    #[inline]
    pub fn claimed(&self) -> usize {
        self.claimed
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.mask.count_ones()
    }

    /// Mean mask position, available once the region is finalized.
    #[inline]
    pub fn centroid(&self) -> Option<DVec2> {
        self.centroid
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn mark_edge(&mut self) {
        self.edge = true;
    }

    /// Take ownership of a pixel won in the commit phase.
    pub(crate) fn commit_pixel(&mut self, idx: usize) {
        debug_assert!(!self.mask.get(idx));
        self.mask.set(idx, true);
        self.claimed += 1;
        self.expanded_border.push(idx);
    }

    /// Keep a frontier pixel for the next pass.
    pub(crate) fn retain_border_pixel(&mut self, idx: usize) {
        self.expanded_border.push(idx);
    }

    /// Advance the frontier: retired pixels become interior and the
    /// expanded border becomes the border.
    pub(crate) fn expand_border(&mut self) {
        self.expanded_border.sort_unstable();
        self.expanded_border.dedup();
        std::mem::swap(&mut self.border, &mut self.expanded_border);
        self.expanded_border.clear();
    }

    /// Close the frame: decide loss, extract the boundary and compute the centroid.
    ///
    /// A region that won no pixel is lost and reports an empty mask. The
    /// active flag keeps its value from the last pass, so it stays set only
    /// when growth was cut short.
    pub(crate) fn finalize(&mut self) {
        if self.claimed == 0 {
            self.lost = true;
        }
        if self.lost {
            self.active = false;
            self.mask.fill(false);
            self.border.clear();
            self.centroid = None;
            return;
        }
        self.border = boundary_pixels(&self.mask);
        self.centroid = mask_centroid(&self.mask);
    }
}

/// Mask pixels with an in-frame neighbour outside the mask, plus mask
/// pixels on the outermost ring of the frame. Ascending order.
pub fn boundary_pixels(mask: &BitBuffer2) -> Vec<usize> {
    let (width, height) = (mask.width(), mask.height());
    mask.iter_ones()
        .filter(|&idx| {
            is_edge_pixel(width, height, idx % width, idx / width, 1)
                || neighbors8(width, height, idx).any(|n| !mask.get(n))
        })
        .collect()
}

/// Mean `(x, y)` of the set pixels, or `None` for an empty mask.
pub fn mask_centroid(mask: &BitBuffer2) -> Option<DVec2> {
    let width = mask.width();
    let (sum, count) = mask
        .iter_ones()
        .fold((DVec2::ZERO, 0usize), |(sum, count), idx| {
            let p = DVec2::new((idx % width) as f64, (idx / width) as f64);
            (sum + p, count + 1)
        });
    (count > 0).then(|| sum / count as f64)
}

/// The set pixel nearest the mask centroid; ties go to the first in scan order.
pub fn pixel_nearest_centroid(mask: &BitBuffer2) -> Option<(usize, usize)> {
    let centroid = mask_centroid(mask)?;
    let width = mask.width();
    let mut best: Option<(usize, f64)> = None;
    for idx in mask.iter_ones() {
        let p = DVec2::new((idx % width) as f64, (idx / width) as f64);
        let d = p.distance_squared(centroid);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((idx, d)),
        }
    }
    best.map(|(idx, _)| (idx % width, idx / width))
}
