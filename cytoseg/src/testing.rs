//! Shared helpers for unit tests.

use std::collections::BTreeMap;

use common::BitBuffer2;

use crate::region::{ObjectId, Region, Seed};

/// Install a test-writer subscriber once; `RUST_LOG` overrides the level.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Single-pixel regions keyed by id.
pub fn point_regions(
    width: usize,
    height: usize,
    seeds: &[(u32, usize, usize)],
) -> BTreeMap<ObjectId, Region> {
    seeds
        .iter()
        .map(|&(id, x, y)| {
            let seed = Seed::point(ObjectId(id), x, y);
            (ObjectId(id), Region::from_seed(&seed, width, height).unwrap())
        })
        .collect()
}

/// Panics if any pixel belongs to two masks.
pub fn assert_disjoint<'a>(masks: impl IntoIterator<Item = &'a BitBuffer2>) {
    let mut union: Option<BitBuffer2> = None;
    for mask in masks {
        match &mut union {
            Some(u) => {
                assert!(!u.intersects(mask), "masks overlap");
                u.union_with(mask);
            }
            None => union = Some(mask.clone()),
        }
    }
}

/// Mask with the listed pixels set.
pub fn mask_of(
    width: usize,
    height: usize,
    pixels: impl IntoIterator<Item = (usize, usize)>,
) -> BitBuffer2 {
    let mut mask = BitBuffer2::new_default(width, height);
    for (x, y) in pixels {
        mask.set_xy(x, y, true);
    }
    mask
}
