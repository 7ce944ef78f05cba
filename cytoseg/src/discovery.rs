//! Automatic seeding from unclaimed foreground.
//!
//! Foreground is thresholded, pixels already owned by tracked objects are
//! removed, and every remaining 8-connected component that is large enough
//! and clear of the frame boundary yields one seed.

use common::{BitBuffer2, Buffer2};
use glam::DVec2;

use crate::morphology::{connected_components, Component};

/// Seed positions for objects found in `intensities`, in scan order of
/// their components.
///
/// `claimed` masks out territory of objects that are already tracked.
pub fn discover_seeds(
    intensities: &Buffer2<f32>,
    threshold: u8,
    claimed: Option<&BitBuffer2>,
    min_area: usize,
) -> Vec<(usize, usize)> {
    let mut foreground = BitBuffer2::new_default(intensities.width(), intensities.height());
    let cutoff = threshold as f32;
    for (idx, &v) in intensities.iter().enumerate() {
        if v > cutoff {
            foreground.set(idx, true);
        }
    }
    if let Some(claimed) = claimed {
        foreground.subtract(claimed);
    }

    let components = connected_components(&foreground);
    let total = components.len();
    let seeds: Vec<(usize, usize)> = components
        .iter()
        .filter(|c| !c.touches_edge && c.area() >= min_area)
        .map(|c| component_seed(c, intensities.width()))
        .collect();

    tracing::debug!(
        threshold,
        components = total,
        seeds = seeds.len(),
        min_area,
        "Seed discovery"
    );
    seeds
}

/// The rounded centroid when it falls inside the component, otherwise the
/// member pixel nearest to it.
fn component_seed(component: &Component, width: usize) -> (usize, usize) {
    let c = component.centroid.round();
    let centre = c.y as usize * width + c.x as usize;
    if component.pixels.binary_search(&centre).is_ok() {
        return (c.x as usize, c.y as usize);
    }

    let mut best = component.pixels[0];
    let mut best_d = f64::INFINITY;
    for &idx in &component.pixels {
        let p = DVec2::new((idx % width) as f64, (idx / width) as f64);
        let d = p.distance_squared(component.centroid);
        if d < best_d {
            best = idx;
            best_d = d;
        }
    }
    (best % width, best / width)
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::synthetic::disc_frame;
    use crate::testing::mask_of;

    #[test]
    fn test_discs_yield_one_seed_each() {
        let frame = disc_frame(
            40,
            30,
            &[(DVec2::new(10.0, 10.0), 4.0), (DVec2::new(28.0, 18.0), 5.0)],
            20.0,
            200.0,
        );
        let seeds = discover_seeds(&frame, 100, None, 5);
        assert_eq!(seeds, vec![(10, 10), (28, 18)]);
    }

    #[test]
    fn test_small_and_edge_components_dropped() {
        let mut frame = disc_frame(30, 30, &[(DVec2::new(15.0, 15.0), 4.0)], 0.0, 255.0);
        // Three bright pixels, and a blob on the left boundary
        for (x, y) in [(4, 4), (5, 4), (4, 5), (0, 20), (1, 20), (0, 21), (1, 21)] {
            frame[(x, y)] = 255.0;
        }
        let seeds = discover_seeds(&frame, 100, None, 4);
        assert_eq!(seeds, vec![(15, 15)]);
    }

    #[test]
    fn test_claimed_pixels_excluded() {
        let frame = disc_frame(30, 20, &[(DVec2::new(8.0, 10.0), 3.0)], 0.0, 255.0);
        let claimed = mask_of(
            30,
            20,
            (5..=11).flat_map(|x| (7..=13).map(move |y| (x, y))),
        );
        assert!(discover_seeds(&frame, 100, Some(&claimed), 1).is_empty());
    }

    #[test]
    fn test_hollow_component_seeds_on_member_pixel() {
        // Ring of bright pixels around a dark centre at (5, 5)
        let mut frame = Buffer2::new_filled(11, 11, 0.0f32);
        for y in 3..=7 {
            for x in 3..=7 {
                if x == 3 || x == 7 || y == 3 || y == 7 {
                    frame[(x, y)] = 255.0;
                }
            }
        }
        let seeds = discover_seeds(&frame, 100, None, 1);
        assert_eq!(seeds.len(), 1);
        let (x, y) = seeds[0];
        assert!(frame[(x, y)] > 100.0);
        assert_eq!((x, y), (5, 3));
    }
}
