use common::BitBuffer2;
use glam::DVec2;

use super::*;
use crate::error::SegmentationError;

fn square_mask(width: usize, height: usize, x0: usize, y0: usize, size: usize) -> BitBuffer2 {
    let mut mask = BitBuffer2::new_default(width, height);
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            mask.set_xy(x, y, true);
        }
    }
    mask
}

#[test]
fn test_point_seed_region() {
    let region = Region::from_seed(&Seed::point(ObjectId(1), 3, 4), 10, 10).unwrap();
    assert_eq!(region.area(), 1);
    assert_eq!(region.border(), &[43]);
    assert!(region.is_active());
    assert!(!region.is_lost());
    assert!(!region.touches_edge());
    assert_eq!(region.claimed(), 0);
}

#[test]
fn test_seed_out_of_bounds() {
    let err = Region::from_seed(&Seed::point(ObjectId(7), 10, 2), 10, 10).unwrap_err();
    assert!(matches!(
        err,
        SegmentationError::SeedOutOfBounds {
            object: ObjectId(7),
            x: 10,
            y: 2,
            ..
        }
    ));
}

#[test]
fn test_mask_seed_border_excludes_interior() {
    let mask = square_mask(10, 10, 2, 2, 3);
    let region = Region::from_seed(&Seed::with_mask(ObjectId(1), 3, 3, mask), 10, 10).unwrap();
    assert_eq!(region.area(), 9);
    // 3x3 block: everything but the centre is on the boundary
    assert_eq!(region.border().len(), 8);
    assert!(!region.border().contains(&33));
}

#[test]
fn test_mask_seed_dimension_mismatch() {
    let mask = square_mask(8, 8, 2, 2, 2);
    let err = Region::from_seed(&Seed::with_mask(ObjectId(1), 2, 2, mask), 10, 10).unwrap_err();
    assert!(matches!(err, SegmentationError::DimensionMismatch { .. }));
}

#[test]
fn test_ring_pixels_are_boundary() {
    let mask = BitBuffer2::new_filled(4, 4, true);
    let boundary = boundary_pixels(&mask);
    // Interior 2x2 has no outside neighbour and is off the ring
    assert_eq!(boundary.len(), 12);
    assert!(!boundary.contains(&5));
}

#[test]
fn test_commit_and_expand_border() {
    let mut region = Region::from_seed(&Seed::point(ObjectId(1), 5, 5), 10, 10).unwrap();
    region.commit_pixel(56);
    region.commit_pixel(54);
    region.retain_border_pixel(55);
    region.expand_border();

    assert_eq!(region.border(), &[54, 55, 56]);
    assert_eq!(region.claimed(), 2);
    assert_eq!(region.area(), 3);
}

#[test]
fn test_finalize_computes_centroid_and_boundary() {
    let mask = square_mask(10, 10, 2, 2, 3);
    let mut region = Region::from_seed(&Seed::with_mask(ObjectId(1), 3, 3, mask), 10, 10).unwrap();
    region.commit_pixel(25);
    region.expand_border();
    region.finalize();

    assert!(!region.is_lost());
    let c = region.centroid().unwrap();
    // 9 pixels centred on (3, 3) plus one at (5, 2)
    assert!((c.x - 32.0 / 10.0).abs() < 1e-12);
    assert!((c.y - 29.0 / 10.0).abs() < 1e-12);
    assert!(region.border().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_finalize_without_claims_is_lost() {
    let mut region = Region::from_seed(&Seed::point(ObjectId(1), 5, 5), 10, 10).unwrap();
    region.finalize();
    assert!(region.is_lost());
    assert!(!region.is_active());
    assert_eq!(region.area(), 0);
    assert!(region.border().is_empty());
    assert!(region.centroid().is_none());
}

#[test]
fn test_lost_region() {
    let region = Region::lost(ObjectId(2), 0, 5, 10, 10);
    assert!(region.is_lost());
    assert!(!region.is_active());
    assert!(region.touches_edge());
    assert_eq!(region.area(), 0);
}

#[test]
fn test_mask_centroid_empty() {
    assert!(mask_centroid(&BitBuffer2::new_default(4, 4)).is_none());
}

#[test]
fn test_pixel_nearest_centroid() {
    let mask = square_mask(10, 10, 2, 2, 3);
    assert_eq!(pixel_nearest_centroid(&mask), Some((3, 3)));
    assert_eq!(mask_centroid(&mask), Some(DVec2::new(3.0, 3.0)));

    // Even-sized block: four pixels tie, first in scan order wins
    let even = square_mask(10, 10, 4, 4, 2);
    assert_eq!(pixel_nearest_centroid(&even), Some((4, 4)));
}

#[test]
fn test_pixel_nearest_centroid_of_ring_shape() {
    // Centroid of a hollow square is its empty centre
    let mut mask = square_mask(10, 10, 2, 2, 3);
    mask.set_xy(3, 3, false);
    assert_eq!(pixel_nearest_centroid(&mask), Some((3, 2)));
}

#[test]
fn test_object_id_display() {
    assert_eq!(ObjectId(12).to_string(), "12");
}
