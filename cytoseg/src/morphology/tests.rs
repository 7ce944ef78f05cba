use common::BitBuffer2;
use glam::DVec2;

use super::*;
use crate::testing::mask_of;

fn block(w: usize, h: usize, x0: usize, y0: usize, bw: usize, bh: usize) -> BitBuffer2 {
    mask_of(
        w,
        h,
        (y0..y0 + bh).flat_map(|y| (x0..x0 + bw).map(move |x| (x, y))),
    )
}

// ============================================================================
// Erosion
// ============================================================================

#[test]
fn test_erode_shrinks_block_by_one() {
    let mask = block(10, 10, 2, 2, 5, 5);
    assert_eq!(erode(&mask), block(10, 10, 3, 3, 3, 3));
}

#[test]
fn test_erode_clears_frame_ring() {
    let mask = BitBuffer2::new_filled(6, 6, true);
    assert_eq!(erode(&mask), block(6, 6, 1, 1, 4, 4));
}

#[test]
fn test_erode_removes_thin_lines() {
    let mask = block(10, 10, 1, 4, 8, 2);
    assert!(erode(&mask).none());
}

#[test]
fn test_erode_n() {
    let mask = block(12, 12, 1, 1, 9, 9);
    assert_eq!(erode_n(&mask, 2), block(12, 12, 3, 3, 5, 5));
    assert!(erode_n(&mask, 5).none());
    assert_eq!(erode_n(&mask, 0), mask);
}

// ============================================================================
// Connected components
// ============================================================================

#[test]
fn test_components_separate_blocks() {
    let mut mask = block(12, 8, 1, 1, 3, 3);
    mask.union_with(&block(12, 8, 6, 2, 4, 2));
    let components = connected_components(&mask);

    assert_eq!(components.len(), 2);
    assert_eq!(components[0].area(), 9);
    assert_eq!(components[0].centroid, DVec2::new(2.0, 2.0));
    assert_eq!(components[1].area(), 8);
    assert_eq!(components[1].centroid, DVec2::new(7.5, 2.5));
    assert!(!components[0].touches_edge);
}

#[test]
fn test_components_diagonal_contact_joins() {
    let mask = mask_of(6, 6, [(1, 1), (2, 2), (3, 3), (4, 2)]);
    let components = connected_components(&mask);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].pixels, vec![7, 14, 16, 21]);
}

#[test]
fn test_components_u_shape_merges() {
    // Two arms joined only by the bottom row
    let mask = mask_of(
        7,
        6,
        [(1, 1), (1, 2), (1, 3), (5, 1), (5, 2), (5, 3), (1, 4), (2, 4), (3, 4), (4, 4), (5, 4)],
    );
    let components = connected_components(&mask);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].area(), 11);
}

#[test]
fn test_components_edge_flag() {
    let mask = mask_of(8, 8, [(0, 3), (0, 4), (4, 4)]);
    let components = connected_components(&mask);
    assert_eq!(components.len(), 2);
    assert!(components[0].touches_edge);
    assert!(!components[1].touches_edge);
}

#[test]
fn test_components_empty_mask() {
    assert!(connected_components(&BitBuffer2::new_default(5, 5)).is_empty());
}
