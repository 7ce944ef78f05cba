use std::collections::BTreeMap;

use common::Buffer2;

use super::*;
use crate::labels::label_grid;
use crate::region::{ObjectId, Region, Seed};

fn regions_at(
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

fn build(
    regions: &BTreeMap<ObjectId, Region>,
    intensities: &Buffer2<f32>,
    texture: &Buffer2<f32>,
    lambda: f32,
) -> BTreeMap<ObjectId, DistanceField> {
    let labels = label_grid(intensities.width(), intensities.height(), regions.values()).unwrap();
    let inputs = FieldInputs {
        intensities,
        texture,
        threshold: 100,
        lambda,
    };
    build_distance_fields(regions, &labels, &inputs)
}

#[test]
fn test_uniform_field_is_chebyshev_distance() {
    let intensities = Buffer2::new_filled(10, 10, 200.0f32);
    let texture = Buffer2::new_filled(10, 10, 0.0f32);
    let regions = regions_at(10, 10, &[(1, 0, 0)]);
    let fields = build(&regions, &intensities, &texture, 100.0);

    let field = &fields[&ObjectId(1)];
    let step = 100.0f32 / 101.0;
    for y in 0..10 {
        for x in 0..10 {
            let expected = x.max(y) as f32 * step;
            let got = field.get(y * 10 + x);
            assert!((got - expected).abs() < 1e-4, "({x}, {y}): {got} vs {expected}");
        }
    }
    assert_eq!(field.reachable_count(), 100);
}

#[test]
fn test_rival_seed_is_an_obstacle() {
    let intensities = Buffer2::new_filled(10, 10, 200.0f32);
    let texture = Buffer2::new_filled(10, 10, 0.0f32);
    let regions = regions_at(10, 10, &[(1, 0, 0), (2, 9, 9)]);
    let fields = build(&regions, &intensities, &texture, 100.0);

    assert!(!fields[&ObjectId(1)].is_reachable(99));
    assert!(!fields[&ObjectId(2)].is_reachable(0));
    assert_eq!(fields[&ObjectId(1)].reachable_count(), 99);
    // Symmetric fields tie on the anti-diagonal
    assert_eq!(fields[&ObjectId(1)].get(9), fields[&ObjectId(2)].get(9));
}

#[test]
fn test_dark_pixels_block_the_flood() {
    let intensities = Buffer2::from_fn(10, 10, |x, _| if x == 5 { 20.0 } else { 200.0 });
    let texture = Buffer2::new_filled(10, 10, 0.0f32);
    let regions = regions_at(10, 10, &[(1, 2, 4)]);
    let fields = build(&regions, &intensities, &texture, 1.0);

    let field = &fields[&ObjectId(1)];
    for y in 0..10 {
        assert!(field.is_reachable(y * 10 + 4));
        assert!(!field.is_reachable(y * 10 + 5));
        assert!(!field.is_reachable(y * 10 + 8));
    }
    assert_eq!(field.reachable_count(), 50);
}

#[test]
fn test_texture_edge_raises_cost() {
    let intensities = Buffer2::new_filled(10, 1, 200.0f32);
    let texture = Buffer2::from_fn(10, 1, |x, _| if x < 5 { 0.0 } else { 10.0 });
    let regions = regions_at(10, 1, &[(1, 0, 0)]);
    let fields = build(&regions, &intensities, &texture, 1.0);

    let field = &fields[&ObjectId(1)];
    // Flat steps cost lambda / (1 + lambda) = 0.5
    assert_eq!(field.get(4), 2.0);
    // (10^2 + 1) / 2 for the step across the edge
    assert_eq!(field.get(5), 52.5);
    assert_eq!(field.get(9), 54.5);
}

#[test]
fn test_lost_regions_get_no_field() {
    let intensities = Buffer2::new_filled(6, 6, 200.0f32);
    let texture = Buffer2::new_filled(6, 6, 0.0f32);
    let mut regions = regions_at(6, 6, &[(1, 2, 2)]);
    regions.insert(ObjectId(2), Region::lost(ObjectId(2), 0, 0, 6, 6));
    let fields = build(&regions, &intensities, &texture, 100.0);

    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key(&ObjectId(1)));
}

#[test]
fn test_step_cost() {
    let intensities = Buffer2::new(3, 1, vec![200.0, 200.0, 100.0]);
    let texture = Buffer2::new(3, 1, vec![0.0, 3.0, 0.0]);
    let inputs = FieldInputs {
        intensities: &intensities,
        texture: &texture,
        threshold: 100,
        lambda: 1.0,
    };
    assert_eq!(inputs.step_cost(0, 1), 5.0);
    assert_eq!(inputs.step_cost(1, 0), 5.0);
    assert!(inputs.step_cost(1, 2).is_infinite());
}
