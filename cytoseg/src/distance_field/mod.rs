//! Texture-weighted distance from each object's seed.
//!
//! Each object floods outward from its starting mask over a private copy of
//! the label grid, accumulating the step cost
//! `((t(p) - t(q))^2 + lambda) / (1 + lambda)` where `t` is the texture image.
//! Pixels at or below the threshold are impassable. The result is used by
//! the distance-field growth policy to give each pixel to the nearest seed.
//!
//! Every border pixel relaxes all of its eligible neighbours in a pass, not
//! only the cheapest one, so the values are exact 8-connected path costs.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use common::{is_edge_pixel, neighbors8, Buffer2};
use rayon::prelude::*;

use crate::labels::{Label, LabelGrid};
use crate::region::{ObjectId, Region};

/// Accumulated path cost from one object's seed. Unreached pixels are `+inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    values: Buffer2<f32>,
}

impl DistanceField {
    #[inline]
    pub fn get(&self, idx: usize) -> f32 {
        self.values[idx]
    }

    #[inline]
    pub fn is_reachable(&self, idx: usize) -> bool {
        self.values[idx].is_finite()
    }

    #[inline]
    pub fn values(&self) -> &Buffer2<f32> {
        &self.values
    }

    pub fn reachable_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}

/// Grey levels, texture and cost parameters the fields are built from.
#[derive(Debug, Clone, Copy)]
pub struct FieldInputs<'a> {
    pub intensities: &'a Buffer2<f32>,
    pub texture: &'a Buffer2<f32>,
    pub threshold: u8,
    pub lambda: f32,
}

impl FieldInputs<'_> {
    /// Cost of stepping from `p` to `q`; infinite when `q` is not foreground.
    #[inline]
    pub fn step_cost(&self, p: usize, q: usize) -> f32 {
        if self.intensities[q] <= self.threshold as f32 {
            return f32::INFINITY;
        }
        let dt = self.texture[p] - self.texture[q];
        (dt * dt + self.lambda) / (1.0 + self.lambda)
    }
}

/// One field per object that is not lost, built in parallel.
///
/// `labels` holds every object's starting mask; other objects' masks are
/// obstacles while flooding.
pub fn build_distance_fields(
    regions: &BTreeMap<ObjectId, Region>,
    labels: &LabelGrid,
    inputs: &FieldInputs<'_>,
) -> BTreeMap<ObjectId, DistanceField> {
    assert!(
        labels.same_shape(inputs.intensities) && labels.same_shape(inputs.texture),
        "label grid, intensities and texture must share dimensions"
    );

    let fields: BTreeMap<ObjectId, DistanceField> = regions
        .par_iter()
        .filter(|(_, region)| !region.is_lost())
        .map(|(&id, region)| (id, build_field(region, labels, inputs)))
        .collect();

    tracing::debug!(
        objects = fields.len(),
        reachable = ?fields.iter().map(|(id, f)| (id.0, f.reachable_count())).collect::<Vec<_>>(),
        "Built distance fields"
    );
    fields
}

fn build_field(region: &Region, labels: &LabelGrid, inputs: &FieldInputs<'_>) -> DistanceField {
    let (width, height) = (labels.width(), labels.height());
    let own = Label::Object(region.id());

    let mut grid = labels.clone();
    let mut dist = Buffer2::new_filled(width, height, f32::INFINITY);
    for idx in region.mask().iter_ones() {
        dist[idx] = 0.0;
    }

    let mut border = region.border().to_vec();
    let mut next_border = Vec::with_capacity(border.len());
    let mut reached = Vec::new();
    let mut passes = 0usize;

    loop {
        passes += 1;
        for &p in &border {
            let mut retire = true;
            for q in neighbors8(width, height, p) {
                match grid[q] {
                    Label::Background | Label::Intermediate => {
                        let cost = inputs.step_cost(p, q);
                        if cost.is_finite() {
                            let candidate = dist[p] + cost;
                            if candidate < dist[q] {
                                dist[q] = candidate;
                            }
                            if grid[q] == Label::Background {
                                grid[q] = Label::Intermediate;
                                reached.push(q);
                            }
                        } else if grid[q] == Label::Background {
                            retire = false;
                        }
                    }
                    label if label == own => {}
                    _ => retire = false,
                }
            }
            if !retire || is_edge_pixel(width, height, p % width, p / width, 1) {
                next_border.push(p);
            }
        }

        if reached.is_empty() {
            break;
        }
        for &q in &reached {
            grid[q] = own;
        }
        next_border.append(&mut reached);
        next_border.sort_unstable();
        next_border.dedup();
        std::mem::swap(&mut border, &mut next_border);
        next_border.clear();
    }

    tracing::trace!(object = %region.id(), passes, "Distance field converged");
    DistanceField { values: dist }
}
