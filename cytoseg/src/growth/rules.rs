//! Claim rules deciding which pixels an object may take in a pass.

use std::collections::BTreeMap;

use common::Buffer2;

use crate::distance_field::DistanceField;
use crate::labels::LabelGrid;
use crate::region::ObjectId;

/// Decides whether an object may claim a pixel.
///
/// Rules only read the label grid as it stood at the start of the pass, so
/// every object can be evaluated independently and in any order.
pub trait ClaimRule: Sync {
    fn can_claim(&self, id: ObjectId, idx: usize, labels: &LabelGrid) -> bool;
}

/// Claim any unlabelled pixel brighter than the threshold.
#[derive(Debug, Clone, Copy)]
pub struct SimpleRule<'a> {
    intensities: &'a Buffer2<f32>,
    threshold: f32,
}

impl<'a> SimpleRule<'a> {
    pub fn new(intensities: &'a Buffer2<f32>, threshold: u8) -> Self {
        Self {
            intensities,
            threshold: threshold as f32,
        }
    }
}

impl ClaimRule for SimpleRule<'_> {
    #[inline]
    fn can_claim(&self, _id: ObjectId, idx: usize, labels: &LabelGrid) -> bool {
        labels[idx].is_background() && self.intensities[idx] > self.threshold
    }
}

/// Claim an unlabelled pixel reachable in this object's field only when no
/// other competing object is as near to it.
///
/// Ties are never resolved, so a pixel equidistant from two seeds stays
/// unclaimed.
#[derive(Debug, Clone, Copy)]
pub struct DistanceRule<'a> {
    fields: &'a BTreeMap<ObjectId, DistanceField>,
}

impl<'a> DistanceRule<'a> {
    pub fn new(fields: &'a BTreeMap<ObjectId, DistanceField>) -> Self {
        Self { fields }
    }
}

impl ClaimRule for DistanceRule<'_> {
    fn can_claim(&self, id: ObjectId, idx: usize, labels: &LabelGrid) -> bool {
        if !labels[idx].is_background() {
            return false;
        }
        let Some(own) = self.fields.get(&id) else {
            return false;
        };
        let d = own.get(idx);
        d.is_finite()
            && self
                .fields
                .iter()
                .filter(|(other, _)| **other != id)
                .all(|(_, field)| d < field.get(idx))
    }
}
