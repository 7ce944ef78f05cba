//! Competitive multi-object region growing.
//!
//! Every pass has two phases:
//!
//! 1. **Propose** (parallel over objects): each object inspects the
//!    8-neighbours of its border pixels against the label grid as it stood at
//!    the start of the pass and lists the pixels its [`ClaimRule`] allows.
//!    Nothing is written, so objects cannot see each other's proposals.
//! 2. **Commit** (sequential, by object id): every proposed pixel is tallied.
//!    A pixel proposed by one object joins that object's mask; a pixel
//!    proposed by several becomes [`Label::Terminal`] and is excluded from
//!    every mask. Each object then advances its border.
//!
//! Growth stops after a pass in which no object proposes anything.


mod rules;

use std::collections::BTreeMap;

use common::{is_edge_pixel, neighbors8};
use rayon::prelude::*;

pub use rules::{ClaimRule, DistanceRule, SimpleRule};

use crate::labels::{Label, LabelGrid};
use crate::region::{ObjectId, Region};

/// Summary of one growth run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Passes executed, including the final pass without claims.
    pub passes: usize,
    /// Pixels committed to an object.
    pub claimed: usize,
    /// Pixels marked contested.
    pub contested: usize,
    /// Growth was cut short by the pass limit.
    pub hit_pass_limit: bool,
}

/// Finished regions together with the final ownership grid.
#[derive(Debug, Clone)]
pub struct GrowthOutcome {
    pub regions: BTreeMap<ObjectId, Region>,
    pub labels: LabelGrid,
    pub report: GrowthReport,
}

/// What one object wants to do in a pass.
#[derive(Debug)]
struct Proposal {
    id: ObjectId,
    /// Claimable pixels, ascending, without duplicates.
    claims: Vec<usize>,
    /// Border pixels that stay on the frontier.
    retained: Vec<usize>,
    touched_edge: bool,
}

/// Drives a set of regions to convergence under one claim rule.
pub struct GrowthEngine<R: ClaimRule> {
    rule: R,
    regions: BTreeMap<ObjectId, Region>,
    labels: LabelGrid,
    /// Proposals per pixel in the current pass; zeroed after each commit.
    tally: Vec<u16>,
    max_passes: usize,
    report: GrowthReport,
    finished: bool,
}

impl<R: ClaimRule> GrowthEngine<R> {
    /// `labels` must already hold every region's starting mask.
    /// `max_passes` defaults to the number of pixels.
    pub fn new(
        rule: R,
        regions: BTreeMap<ObjectId, Region>,
        labels: LabelGrid,
        max_passes: Option<usize>,
    ) -> Self {
        debug_assert!(regions.values().all(|r| {
            r.mask().width() == labels.width() && r.mask().height() == labels.height()
        }));
        let pixel_count = labels.len();
        Self {
            rule,
            regions,
            tally: vec![0; pixel_count],
            max_passes: max_passes.unwrap_or(pixel_count).max(1),
            labels,
            report: GrowthReport::default(),
            finished: false,
        }
    }

    #[inline]
    pub fn regions(&self) -> &BTreeMap<ObjectId, Region> {
        &self.regions
    }

    #[inline]
    pub fn labels(&self) -> &LabelGrid {
        &self.labels
    }

    #[inline]
    pub fn report(&self) -> GrowthReport {
        self.report
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run one propose/commit pass. Returns `false` once growth has stalled.
    pub fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }

        let proposals = self.propose();
        let proposed: usize = proposals.iter().map(|p| p.claims.len()).sum();
        let contested = self.commit(proposals);

        self.report.passes += 1;
        self.report.contested += contested;
        tracing::trace!(
            pass = self.report.passes,
            proposed,
            contested,
            "Growth pass"
        );

        if proposed == 0 {
            self.finished = true;
        } else if self.report.passes >= self.max_passes {
            tracing::warn!(
                passes = self.report.passes,
                "Growth stopped at the pass limit"
            );
            self.report.hit_pass_limit = true;
            self.finished = true;
        }
        !self.finished
    }

    /// Grow until every object stalls, then finalize the regions.
    pub fn run(mut self) -> GrowthOutcome {
        while self.step() {}

        for region in self.regions.values_mut() {
            region.finalize();
        }
        // Lost objects give their starting pixels back.
        for label in self.labels.pixels_mut() {
            if let Label::Object(id) = *label {
                if self.regions.get(&id).is_some_and(Region::is_lost) {
                    *label = Label::Background;
                }
            }
        }
        self.report.claimed = self.regions.values().map(|r| r.claimed()).sum();

        tracing::debug!(
            objects = self.regions.len(),
            passes = self.report.passes,
            claimed = self.report.claimed,
            contested = self.report.contested,
            lost = self.regions.values().filter(|r| r.is_lost()).count(),
            "Growth finished"
        );

        GrowthOutcome {
            regions: self.regions,
            labels: self.labels,
            report: self.report,
        }
    }

    fn propose(&self) -> Vec<Proposal> {
        let labels = &self.labels;
        let rule = &self.rule;
        self.regions
            .par_iter()
            .filter(|(_, region)| !region.is_lost())
            .map(|(&id, region)| propose_region(id, region, labels, rule))
            .collect()
    }

    /// Apply proposals in id order. Returns the number of newly contested pixels.
    fn commit(&mut self, proposals: Vec<Proposal>) -> usize {
        for proposal in &proposals {
            for &idx in &proposal.claims {
                self.tally[idx] = self.tally[idx].saturating_add(1);
            }
        }

        let mut contested = 0;
        for proposal in &proposals {
            let Some(region) = self.regions.get_mut(&proposal.id) else {
                continue;
            };
            for &idx in &proposal.claims {
                if self.tally[idx] == 1 {
                    self.labels[idx] = Label::Object(proposal.id);
                    region.commit_pixel(idx);
                } else if self.labels[idx] != Label::Terminal {
                    self.labels[idx] = Label::Terminal;
                    contested += 1;
                }
            }
            for &idx in &proposal.retained {
                region.retain_border_pixel(idx);
            }
            if proposal.touched_edge {
                region.mark_edge();
            }
            region.set_active(!proposal.claims.is_empty());
            region.expand_border();
        }

        for proposal in &proposals {
            for &idx in &proposal.claims {
                self.tally[idx] = 0;
            }
        }
        contested
    }
}

/// Evaluate one object's border against the pass-start label grid.
///
/// A border pixel is retired into the interior once none of its neighbours
/// is background it cannot claim now. Pixels on the outermost ring of the
/// frame are never retired and mark the object as touching the edge.
fn propose_region<R: ClaimRule>(
    id: ObjectId,
    region: &Region,
    labels: &LabelGrid,
    rule: &R,
) -> Proposal {
    let (width, height) = (labels.width(), labels.height());
    let mut claims = Vec::new();
    let mut retained = Vec::new();
    let mut touched_edge = false;

    for &p in region.border() {
        let on_ring = is_edge_pixel(width, height, p % width, p / width, 1);
        touched_edge |= on_ring;

        let mut retire = true;
        for q in neighbors8(width, height, p) {
            if !labels[q].is_background() {
                continue;
            }
            if rule.can_claim(id, q, labels) {
                claims.push(q);
            } else {
                retire = false;
            }
        }
        if !retire || on_ring {
            retained.push(p);
        }
    }

    claims.sort_unstable();
    claims.dedup();
    Proposal {
        id,
        claims,
        retained,
        touched_edge,
    }
}
