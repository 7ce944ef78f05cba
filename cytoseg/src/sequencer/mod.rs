//! Frame-to-frame tracking.
//!
//! Frames are processed strictly in order. Each object's final mask in
//! frame *t* is shrunk into its seed for frame *t*+1, so an object keeps its
//! id for as long as it can be regrown. Objects entering the field are
//! picked up from the previous frame's foreground that no object owned, and
//! seeded into the current frame.


use std::collections::BTreeMap;

use common::{BitBuffer2, Buffer2};
use glam::DVec2;
use serde::Serialize;

use crate::config::{Config, ReseedMode};
use crate::discovery::discover_seeds;
use crate::error::{Result, SegmentationError};
use crate::frame::Frame;
use crate::growth::GrowthReport;
use crate::labels::LabelGrid;
use crate::morphology::erode_n;
use crate::region::{pixel_nearest_centroid, ObjectId, Region, Seed};
use crate::segmenter::{grow, seed_regions, PreparedFrame};

// ============================================================================
// Public types
// ============================================================================

/// Where the objects of the first frame come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// One object per `(x, y)` point, ids assigned in order from 0.
    Points(Vec<(usize, usize)>),
    /// Discover objects in the first frame's foreground.
    Automatic,
}

/// Result of segmenting one frame of a sequence.
#[derive(Debug, Clone)]
pub struct SegmentedFrame {
    pub index: usize,
    /// Threshold used to gate growth in this frame.
    pub threshold: u8,
    /// Every object seeded in this frame, lost ones included.
    pub regions: BTreeMap<ObjectId, Region>,
    pub labels: LabelGrid,
    pub report: GrowthReport,
}

impl SegmentedFrame {
    /// Objects that were successfully regrown in this frame.
    pub fn present(&self) -> impl Iterator<Item = &Region> {
        self.regions.values().filter(|r| !r.is_lost())
    }
}

/// Why a track stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackEnd {
    /// The object claimed nothing, or its seed was discarded on the frame edge.
    Lost,
    /// Erosion left nothing to seed the next frame with.
    SeedVanished,
}

/// One object's history across the sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectTrack {
    pub id: ObjectId,
    pub start_frame: usize,
    /// First frame the object is no longer present in, and why.
    pub end: Option<(usize, TrackEnd)>,
    /// Centroid per frame the object was present in.
    pub trajectory: Vec<(usize, DVec2)>,
    /// Area in pixels per frame the object was present in.
    pub areas: Vec<(usize, usize)>,
    /// Frames in which the object reached the frame boundary.
    pub edge_frames: Vec<usize>,
}

impl ObjectTrack {
    fn new(id: ObjectId, start_frame: usize) -> Self {
        Self {
            id,
            start_frame,
            end: None,
            trajectory: Vec::new(),
            areas: Vec::new(),
            edge_frames: Vec::new(),
        }
    }

    /// Still tracked after the last frame.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.end.is_none()
    }

    /// Last frame the object was present in.
    pub fn last_frame(&self) -> Option<usize> {
        self.trajectory.last().map(|&(frame, _)| frame)
    }

    /// Distance from first to last centroid, in pixels.
    pub fn displacement(&self) -> f64 {
        match (self.trajectory.first(), self.trajectory.last()) {
            (Some(&(_, a)), Some(&(_, b))) => a.distance(b),
            _ => 0.0,
        }
    }

    fn record(&mut self, frame: usize, region: &Region) {
        if let Some(centroid) = region.centroid() {
            self.trajectory.push((frame, centroid));
        }
        self.areas.push((frame, region.area()));
        if region.touches_edge() {
            self.edge_frames.push(frame);
        }
    }
}

/// Everything produced for a sequence.
#[derive(Debug, Clone)]
pub struct SequenceResult {
    pub frames: Vec<SegmentedFrame>,
    pub tracks: BTreeMap<ObjectId, ObjectTrack>,
}

/// Per-frame statistics without the masks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    pub threshold: u8,
    pub objects: usize,
    pub lost: usize,
    pub passes: usize,
    pub claimed: usize,
    pub contested: usize,
    pub hit_pass_limit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceSummary {
    pub frames: Vec<FrameSummary>,
    pub tracks: Vec<ObjectTrack>,
}

impl SequenceResult {
    pub fn summary(&self) -> SequenceSummary {
        let frames = self
            .frames
            .iter()
            .map(|f| FrameSummary {
                index: f.index,
                threshold: f.threshold,
                objects: f.present().count(),
                lost: f.regions.len() - f.present().count(),
                passes: f.report.passes,
                claimed: f.report.claimed,
                contested: f.report.contested,
                hit_pass_limit: f.report.hit_pass_limit,
            })
            .collect();
        SequenceSummary {
            frames,
            tracks: self.tracks.values().cloned().collect(),
        }
    }
}

// ============================================================================
// Sequencer
// ============================================================================

/// Segments and tracks objects through a frame sequence.
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    config: Config,
}

impl FrameSequencer {
    /// Panics if `config` fails validation.
    pub fn new(config: Config) -> Self {
        config.validate();
        Self { config }
    }

    /// Like [`FrameSequencer::new`], but reports an invalid configuration.
    pub fn try_new(config: Config) -> Result<Self> {
        config.check()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Segment every frame in order.
    pub fn run(&self, frames: &[Frame], source: &SeedSource) -> Result<SequenceResult> {
        let first = frames.first().ok_or(SegmentationError::EmptySequence)?;
        let (width, height) = (first.width(), first.height());
        let min_area = self.config.min_object_area_px();

        tracing::info!(
            frames = frames.len(),
            width,
            height,
            policy = ?self.config.growth_policy,
            "Segmenting sequence"
        );

        let mut tracks: BTreeMap<ObjectId, ObjectTrack> = BTreeMap::new();
        let mut segmented = Vec::with_capacity(frames.len());
        let mut carried: Vec<Seed> = Vec::new();
        let mut previous: Option<PreviousFrame> = None;
        let mut next_id = 0u32;

        for (index, frame) in frames.iter().enumerate() {
            if frame.width() != width || frame.height() != height {
                return Err(SegmentationError::DimensionMismatch {
                    expected: (width, height),
                    actual: (frame.width(), frame.height()),
                });
            }

            let prepared = PreparedFrame::new(frame, &self.config);

            let new_points = match &previous {
                None => match source {
                    SeedSource::Points(points) => points.clone(),
                    SeedSource::Automatic => {
                        discover_seeds(&prepared.blurred, prepared.threshold, None, min_area)
                    }
                },
                Some(prev) if self.config.discover_new_objects => discover_seeds(
                    &prev.blurred,
                    prev.threshold,
                    Some(&prev.claimed),
                    min_area,
                ),
                Some(_) => Vec::new(),
            };

            let mut seeds = std::mem::take(&mut carried);
            for (x, y) in new_points {
                let id = ObjectId(next_id);
                next_id += 1;
                tracing::debug!(object = %id, x, y, frame = index, "New object");
                seeds.push(Seed::point(id, x, y));
                tracks.insert(id, ObjectTrack::new(id, index));
            }

            let regions = seed_regions(&seeds, width, height, self.config.discard_edge_seeds)?;
            let outcome = grow(&prepared, regions, &self.config)?;
            let has_next = index + 1 < frames.len();

            let mut claimed = BitBuffer2::new_default(width, height);
            for region in outcome.regions.values() {
                let Some(track) = tracks.get_mut(&region.id()) else {
                    continue;
                };
                if region.is_lost() {
                    tracing::warn!(object = %region.id(), frame = index, "Object lost");
                    track.end = Some((index, TrackEnd::Lost));
                    continue;
                }

                track.record(index, region);
                claimed.union_with(region.mask());

                if !has_next {
                    continue;
                }
                match next_seed(region, self.config.reseed) {
                    Some(seed) => carried.push(seed),
                    None => {
                        tracing::warn!(
                            object = %region.id(),
                            frame = index,
                            area = region.area(),
                            "Object too small to reseed"
                        );
                        track.end = Some((index + 1, TrackEnd::SeedVanished));
                    }
                }
            }

            tracing::debug!(
                frame = index,
                threshold = prepared.threshold,
                objects = outcome.regions.len(),
                passes = outcome.report.passes,
                contested = outcome.report.contested,
                "Frame segmented"
            );

            let threshold = prepared.threshold;
            previous = Some(PreviousFrame {
                blurred: prepared.blurred,
                threshold,
                claimed,
            });
            segmented.push(SegmentedFrame {
                index,
                threshold,
                regions: outcome.regions,
                labels: outcome.labels,
                report: outcome.report,
            });
        }

        let alive = tracks.values().filter(|t| t.is_alive()).count();
        tracing::info!(
            frames = segmented.len(),
            tracks = tracks.len(),
            alive,
            "Sequence segmented"
        );

        Ok(SequenceResult {
            frames: segmented,
            tracks,
        })
    }
}

/// What discovery needs from the frame before the current one.
///
/// New objects come from the previous frame's own image, in foreground no
/// object owned there.
struct PreviousFrame {
    blurred: Buffer2<f32>,
    threshold: u8,
    /// Union of all object masks.
    claimed: BitBuffer2,
}

/// Seed for the same object in the next frame, or `None` when nothing of
/// the mask survives.
pub fn next_seed(region: &Region, mode: ReseedMode) -> Option<Seed> {
    match mode {
        ReseedMode::Eroded { iterations } => {
            let eroded = erode_n(region.mask(), iterations);
            let (x, y) = pixel_nearest_centroid(&eroded)?;
            Some(Seed::with_mask(region.id(), x, y, eroded))
        }
        ReseedMode::SinglePixel => {
            let (x, y) = pixel_nearest_centroid(region.mask())?;
            Some(Seed::point(region.id(), x, y))
        }
    }
}
