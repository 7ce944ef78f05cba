//! Multi-object competitive region growing for time-lapse cell microscopy.
//!
//! Every frame, each tracked object grows outward from its seed at the same
//! time as all the others. Pixels reached by several objects in the same
//! pass are contested and belong to nobody, so the resulting masks never
//! overlap. Two claim rules are available: a plain intensity threshold and
//! a texture-weighted geodesic distance competition.
//!
//! [`FrameSequencer`] carries objects from frame to frame by regrowing each
//! one from its eroded mask; [`segmenter::segment_frame`] runs a single
//! frame from explicit seeds.

pub mod config;
pub mod discovery;
pub mod distance_field;
pub mod error;
pub mod frame;
pub mod growth;
pub mod labels;
pub mod morphology;
pub mod preprocess;
pub mod region;
pub mod segmenter;
pub mod sequencer;
pub mod synthetic;
pub mod threshold;

#[cfg(test)]
mod testing;

pub use config::{Config, GrowthPolicy, ReseedMode, ThresholdPolicy};
pub use error::{Result, SegmentationError};
pub use frame::{BitDepth, Frame};
pub use growth::{ClaimRule, DistanceRule, GrowthEngine, GrowthOutcome, GrowthReport, SimpleRule};
pub use labels::{Label, LabelGrid};
pub use region::{ObjectId, Region, Seed};
pub use segmenter::{segment_frame, PreparedFrame};
pub use sequencer::{
    FrameSequencer, ObjectTrack, SeedSource, SegmentedFrame, SequenceResult, SequenceSummary,
    TrackEnd,
};
pub use threshold::{estimate_threshold, ThresholdMethod};
