use thiserror::Error;

use crate::region::ObjectId;

/// Errors that abort a segmentation request.
///
/// Degenerate geometry (a seed on the frame edge, an object that cannot
/// grow) is not an error; it is reported through the region status.
#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("Unknown threshold method '{name}'")]
    UnknownThresholdMethod { name: String },

    #[error("Seed of object {object} at ({x}, {y}) lies outside the {width}x{height} frame")]
    SeedOutOfBounds {
        object: ObjectId,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Seeds of objects {first} and {second} overlap at ({x}, {y})")]
    OverlappingSeeds {
        first: ObjectId,
        second: ObjectId,
        x: usize,
        y: usize,
    },

    #[error("Object {object} is seeded more than once")]
    DuplicateObject { object: ObjectId },

    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Frame has no pixels")]
    EmptyFrame,

    #[error("Frame sequence is empty")]
    EmptySequence,

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, SegmentationError>;
