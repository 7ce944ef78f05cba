//! Shared plumbing for the cytoseg workspace: pixel grids, bit masks and
//! logging setup.

pub mod bit_buffer2;
pub mod buffer2;
pub mod log_setup;

pub use bit_buffer2::BitBuffer2;
pub use buffer2::{is_edge_pixel, neighbors8, Buffer2, Neighbors8};
pub use log_setup::{setup_logging, FileOutput, LogSetupError};
