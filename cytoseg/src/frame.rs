//! Greyscale frames and their 8-bit working representation.

use common::Buffer2;

use crate::error::{Result, SegmentationError};

/// Sample format a frame was acquired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
    Float,
}

/// One greyscale image of a time-lapse sequence.
///
/// Samples are stored as `f32` regardless of the acquisition format.
/// Thresholding and growth run on [`Frame::to_gray8`].
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: Buffer2<f32>,
    bit_depth: BitDepth,
}

impl Frame {
    pub fn from_u8(width: usize, height: usize, data: &[u8]) -> Result<Self> {
        check_dimensions(width, height, data.len())?;
        Ok(Self {
            pixels: Buffer2::new(width, height, data.iter().map(|&v| v as f32).collect()),
            bit_depth: BitDepth::Eight,
        })
    }

    pub fn from_u16(width: usize, height: usize, data: &[u16]) -> Result<Self> {
        check_dimensions(width, height, data.len())?;
        Ok(Self {
            pixels: Buffer2::new(width, height, data.iter().map(|&v| v as f32).collect()),
            bit_depth: BitDepth::Sixteen,
        })
    }

    pub fn from_f32(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        check_dimensions(width, height, data.len())?;
        Ok(Self {
            pixels: Buffer2::new(width, height, data),
            bit_depth: BitDepth::Float,
        })
    }

    /// Wrap samples that are already on the 0..=255 scale.
    pub fn from_gray8(pixels: Buffer2<f32>) -> Result<Self> {
        check_dimensions(pixels.width(), pixels.height(), pixels.len())?;
        Ok(Self {
            pixels,
            bit_depth: BitDepth::Eight,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    #[inline]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    #[inline]
    pub fn pixels(&self) -> &Buffer2<f32> {
        &self.pixels
    }

    /// 8-bit working copy of the frame.
    ///
    /// 8-bit frames are returned unchanged. Other formats are rescaled
    /// linearly so that the frame minimum maps to 0 and the maximum to 255;
    /// a constant frame maps to 0.
    pub fn to_gray8(&self) -> Buffer2<f32> {
        if self.bit_depth == BitDepth::Eight {
            return self.pixels.clone();
        }

        let (min, max) = self
            .pixels
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        if !(range > 0.0) {
            return Buffer2::new_default(self.width(), self.height());
        }

        let scale = 255.0 / range;
        self.pixels
            .map(|&v| ((v - min) * scale).round().clamp(0.0, 255.0))
    }
}

fn check_dimensions(width: usize, height: usize, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SegmentationError::EmptyFrame);
    }
    if len != width * height {
        return Err(SegmentationError::DimensionMismatch {
            expected: (width, height),
            actual: (len, 1),
        });
    }
    Ok(())
}
