//! Single-frame segmentation: prepare the frame, seed the regions and grow
//! them under the configured policy.

use std::collections::BTreeMap;

use common::{is_edge_pixel, Buffer2};

use crate::config::{Config, GrowthPolicy};
use crate::distance_field::{build_distance_fields, FieldInputs};
use crate::error::{Result, SegmentationError};
use crate::frame::Frame;
use crate::growth::{DistanceRule, GrowthEngine, GrowthOutcome, SimpleRule};
use crate::labels::label_grid;
use crate::preprocess::{gaussian_blur, texture};
use crate::region::{ObjectId, Region, Seed};
use crate::threshold::estimate_threshold;

/// A frame reduced to what growth works on.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    /// 8-bit working copy; the threshold is estimated on it.
    pub gray: Buffer2<f32>,
    /// `gray` smoothed with the configured blur; growth reads this.
    pub blurred: Buffer2<f32>,
    pub threshold: u8,
}

impl PreparedFrame {
    pub fn new(frame: &Frame, config: &Config) -> Self {
        let gray = frame.to_gray8();
        let threshold = estimate_threshold(&gray, &config.threshold);
        let blurred = gaussian_blur(&gray, config.blur_sigma);
        Self {
            gray,
            blurred,
            threshold,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.gray.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.gray.height()
    }
}

/// Starting regions for `seeds`.
///
/// With `discard_edge_seeds`, seeds on the outermost pixel ring start out
/// lost. Fails on out-of-frame seeds and on ids used twice.
pub fn seed_regions(
    seeds: &[Seed],
    width: usize,
    height: usize,
    discard_edge_seeds: bool,
) -> Result<BTreeMap<ObjectId, Region>> {
    let mut regions = BTreeMap::new();
    for seed in seeds {
        let region = if discard_edge_seeds
            && seed.x < width
            && seed.y < height
            && is_edge_pixel(width, height, seed.x, seed.y, 1)
        {
            tracing::debug!(
                object = %seed.id,
                x = seed.x,
                y = seed.y,
                "Seed on frame edge discarded"
            );
            Region::lost(seed.id, seed.x, seed.y, width, height)
        } else {
            Region::from_seed(seed, width, height)?
        };
        if regions.insert(seed.id, region).is_some() {
            return Err(SegmentationError::DuplicateObject { object: seed.id });
        }
    }
    Ok(regions)
}

/// Grow `regions` to convergence on a prepared frame.
pub fn grow(
    prepared: &PreparedFrame,
    regions: BTreeMap<ObjectId, Region>,
    config: &Config,
) -> Result<GrowthOutcome> {
    let (width, height) = (prepared.width(), prepared.height());
    let labels = label_grid(width, height, regions.values())?;

    let outcome = match config.growth_policy {
        GrowthPolicy::Simple => {
            let rule = SimpleRule::new(&prepared.blurred, prepared.threshold);
            GrowthEngine::new(rule, regions, labels, config.max_iterations).run()
        }
        GrowthPolicy::DistanceField => {
            let texture = texture(&prepared.blurred, config.texture_sigma);
            let inputs = FieldInputs {
                intensities: &prepared.blurred,
                texture: &texture,
                threshold: prepared.threshold,
                lambda: config.lambda,
            };
            let fields = build_distance_fields(&regions, &labels, &inputs);
            GrowthEngine::new(DistanceRule::new(&fields), regions, labels, config.max_iterations)
                .run()
        }
    };
    Ok(outcome)
}

/// Segment one frame from explicit seeds.
///
/// The result depends only on the frame, the seeds and the configuration.
pub fn segment_frame(frame: &Frame, seeds: &[Seed], config: &Config) -> Result<GrowthOutcome> {
    config.check()?;
    let prepared = PreparedFrame::new(frame, config);
    let regions = seed_regions(
        seeds,
        prepared.width(),
        prepared.height(),
        config.discard_edge_seeds,
    )?;
    grow(&prepared, regions, config)
}
