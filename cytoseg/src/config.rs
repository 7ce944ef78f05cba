//! Configuration types for segmentation and tracking.
//!
//! A flat [`Config`] struct grouped by comments into logical sections,
//! plus the policy enums it selects between.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentationError};
use crate::threshold::ThresholdMethod;

// ============================================================================
// Enums
// ============================================================================

/// Rule used to decide which object claims a pixel during growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GrowthPolicy {
    /// Claim any unlabelled pixel brighter than the frame threshold.
    /// Pixels reached by several objects in the same pass become contested.
    #[default]
    Simple,
    /// Claim a pixel only when it is strictly nearer, in the texture-weighted
    /// distance field, to this object's seed than to any other object's.
    DistanceField,
}

/// How the per-frame intensity cutoff is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThresholdPolicy {
    /// Apply a histogram thresholding method to the 8-bit frame.
    Auto { method: ThresholdMethod },
    /// Use the intensity at this percentile (0..=100) of the pixel distribution.
    Percentile { percentile: f64 },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::Auto {
            method: ThresholdMethod::Default,
        }
    }
}

impl ThresholdPolicy {
    /// Automatic policy from a method name such as `"Otsu"` or `"li"`.
    pub fn auto_named(name: &str) -> Result<Self> {
        let method = name
            .parse::<ThresholdMethod>()
            .map_err(|_| SegmentationError::UnknownThresholdMethod {
                name: name.to_string(),
            })?;
        Ok(Self::Auto { method })
    }

    pub fn check(&self) -> Result<()> {
        match self {
            Self::Percentile { percentile } if !(0.0..=100.0).contains(percentile) => {
                Err(SegmentationError::InvalidConfig {
                    reason: format!("percentile must be within 0..=100, got {percentile}"),
                })
            }
            _ => Ok(()),
        }
    }
}

/// How an object's final mask seeds the same object in the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReseedMode {
    /// Erode the mask this many times (3x3) and grow from what is left.
    /// More erosions tolerate faster movement but let the seed drift.
    Eroded { iterations: usize },
    /// Grow from the single mask pixel nearest the centroid.
    SinglePixel,
}

impl Default for ReseedMode {
    fn default() -> Self {
        Self::Eroded { iterations: 2 }
    }
}

// ============================================================================
// Config
// ============================================================================

/// Segmentation and tracking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -- Growth --------------------------------------------------------------
    pub growth_policy: GrowthPolicy,
    /// Regularisation of the texture step cost. Large values make every step
    /// cost the same; small values penalise crossing edges heavily.
    pub lambda: f32,
    /// Hard cap on growth passes per frame. `None` uses width * height.
    pub max_iterations: Option<usize>,

    // -- Thresholding --------------------------------------------------------
    pub threshold: ThresholdPolicy,

    // -- Pre-processing ------------------------------------------------------
    /// Gaussian sigma applied to the frame before growth. 0 disables.
    pub blur_sigma: f32,
    /// Gaussian sigma applied to the edge-response (texture) image.
    pub texture_sigma: f32,

    // -- Tracking ------------------------------------------------------------
    pub reseed: ReseedMode,
    /// Look for objects entering the field in the previous frame's unclaimed foreground.
    pub discover_new_objects: bool,
    /// Seeds within one pixel of the frame boundary start out lost.
    pub discard_edge_seeds: bool,
    /// Pixel size in micrometres.
    pub spatial_resolution: f64,
    /// Smallest area, in square micrometres, of an automatically discovered object.
    pub min_object_area: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            growth_policy: GrowthPolicy::Simple,
            lambda: 100.0,
            max_iterations: None,
            threshold: ThresholdPolicy::default(),
            blur_sigma: 2.0,
            texture_sigma: 1.0,
            reseed: ReseedMode::default(),
            discover_new_objects: true,
            discard_edge_seeds: true,
            spatial_resolution: 0.212,
            min_object_area: 5.0,
        }
    }
}

impl Config {
    /// Defaults with the distance-field growth policy.
    pub fn distance_field() -> Self {
        Self {
            growth_policy: GrowthPolicy::DistanceField,
            ..Self::default()
        }
    }

    /// Load a configuration from YAML. Missing fields take their defaults;
    /// out-of-range values are rejected.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Minimum discovered-object area converted to pixels (at least 1).
    pub fn min_object_area_px(&self) -> usize {
        let px = self.min_object_area / (self.spatial_resolution * self.spatial_resolution);
        (px.round() as usize).max(1)
    }

    /// Report the first invalid value as [`SegmentationError::InvalidConfig`].
    pub fn check(&self) -> Result<()> {
        let invalid = |reason: String| Err(SegmentationError::InvalidConfig { reason });
        if !(self.lambda > 0.0 && self.lambda.is_finite()) {
            return invalid(format!("lambda must be positive and finite, got {}", self.lambda));
        }
        if !(self.blur_sigma >= 0.0 && self.blur_sigma.is_finite()) {
            return invalid(format!("blur_sigma must be non-negative, got {}", self.blur_sigma));
        }
        if !(self.texture_sigma >= 0.0 && self.texture_sigma.is_finite()) {
            return invalid(format!(
                "texture_sigma must be non-negative, got {}",
                self.texture_sigma
            ));
        }
        if !(self.spatial_resolution > 0.0) {
            return invalid(format!(
                "spatial_resolution must be positive, got {}",
                self.spatial_resolution
            ));
        }
        if !(self.min_object_area >= 0.0) {
            return invalid(format!(
                "min_object_area must be non-negative, got {}",
                self.min_object_area
            ));
        }
        // With no erosion a static object cannot claim anything and is reported lost.
        if self.reseed == (ReseedMode::Eroded { iterations: 0 }) {
            return invalid("Eroded reseeding needs at least one iteration".to_string());
        }
        if self.max_iterations == Some(0) {
            return invalid("max_iterations must be positive".to_string());
        }
        self.threshold.check()
    }

    /// Panics on an invalid value. For configurations built in code.
    pub fn validate(&self) {
        if let Err(err) = self.check() {
            panic!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        Config::default().validate();
        Config::distance_field().validate();
    }

    #[test]
    fn test_min_object_area_px() {
        let config = Config::default();
        // 5 um^2 at 0.212 um/px
        assert_eq!(config.min_object_area_px(), 111);

        let tiny = Config {
            min_object_area: 0.0,
            ..Config::default()
        };
        assert_eq!(tiny.min_object_area_px(), 1);
    }

    #[test]
    fn test_auto_named_case_insensitive() {
        let policy = ThresholdPolicy::auto_named("otsu").unwrap();
        assert_eq!(
            policy,
            ThresholdPolicy::Auto {
                method: ThresholdMethod::Otsu
            }
        );
    }

    #[test]
    fn test_auto_named_unknown() {
        let err = ThresholdPolicy::auto_named("Bogus").unwrap_err();
        assert!(matches!(
            err,
            SegmentationError::UnknownThresholdMethod { ref name } if name == "Bogus"
        ));
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = "growth_policy: DistanceField\nlambda: 5.0\nreseed: SinglePixel\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.growth_policy, GrowthPolicy::DistanceField);
        assert_eq!(config.lambda, 5.0);
        assert_eq!(config.reseed, ReseedMode::SinglePixel);
        assert_eq!(config.blur_sigma, Config::default().blur_sigma);
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(Config::from_yaml_str("lambda: [1, 2]").is_err());
    }

    #[test]
    fn test_from_yaml_rejects_out_of_range_values() {
        for yaml in [
            "lambda: -1.0",
            "blur_sigma: -1.0",
            "threshold: !Percentile\n  percentile: 150.0",
            "reseed: !Eroded\n  iterations: 0",
            "max_iterations: 0",
        ] {
            let err = Config::from_yaml_str(yaml).unwrap_err();
            assert!(
                matches!(err, SegmentationError::InvalidConfig { .. }),
                "{yaml}: {err}"
            );
        }
    }

    #[test]
    fn test_check_reports_reason() {
        let config = Config {
            blur_sigma: -2.0,
            ..Config::default()
        };
        let err = config.check().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: blur_sigma must be non-negative, got -2"
        );
    }

    #[test]
    #[should_panic(expected = "lambda must be positive")]
    fn test_validate_rejects_zero_lambda() {
        Config {
            lambda: 0.0,
            ..Config::default()
        }
        .validate();
    }

    #[test]
    #[should_panic(expected = "percentile must be within")]
    fn test_validate_rejects_bad_percentile() {
        Config {
            threshold: ThresholdPolicy::Percentile { percentile: 120.0 },
            ..Config::default()
        }
        .validate();
    }
}
