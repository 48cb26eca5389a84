//! Reflectance samples and the vegetation-index disease rule.

use crate::config::{
    GNDVI_HEALTHY, INDEX_EPSILON, NDVI_HEALTHY, VISIBLE_GREEN_MAX, VISIBLE_RED_MIN,
};

/// One multispectral reflectance reading, each band normalized to [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub nir: f32,
}

impl Sample {
    pub const fn new(r: f32, g: f32, b: f32, nir: f32) -> Self {
        Self { r, g, b, nir }
    }

    /// Normalized Difference Vegetation Index: (NIR−R)/(NIR+R+ε).
    pub fn ndvi(&self) -> f32 {
        (self.nir - self.r) / (self.nir + self.r + INDEX_EPSILON)
    }

    /// Green NDVI: (NIR−G)/(NIR+G+ε).
    pub fn gndvi(&self) -> f32 {
        (self.nir - self.g) / (self.nir + self.g + INDEX_EPSILON)
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Disease rule over a single sample. Pure and deterministic.
///
/// Positive when both indices fall below their healthy thresholds, or when
/// the visible-symptom criterion holds (high red with depressed green,
/// i.e. browned tissue) regardless of the indices.
pub fn classify(sample: &Sample) -> bool {
    let index_criterion = sample.ndvi() < NDVI_HEALTHY && sample.gndvi() < GNDVI_HEALTHY;
    let visible_criterion = sample.r > VISIBLE_RED_MIN && sample.g < VISIBLE_GREEN_MAX;
    index_criterion || visible_criterion
}
