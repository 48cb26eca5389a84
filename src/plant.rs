//! Simulated plant and leaf state.
//!
//! Plants are generated once at startup from one of three profiles and
//! live for the process lifetime; treatment and analysis mutate them in
//! place. The sensor data is synthetic, generated from a small
//! deterministic xorshift generator rather than real entropy.

use crate::config::{HEALTHY_SAMPLE, LEAVES_PER_PLANT};
use crate::spectral::{classify, Sample};

/// Generation profile for a plant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// Indices always above the healthy thresholds.
    Healthy,
    /// Browned tissue: the visible criterion fires regardless of indices.
    VisiblyInfected,
    /// Indices below the thresholds but no visible symptom.
    OccultInfected,
}

/// One simulated leaf and its derived state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Leaf {
    pub sample: Sample,
    pub ndvi: f32,
    pub gndvi: f32,
    /// Set at generation time, cleared only by treatment.
    pub visible_infection: bool,
    /// Updated by analysis, reset by treatment.
    pub infected: bool,
}

impl Leaf {
    fn from_sample(sample: Sample, visible_infection: bool) -> Self {
        Self {
            sample,
            ndvi: sample.ndvi(),
            gndvi: sample.gndvi(),
            visible_infection,
            infected: classify(&sample),
        }
    }

    fn healthy() -> Self {
        let (r, g, b, nir) = HEALTHY_SAMPLE;
        Self::from_sample(Sample::new(r, g, b, nir), false)
    }

    /// Diagnose this leaf. A visible symptom short-circuits to positive;
    /// otherwise the index rule decides.
    pub fn diagnose(&self) -> bool {
        if self.visible_infection {
            true
        } else {
            classify(&self.sample)
        }
    }
}

/// One plant: a fixed set of leaves plus aggregate flags.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Plant {
    pub leaves: [Leaf; LEAVES_PER_PLANT],
    /// True when any leaf is visibly infected or an analysis came back
    /// positive.
    pub infected: bool,
    /// One-way latch; only `treat` sets it and nothing clears it.
    pub treated: bool,
}

impl Plant {
    /// Generate a plant under the given profile.
    pub fn generate(profile: Profile, rng: &mut Xorshift) -> Self {
        let mut plant = Self {
            leaves: [Leaf::healthy(); LEAVES_PER_PLANT],
            infected: false,
            treated: false,
        };

        for leaf in plant.leaves.iter_mut() {
            let (sample, visible) = match profile {
                Profile::Healthy => {
                    // Low red, high green/NIR keeps both indices healthy.
                    let r = rng.range(30, 10) as f32 / 100.0;
                    let g = rng.range(60, 10) as f32 / 100.0;
                    let b = rng.range(40, 20) as f32 / 100.0;
                    let nir = rng.range(95, 5) as f32 / 100.0;
                    (Sample::new(r, g, b, nir), false)
                }
                Profile::VisiblyInfected => {
                    let r = rng.range(70, 15) as f32 / 100.0;
                    let g = rng.range(40, 10) as f32 / 100.0;
                    let b = rng.range(30, 10) as f32 / 100.0;
                    let nir = rng.range(60, 10) as f32 / 100.0;
                    (Sample::new(r, g, b, nir), true)
                }
                Profile::OccultInfected => {
                    let r = rng.range(50, 10) as f32 / 100.0;
                    let g = rng.range(55, 10) as f32 / 100.0;
                    let b = rng.range(45, 10) as f32 / 100.0;
                    let nir = rng.range(70, 20) as f32 / 100.0;
                    (Sample::new(r, g, b, nir), false)
                }
            };
            *leaf = Leaf::from_sample(sample, visible);
            if visible {
                plant.infected = true;
            }
        }

        plant
    }

    /// Apply fungicide: every leaf reverts to the canonical healthy sample
    /// and the plant latches as treated.
    pub fn treat(&mut self) {
        for leaf in self.leaves.iter_mut() {
            *leaf = Leaf::healthy();
        }
        self.infected = false;
        self.treated = true;
    }
}

/// Tiny deterministic PRNG for sensor simulation (Marsaglia xorshift32).
pub struct Xorshift {
    state: u32,
}

impl Xorshift {
    /// `seed` must be non-zero; zero is mapped to a fixed constant.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish value in `base..base + span` (percent points).
    fn range(&mut self, base: u32, span: u32) -> u32 {
        base + self.next() % span
    }
}
