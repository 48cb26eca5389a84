//! Frame builders for the 5×5 WS2812 matrix.
//!
//! Everything here is pure: a [`Frame`] is just 25 RGB triples in chain
//! order, and the embedded side shifts it out through PIO. The chain is
//! wired serpentine, bottom row first.

use crate::config::{LEAVES_PER_PLANT, MATRIX_LEDS};
use crate::plant::Plant;
use crate::spectral::Sample;

/// One LED color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Full matrix frame in chain order.
pub type Frame = [Rgb; MATRIX_LEDS];

const OFF: Rgb = Rgb(0, 0, 0);

// Plant sprite palette. The selected-leaf variants are dim so the cursor
// reads as a different hue rather than a brighter one.
const TRUNK: Rgb = Rgb(5, 0, 0);
const FOLIAGE: Rgb = Rgb(0, 100, 0);
const LEAF_SELECTED: Rgb = Rgb(0, 5, 0);
const LEAF_VISIBLE: Rgb = Rgb(100, 100, 0);
const LEAF_VISIBLE_SELECTED: Rgb = Rgb(5, 5, 0);

/// Sprite of the coffee plant, top row first.
/// 1..=5 are leaf slots, `TRUNK_CODE` the stem, `FOLIAGE_CODE` filler green.
const TRUNK_CODE: u8 = 10;
const FOLIAGE_CODE: u8 = 20;
const PLANT_SPRITE: [[u8; 5]; 5] = [
    [1, 20, 20, 0, 0],
    [10, 0, 20, 0, 0],
    [0, 0, 20, 2, 3],
    [5, 4, 20, 0, 10],
    [10, 0, 20, 0, 0],
];

/// Chain index of logical position (x, y), y = 0 at the bottom.
///
/// Even rows run right-to-left, odd rows left-to-right (serpentine wiring).
pub fn led_index(x: usize, y: usize) -> usize {
    if y % 2 == 0 {
        y * 5 + (4 - x)
    } else {
        y * 5 + x
    }
}

/// Render the plant sprite, highlighting `selected` (0-based leaf index)
/// when given.
pub fn plant_frame(plant: &Plant, selected: Option<usize>) -> Frame {
    let mut frame = [OFF; MATRIX_LEDS];

    for (row, codes) in PLANT_SPRITE.iter().enumerate() {
        for (x, &code) in codes.iter().enumerate() {
            // Sprite rows are listed top-first; the chain counts from the
            // bottom row.
            let idx = led_index(x, 4 - row);
            frame[idx] = match code {
                1..=5 => {
                    let leaf = (code - 1) as usize;
                    let visible = plant.leaves[leaf].visible_infection;
                    match (selected == Some(leaf), visible) {
                        (true, true) => LEAF_VISIBLE_SELECTED,
                        (true, false) => LEAF_SELECTED,
                        (false, true) => LEAF_VISIBLE,
                        (false, false) => FOLIAGE,
                    }
                }
                TRUNK_CODE => TRUNK,
                FOLIAGE_CODE => FOLIAGE,
                _ => OFF,
            };
        }
    }

    frame
}

// Spectrum chart palette: one column per band, NIR doubled to fill the
// grid, drawn in white.
const BAND_COLORS: [Rgb; 5] = [
    Rgb(255, 0, 0),
    Rgb(0, 255, 0),
    Rgb(0, 0, 255),
    Rgb(255, 255, 255),
    Rgb(255, 255, 255),
];

/// Render the calibration bar chart: column height tracks each band's
/// reflectance (R, G, B, NIR, NIR).
pub fn spectrum_frame(sample: &Sample) -> Frame {
    let mut frame = [OFF; MATRIX_LEDS];
    let values = [sample.r, sample.g, sample.b, sample.nir, sample.nir];

    for (x, (&value, &color)) in values.iter().zip(BAND_COLORS.iter()).enumerate() {
        let height = ((value * 6.0) as usize).min(LEAVES_PER_PLANT);
        for y in 0..height {
            frame[led_index(x, y)] = color;
        }
    }

    frame
}
