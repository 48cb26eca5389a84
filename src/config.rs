//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and classification
//! thresholds live here so they can be tuned in one place.

// Simulation

/// Number of plants in the field.
pub const NUM_PLANTS: usize = 5;

/// Leaves per plant (also the side length of the LED matrix).
pub const LEAVES_PER_PLANT: usize = 5;

/// Cost added per fungicide treatment.
pub const TREATMENT_COST: u32 = 10;

// Classification

/// NDVI at or above this value reads as healthy vegetation.
pub const NDVI_HEALTHY: f32 = 0.4;

/// GNDVI at or above this value reads as healthy vegetation.
pub const GNDVI_HEALTHY: f32 = 0.35;

/// Additive epsilon in index denominators, avoids division by zero.
pub const INDEX_EPSILON: f32 = 0.001;

/// Red reflectance above this reads as visibly browned tissue.
pub const VISIBLE_RED_MIN: f32 = 0.65;

/// Green reflectance below this supports the visible-browning criterion.
pub const VISIBLE_GREEN_MAX: f32 = 0.55;

/// Reflectance a treated leaf is reset to: (R, G, B, NIR).
pub const HEALTHY_SAMPLE: (f32, f32, f32, f32) = (0.40, 0.70, 0.50, 0.95);

// Input

/// Minimum interval between accepted button edges (microseconds).
pub const DEBOUNCE_US: u32 = 200_000;

/// Full scale of the joystick ADC.
pub const ADC_MAX: u16 = 4095;

/// ADC reading with the stick at rest.
pub const ADC_CENTER: u16 = 2047;

/// Half-width of the neutral window around [`ADC_CENTER`].
pub const ADC_DEADZONE: u16 = 250;

// UI timing

/// Period of the cooperative main loop (ms).
pub const LOOP_PERIOD_MS: u64 = 100;

/// Footer hint rotation interval; also the forced-redraw interval (ms).
pub const MESSAGE_ROTATE_MS: u32 = 3000;

/// Duration of the analysis progress animation (ms).
pub const ANALYSIS_ANIMATION_MS: u32 = 500;

/// Frames in the analysis progress animation.
pub const ANALYSIS_ANIMATION_STEPS: u32 = 50;

/// Delay between treatment progress dots (ms).
pub const TREATMENT_STEP_MS: u32 = 250;

/// How long the "already treated" notice is held on screen (ms).
pub const NOTICE_HOLD_MS: u32 = 1000;

/// Poll interval while waiting for ButtonA on a result screen (ms).
pub const RESULT_POLL_MS: u32 = 10;

// GPIO pin assignments (BitDogLab / RP2040)
//
// These are logical names; actual `embassy_rp::peripherals::*` types are
// selected in `main.rs`.
//
//   Button A        → GP5
//   Button B        → GP6
//   Joystick button → GP22
//   Joystick X      → GP27 (ADC1)
//   Joystick Y      → GP26 (ADC0)
//   Buzzer (PWM)    → GP21
//   WS2812 matrix   → GP7
//   Status LED R    → GP13
//   Status LED G    → GP11
//   Status LED B    → GP12
//   I²C SDA         → GP14
//   I²C SCL         → GP15

/// I²C bus frequency for the SSD1306 display (Hz).
pub const DISPLAY_I2C_HZ: u32 = 400_000;

/// Number of LEDs in the 5×5 matrix.
pub const MATRIX_LEDS: usize = 25;
