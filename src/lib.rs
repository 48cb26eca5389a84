//! Host-testable core of leafscan.
//!
//! All interaction logic lives here with no hardware dependency: the
//! debounced input source, the joystick normalizer, the tone scheduler,
//! the plant simulation, the disease classifier, the LED-matrix frame
//! builders and the top-level state machine. Hardware and rendering are
//! reached through the [`app::Hardware`] and [`app::Renderer`] traits.
//!
//! Usage: `cargo test` (host, no embedded toolchain needed).
//!
//! The embedded binary uses main.rs with #![no_std] and #![no_main] behind
//! the `embedded` feature and plugs the RP2040 board into the same traits.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod config;
pub mod input;
pub mod matrix;
pub mod plant;
pub mod spectral;
pub mod tone;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::config::{
        ADC_CENTER, ADC_DEADZONE, DEBOUNCE_US, NUM_PLANTS, TREATMENT_COST, VISIBLE_GREEN_MAX,
        VISIBLE_RED_MIN,
    };
    use crate::input::{
        apply_deadzone, direction, step_wrapping, DebouncedInputs, Direction, InputKind,
    };
    use crate::matrix::{led_index, plant_frame, spectrum_frame, Rgb};
    use crate::plant::{Plant, Profile, Xorshift};
    use crate::spectral::{classify, Sample};
    use crate::tone::{ToneScheduler, ToneSink};

    // ════════════════════════════════════════════════════════════════════════
    // Debounced input tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn edge_is_latched_and_taken_once() {
        let inputs = DebouncedInputs::new();
        inputs.on_edge(InputKind::ButtonA, DEBOUNCE_US);
        assert!(inputs.take(InputKind::ButtonA));
        assert!(!inputs.take(InputKind::ButtonA));
    }

    #[test]
    fn edges_inside_debounce_window_collapse() {
        let inputs = DebouncedInputs::new();
        let t0 = DEBOUNCE_US;
        inputs.on_edge(InputKind::ButtonB, t0);
        // Bounce train: every edge inside the window is suppressed.
        for dt in [1_000, 50_000, 199_999] {
            inputs.on_edge(InputKind::ButtonB, t0 + dt);
        }
        assert!(inputs.take(InputKind::ButtonB));
        assert!(!inputs.take(InputKind::ButtonB));
    }

    #[test]
    fn edge_after_debounce_window_is_accepted_again() {
        let inputs = DebouncedInputs::new();
        let t0 = DEBOUNCE_US;
        inputs.on_edge(InputKind::ButtonA, t0);
        assert!(inputs.take(InputKind::ButtonA));
        inputs.on_edge(InputKind::ButtonA, t0 + DEBOUNCE_US);
        assert!(inputs.take(InputKind::ButtonA));
    }

    #[test]
    fn suppressed_bounce_does_not_extend_the_window() {
        let inputs = DebouncedInputs::new();
        let t0 = DEBOUNCE_US;
        inputs.on_edge(InputKind::ButtonA, t0);
        assert!(inputs.take(InputKind::ButtonA));
        // Rejected edge must not move the reference timestamp.
        inputs.on_edge(InputKind::ButtonA, t0 + 100_000);
        assert!(!inputs.take(InputKind::ButtonA));
        inputs.on_edge(InputKind::ButtonA, t0 + DEBOUNCE_US);
        assert!(inputs.take(InputKind::ButtonA));
    }

    #[test]
    fn repress_before_consumption_coalesces() {
        let inputs = DebouncedInputs::new();
        inputs.on_edge(InputKind::ButtonJoystick, DEBOUNCE_US);
        inputs.on_edge(InputKind::ButtonJoystick, DEBOUNCE_US * 3);
        assert!(inputs.take(InputKind::ButtonJoystick));
        assert!(!inputs.take(InputKind::ButtonJoystick));
    }

    #[test]
    fn disabled_channel_drops_edges() {
        let inputs = DebouncedInputs::new();
        inputs.set_enabled(InputKind::ButtonA, false);
        inputs.on_edge(InputKind::ButtonA, DEBOUNCE_US);
        assert!(!inputs.take(InputKind::ButtonA));

        inputs.set_enabled(InputKind::ButtonA, true);
        inputs.on_edge(InputKind::ButtonA, DEBOUNCE_US * 2);
        assert!(inputs.take(InputKind::ButtonA));
    }

    #[test]
    fn disabling_clears_pending_flag() {
        let inputs = DebouncedInputs::new();
        inputs.on_edge(InputKind::ButtonB, DEBOUNCE_US);
        inputs.set_enabled(InputKind::ButtonB, false);
        inputs.set_enabled(InputKind::ButtonB, true);
        assert!(!inputs.take(InputKind::ButtonB));
    }

    #[test]
    fn channels_are_independent() {
        let inputs = DebouncedInputs::new();
        inputs.on_edge(InputKind::ButtonA, DEBOUNCE_US);
        inputs.on_edge(InputKind::ButtonB, DEBOUNCE_US);
        assert!(inputs.take(InputKind::ButtonA));
        assert!(inputs.take(InputKind::ButtonB));
        assert!(!inputs.take(InputKind::ButtonJoystick));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Axis normalizer tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn deadzone_returns_center_inside_window() {
        for raw in (ADC_CENTER - ADC_DEADZONE)..=(ADC_CENTER + ADC_DEADZONE) {
            assert_eq!(apply_deadzone(raw, ADC_CENTER, ADC_DEADZONE), ADC_CENTER);
        }
    }

    #[test]
    fn deadzone_passes_values_outside_window_unchanged() {
        assert_eq!(
            apply_deadzone(ADC_CENTER - ADC_DEADZONE - 1, ADC_CENTER, ADC_DEADZONE),
            ADC_CENTER - ADC_DEADZONE - 1
        );
        assert_eq!(
            apply_deadzone(ADC_CENTER + ADC_DEADZONE + 1, ADC_CENTER, ADC_DEADZONE),
            ADC_CENTER + ADC_DEADZONE + 1
        );
        assert_eq!(apply_deadzone(0, ADC_CENTER, ADC_DEADZONE), 0);
        assert_eq!(apply_deadzone(4095, ADC_CENTER, ADC_DEADZONE), 4095);
    }

    #[test]
    fn direction_partitions_the_adc_domain() {
        let mut counts = [0usize; 3];
        for value in 0..=4095u16 {
            match direction(value, ADC_CENTER, ADC_DEADZONE) {
                Direction::Negative => counts[0] += 1,
                Direction::Center => counts[1] += 1,
                Direction::Positive => counts[2] += 1,
            }
        }
        // Three disjoint ranges covering everything, no gaps.
        assert_eq!(counts[0] + counts[1] + counts[2], 4096);
        assert_eq!(counts[0], (ADC_CENTER - ADC_DEADZONE) as usize);
        assert_eq!(counts[1], (2 * ADC_DEADZONE + 1) as usize);
    }

    #[test]
    fn direction_boundaries() {
        assert_eq!(
            direction(ADC_CENTER + ADC_DEADZONE, ADC_CENTER, ADC_DEADZONE),
            Direction::Center
        );
        assert_eq!(
            direction(ADC_CENTER + ADC_DEADZONE + 1, ADC_CENTER, ADC_DEADZONE),
            Direction::Positive
        );
        assert_eq!(
            direction(ADC_CENTER - ADC_DEADZONE, ADC_CENTER, ADC_DEADZONE),
            Direction::Center
        );
        assert_eq!(
            direction(ADC_CENTER - ADC_DEADZONE - 1, ADC_CENTER, ADC_DEADZONE),
            Direction::Negative
        );
    }

    #[test]
    fn wrapping_step_round_trip() {
        for len in [1usize, 2, 5, 7] {
            for start in 0..len {
                let there = step_wrapping(start, Direction::Positive, len);
                let back = step_wrapping(there, Direction::Negative, len);
                assert_eq!(back, start);
                let there = step_wrapping(start, Direction::Negative, len);
                let back = step_wrapping(there, Direction::Positive, len);
                assert_eq!(back, start);
            }
        }
    }

    #[test]
    fn wrapping_step_wraps_at_both_ends() {
        assert_eq!(step_wrapping(4, Direction::Positive, 5), 0);
        assert_eq!(step_wrapping(0, Direction::Negative, 5), 4);
        assert_eq!(step_wrapping(2, Direction::Center, 5), 2);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Tone scheduler tests
    // ════════════════════════════════════════════════════════════════════════

    /// Records every on/off call; `None` marks an off.
    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Option<u32>>,
    }

    impl ToneSink for RecordingSink {
        fn tone_on(&mut self, freq_hz: u32) {
            self.events.push(Some(freq_hz));
        }
        fn tone_off(&mut self) {
            self.events.push(None);
        }
    }

    #[test]
    fn tone_expires_at_deadline() {
        let mut sink = RecordingSink::default();
        let mut tone = ToneScheduler::new();
        tone.start(&mut sink, 440, 100, 1_000);
        assert!(tone.is_active());

        tone.tick(&mut sink, 1_099);
        assert!(tone.is_active());
        tone.tick(&mut sink, 1_100);
        assert!(!tone.is_active());
        assert_eq!(sink.events, vec![None, Some(440), None]);
    }

    #[test]
    fn starting_a_tone_preempts_the_active_one() {
        let mut sink = RecordingSink::default();
        let mut tone = ToneScheduler::new();
        tone.start(&mut sink, 440, 1_000, 0);
        tone.start(&mut sink, 880, 1_000, 100);
        // Each start silences the previous output before the new frequency:
        // at most one tone audible at any instant.
        assert_eq!(sink.events, vec![None, Some(440), None, Some(880)]);
        assert!(tone.is_active());

        // The old deadline is gone; the new one applies.
        tone.tick(&mut sink, 1_000);
        assert!(tone.is_active());
        tone.tick(&mut sink, 1_100);
        assert!(!tone.is_active());
    }

    #[test]
    fn zero_duration_tone_expires_on_next_tick() {
        let mut sink = RecordingSink::default();
        let mut tone = ToneScheduler::new();
        tone.start(&mut sink, 523, 0, 42);
        tone.tick(&mut sink, 42);
        assert!(!tone.is_active());
    }

    #[test]
    fn tick_without_active_tone_is_a_no_op() {
        let mut sink = RecordingSink::default();
        let mut tone = ToneScheduler::new();
        tone.tick(&mut sink, 10_000);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut sink = RecordingSink::default();
        let mut tone = ToneScheduler::new();
        tone.start(&mut sink, 440, 100, 0);
        tone.stop(&mut sink);
        tone.stop(&mut sink);
        assert!(!tone.is_active());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Classifier tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn healthy_reference_sample_classifies_negative() {
        // NDVI ≈ 0.407 (healthy), GNDVI ≈ 0.151 (below threshold), visible
        // criterion false: both indices must be low for a positive call.
        let sample = Sample::new(0.40, 0.70, 0.50, 0.95);
        assert!((sample.ndvi() - 0.407).abs() < 0.01);
        assert!((sample.gndvi() - 0.151).abs() < 0.01);
        assert!(!classify(&sample));
    }

    #[test]
    fn browned_tissue_classifies_positive_regardless_of_indices() {
        // R > 0.65 and G < 0.55 fire the visible criterion.
        let sample = Sample::new(0.70, 0.50, 0.30, 0.60);
        assert!(classify(&sample));
    }

    #[test]
    fn depressed_indices_classify_positive() {
        let sample = Sample::new(0.60, 0.30, 0.35, 0.55);
        assert!(sample.ndvi() < 0.4);
        assert!(classify(&sample));
    }

    #[test]
    fn high_nir_keeps_a_sample_negative() {
        let sample = Sample::new(0.35, 0.50, 0.40, 1.0);
        assert!(!classify(&sample));
    }

    #[test]
    fn indices_are_total_even_at_zero_reflectance() {
        // The epsilon denominator keeps a black sample finite.
        let sample = Sample::new(0.0, 0.0, 0.0, 0.0);
        assert!(sample.ndvi().is_finite());
        assert!(sample.gndvi().is_finite());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Plant model tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn healthy_profile_diagnoses_negative_everywhere() {
        let mut rng = Xorshift::new(7);
        for _ in 0..20 {
            let plant = Plant::generate(Profile::Healthy, &mut rng);
            assert!(!plant.infected);
            for leaf in &plant.leaves {
                assert!(!leaf.visible_infection);
                assert!(!leaf.diagnose());
            }
        }
    }

    #[test]
    fn visible_profile_marks_plant_and_short_circuits_diagnosis() {
        let mut rng = Xorshift::new(11);
        let plant = Plant::generate(Profile::VisiblyInfected, &mut rng);
        assert!(plant.infected);
        for leaf in &plant.leaves {
            assert!(leaf.visible_infection);
            // Visible symptom forces a positive diagnosis independent of
            // the computed indices.
            assert!(leaf.diagnose());
        }
    }

    #[test]
    fn occult_profile_is_invisible_but_diagnosable() {
        let mut rng = Xorshift::new(23);
        for _ in 0..20 {
            let plant = Plant::generate(Profile::OccultInfected, &mut rng);
            // No visible symptom, so the plant flag stays clear at
            // generation time...
            assert!(!plant.infected);
            for leaf in &plant.leaves {
                assert!(!leaf.visible_infection);
                // ...but the index rule finds every leaf.
                assert!(leaf.diagnose());
            }
        }
    }

    #[test]
    fn treat_resets_leaves_and_latches() {
        let mut rng = Xorshift::new(3);
        let mut plant = Plant::generate(Profile::VisiblyInfected, &mut rng);
        plant.treat();
        assert!(plant.treated);
        assert!(!plant.infected);
        for leaf in &plant.leaves {
            assert!(!leaf.visible_infection);
            assert!(!leaf.infected);
            assert!(!leaf.diagnose());
            assert_eq!(leaf.sample, Sample::new(0.40, 0.70, 0.50, 0.95));
        }
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let mut a = Xorshift::new(99);
        let mut b = Xorshift::new(99);
        assert_eq!(
            Plant::generate(Profile::OccultInfected, &mut a),
            Plant::generate(Profile::OccultInfected, &mut b)
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Matrix frame tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn serpentine_index_mapping() {
        // Even rows right-to-left, odd rows left-to-right.
        assert_eq!(led_index(0, 0), 4);
        assert_eq!(led_index(4, 0), 0);
        assert_eq!(led_index(0, 1), 5);
        assert_eq!(led_index(4, 1), 9);
        assert_eq!(led_index(2, 2), 12);
        assert_eq!(led_index(0, 4), 24);
    }

    #[test]
    fn serpentine_index_is_a_bijection() {
        let mut seen = [false; 25];
        for y in 0..5 {
            for x in 0..5 {
                let i = led_index(x, y);
                assert!(!seen[i]);
                seen[i] = true;
            }
        }
    }

    #[test]
    fn spectrum_bars_track_band_values() {
        let frame = spectrum_frame(&Sample::new(1.0, 0.5, 0.0, 0.34));
        // Full red column.
        for y in 0..5 {
            assert_eq!(frame[led_index(0, y)], Rgb(255, 0, 0));
        }
        // Half green column: 0.5 * 6 = 3 LEDs.
        for y in 0..3 {
            assert_eq!(frame[led_index(1, y)], Rgb(0, 255, 0));
        }
        assert_eq!(frame[led_index(1, 3)], Rgb(0, 0, 0));
        // Zero blue column.
        for y in 0..5 {
            assert_eq!(frame[led_index(2, y)], Rgb(0, 0, 0));
        }
        // NIR occupies the two rightmost columns: 0.34 * 6 = 2 LEDs.
        for x in [3, 4] {
            assert_eq!(frame[led_index(x, 0)], Rgb(255, 255, 255));
            assert_eq!(frame[led_index(x, 1)], Rgb(255, 255, 255));
            assert_eq!(frame[led_index(x, 2)], Rgb(0, 0, 0));
        }
    }

    #[test]
    fn plant_frame_highlights_the_selected_leaf() {
        let mut rng = Xorshift::new(5);
        let plant = Plant::generate(Profile::Healthy, &mut rng);

        // Leaf 1 sits at sprite row 0, column 0 → chain row 4.
        let unselected = plant_frame(&plant, None);
        assert_eq!(unselected[led_index(0, 4)], Rgb(0, 100, 0));

        let selected = plant_frame(&plant, Some(0));
        assert_eq!(selected[led_index(0, 4)], Rgb(0, 5, 0));
    }

    #[test]
    fn plant_frame_shows_visible_infection() {
        let mut rng = Xorshift::new(5);
        let plant = Plant::generate(Profile::VisiblyInfected, &mut rng);
        let frame = plant_frame(&plant, None);
        assert_eq!(frame[led_index(0, 4)], Rgb(100, 100, 0));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Redraw policy constants sanity
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn configuration_sanity() {
        assert_eq!(NUM_PLANTS, 5);
        assert_eq!(TREATMENT_COST, 10);
        assert_eq!(DEBOUNCE_US, 200_000);
        assert_eq!(VISIBLE_RED_MIN, 0.65);
        assert_eq!(VISIBLE_GREEN_MAX, 0.55);
    }
}
