//! Top-level interaction state machine.
//!
//! One cooperative foreground loop calls [`App::tick`] every ~100 ms. Each
//! tick polls the tone scheduler, dispatches any pending debounced button
//! events to the active state's handler, and redraws when the dirty flag
//! is set or the 3 s message-rotation interval has elapsed.
//!
//! Hardware access goes through the [`Hardware`] and [`Renderer`] seams so
//! the whole machine runs on the host under test with a fake clock and
//! injected button flags. The few blocking waits (treatment dots, the
//! analysis animation, the result screen) are bounded polls through
//! `Hardware::delay_ms`, never real contention.

use crate::config::{
    ADC_CENTER, ADC_DEADZONE, ADC_MAX, ANALYSIS_ANIMATION_MS, ANALYSIS_ANIMATION_STEPS,
    MESSAGE_ROTATE_MS, NOTICE_HOLD_MS, NUM_PLANTS, RESULT_POLL_MS, TREATMENT_COST,
    TREATMENT_STEP_MS,
};
use crate::input::{apply_deadzone, direction, step_wrapping, DebouncedInputs, Direction, InputKind};
use crate::plant::Plant;
use crate::spectral::{classify, Sample};
use crate::tone::{
    Note, ToneScheduler, ToneSink, ANALYSIS_DONE_BEEP, ANALYSIS_STARTED_BEEP, HEALTHY_JINGLE,
    INFECTED_JINGLE, SELECT_BEEP,
};

/// Footer hints rotated on the plant menu.
const MENU_MESSAGE_COUNT: u8 = 4;

/// Footer hints rotated on the leaf menu.
const LEAF_MESSAGE_COUNT: u8 = 3;

/// Two-color status indicator next to the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusLed {
    /// Red: the shown plant or result is infected.
    Infected,
    /// Green: healthy.
    Healthy,
    /// Dark: idle / scanning.
    Off,
}

/// Everything the state machine needs from the board.
///
/// `ToneSink` is a supertrait so the tone scheduler can drive the same
/// object.
pub trait Hardware: ToneSink {
    /// Milliseconds since boot (wrapping).
    fn now_ms(&self) -> u32;
    /// Bounded blocking wait; UI pacing only.
    fn delay_ms(&mut self, ms: u32);
    /// Raw joystick sample, `(x, y)`, each in `0..=ADC_MAX`.
    fn read_axes(&mut self) -> (u16, u16);
    /// Gate the three button channels (A, B, joystick).
    fn set_buttons_enabled(&mut self, a: bool, b: bool, joy: bool);
    /// Drive the status indicator.
    fn status_led(&mut self, led: StatusLed);
}

/// Drawing collaborator; concrete rendering lives outside the core.
pub trait Renderer {
    /// Plant sprite on the LED matrix, `selected` highlighted if given.
    fn draw_plant_overview(&mut self, plant: &Plant, selected: Option<usize>);
    /// Plant menu screen with rotating footer hint `message`.
    fn draw_menu(&mut self, plant_index: usize, cost: u32, message: u8);
    /// Leaf menu screen.
    fn draw_leaf_menu(&mut self, leaf_index: usize, message: u8);
    /// Diagnosis screen shown until ButtonA is pressed.
    fn draw_analysis_result(&mut self, infected: bool, sample: &Sample, ndvi: f32, gndvi: f32);
    /// Analysis progress bar, `percent` in 0..=100.
    fn draw_progress(&mut self, percent: u8);
    /// Calibration bar chart (screen and matrix).
    fn draw_calibration_chart(&mut self, sample: &Sample);
    /// Treatment progress frame with `dots` trailing dots.
    fn draw_treatment(&mut self, dots: u8);
    /// Notice that the plant was treated before.
    fn draw_already_treated(&mut self);
    /// Blank screen and matrix.
    fn clear_all(&mut self);
}

/// Calibration sub-machine phase inside [`UiState::Scan`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanPhase {
    /// Joystick axes are mapped into the live sample; B cycles the step,
    /// A arms a one-shot analysis.
    Calibrate,
    /// Run the classify-and-report sequence once, then return to
    /// `Calibrate`.
    AnalyzeOnce,
}

/// The finite-state-machine discriminant. Each variant carries only the
/// cursors it needs; the plant cursor and the calibrated scan sample are
/// shared context owned by [`App`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiState {
    Menu,
    SelectLeaf { leaf: usize },
    Analyze { leaf: usize },
    Scan { step: u8, phase: ScanPhase },
}

/// Periodic footer-hint rotation. One instance per rotating state, reset
/// on state entry.
#[derive(Clone, Copy, Debug)]
struct MessageRotation {
    index: u8,
    count: u8,
    last_ms: u32,
}

impl MessageRotation {
    const fn new(count: u8) -> Self {
        Self { index: 0, count, last_ms: 0 }
    }

    fn reset(&mut self, now_ms: u32) {
        self.index = 0;
        self.last_ms = now_ms;
    }

    /// Advance the hint if the interval elapsed; returns true when a
    /// redraw is due.
    fn poll(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= MESSAGE_ROTATE_MS {
            self.index = (self.index + 1) % self.count;
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Process-long application context: plants, cursors, tone scheduler and
/// the active UI state.
pub struct App {
    state: UiState,
    plants: [Plant; NUM_PLANTS],
    plant_cursor: usize,
    scan_sample: Sample,
    cost: u32,
    tone: ToneScheduler,
    dirty: bool,
    menu_banner: MessageRotation,
    leaf_banner: MessageRotation,
}

impl App {
    pub fn new(plants: [Plant; NUM_PLANTS]) -> Self {
        Self {
            state: UiState::Menu,
            plants,
            plant_cursor: 0,
            scan_sample: Sample::default(),
            cost: 0,
            tone: ToneScheduler::new(),
            dirty: true,
            menu_banner: MessageRotation::new(MENU_MESSAGE_COUNT),
            leaf_banner: MessageRotation::new(LEAF_MESSAGE_COUNT),
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn plant_cursor(&self) -> usize {
        self.plant_cursor
    }

    pub fn plants(&self) -> &[Plant; NUM_PLANTS] {
        &self.plants
    }

    pub fn scan_sample(&self) -> Sample {
        self.scan_sample
    }

    /// One cooperative loop iteration.
    pub fn tick<H: Hardware, R: Renderer>(
        &mut self,
        hw: &mut H,
        renderer: &mut R,
        inputs: &DebouncedInputs,
    ) {
        let now = hw.now_ms();
        self.tone.tick(hw, now);

        match self.state {
            UiState::Menu => self.tick_menu(hw, renderer, inputs, now),
            UiState::SelectLeaf { leaf } => self.tick_select_leaf(hw, renderer, inputs, now, leaf),
            UiState::Analyze { leaf } => self.tick_analyze(hw, renderer, inputs, leaf),
            UiState::Scan { step, phase } => self.tick_scan(hw, renderer, inputs, step, phase),
        }
    }

    // Menu

    fn tick_menu<H: Hardware, R: Renderer>(
        &mut self,
        hw: &mut H,
        renderer: &mut R,
        inputs: &DebouncedInputs,
        now: u32,
    ) {
        if let Some(dir) = Self::nav_direction(hw) {
            self.plant_cursor = step_wrapping(self.plant_cursor, dir, NUM_PLANTS);
            self.dirty = true;
        }

        if inputs.take(InputKind::ButtonA) {
            self.treat_current(hw, renderer, inputs);
        }

        if inputs.take(InputKind::ButtonB) {
            self.state = UiState::SelectLeaf { leaf: 0 };
            self.leaf_banner.reset(now);
            hw.set_buttons_enabled(true, true, false);
            self.select_beep(hw);
            self.dirty = true;
            return;
        }

        if inputs.take(InputKind::ButtonJoystick) {
            self.state = UiState::Scan { step: 2, phase: ScanPhase::Calibrate };
            hw.status_led(StatusLed::Off);
            self.select_beep(hw);
            self.dirty = true;
            return;
        }

        let rotated = self.menu_banner.poll(now);
        if self.dirty || rotated {
            let plant = &self.plants[self.plant_cursor];
            renderer.draw_plant_overview(plant, None);
            renderer.draw_menu(self.plant_cursor, self.cost, self.menu_banner.index);
            hw.status_led(Self::infection_led(plant.infected));
            self.dirty = false;
        }
    }

    /// Run the treatment sequence on the plant under the cursor.
    ///
    /// An already-treated plant only gets a notice hold; the cost and the
    /// progress sequence never run twice for the same plant.
    fn treat_current<H: Hardware, R: Renderer>(
        &mut self,
        hw: &mut H,
        renderer: &mut R,
        inputs: &DebouncedInputs,
    ) {
        hw.set_buttons_enabled(false, false, false);

        if self.plants[self.plant_cursor].treated {
            self.double_beep(hw, ANALYSIS_DONE_BEEP);
            renderer.draw_already_treated();
            hw.delay_ms(NOTICE_HOLD_MS);
        } else {
            self.double_beep(hw, ANALYSIS_STARTED_BEEP);
            for dots in 0..=3 {
                renderer.draw_treatment(dots);
                hw.delay_ms(TREATMENT_STEP_MS);
            }
            self.double_beep(hw, ANALYSIS_DONE_BEEP);
            self.plants[self.plant_cursor].treat();
            self.cost += TREATMENT_COST;
        }

        // Discard edges latched while the channels were gated off.
        let _ = inputs.take(InputKind::ButtonA);
        hw.set_buttons_enabled(true, true, true);
        self.dirty = true;
    }

    // SelectLeaf

    fn tick_select_leaf<H: Hardware, R: Renderer>(
        &mut self,
        hw: &mut H,
        renderer: &mut R,
        inputs: &DebouncedInputs,
        now: u32,
        mut leaf: usize,
    ) {
        if let Some(dir) = Self::nav_direction(hw) {
            leaf = step_wrapping(leaf, dir, crate::config::LEAVES_PER_PLANT);
            self.state = UiState::SelectLeaf { leaf };
            self.dirty = true;
        }

        if inputs.take(InputKind::ButtonB) {
            self.state = UiState::Analyze { leaf };
            return;
        }

        if inputs.take(InputKind::ButtonA) {
            self.state = UiState::Menu;
            self.menu_banner.reset(now);
            hw.set_buttons_enabled(true, true, true);
            self.select_beep(hw);
            self.dirty = true;
            return;
        }

        let rotated = self.leaf_banner.poll(now);
        if self.dirty || rotated {
            let plant = &self.plants[self.plant_cursor];
            renderer.draw_plant_overview(plant, Some(leaf));
            renderer.draw_leaf_menu(leaf, self.leaf_banner.index);
            hw.status_led(Self::infection_led(plant.infected));
            self.dirty = false;
        }
    }

    // Analyze

    fn tick_analyze<H: Hardware, R: Renderer>(
        &mut self,
        hw: &mut H,
        renderer: &mut R,
        inputs: &DebouncedInputs,
        leaf: usize,
    ) {
        hw.set_buttons_enabled(false, false, false);

        let infected = self.plants[self.plant_cursor].leaves[leaf].diagnose();
        self.plants[self.plant_cursor].leaves[leaf].infected = infected;
        if infected {
            self.plants[self.plant_cursor].infected = true;
        }

        let sample = self.plants[self.plant_cursor].leaves[leaf].sample;
        self.report_analysis(hw, renderer, inputs, infected, &sample);

        // Back to leaf selection; the joystick button stays gated off and
        // the hint rotation restarts like any other state entry.
        self.select_beep(hw);
        hw.set_buttons_enabled(true, true, false);
        self.leaf_banner.reset(hw.now_ms());
        self.state = UiState::SelectLeaf { leaf };
        self.dirty = true;
    }

    // Scan

    fn tick_scan<H: Hardware, R: Renderer>(
        &mut self,
        hw: &mut H,
        renderer: &mut R,
        inputs: &DebouncedInputs,
        mut step: u8,
        phase: ScanPhase,
    ) {
        match phase {
            ScanPhase::Calibrate => {
                if step < 2 {
                    let (x, y) = hw.read_axes();
                    let x = apply_deadzone(x, ADC_CENTER, ADC_DEADZONE);
                    let y = apply_deadzone(y, ADC_CENTER, ADC_DEADZONE);
                    let h = x as f32 / ADC_MAX as f32;
                    let v = y as f32 / ADC_MAX as f32;
                    if step == 0 {
                        self.scan_sample.r = v;
                        self.scan_sample.nir = h;
                    } else {
                        self.scan_sample.g = v;
                        self.scan_sample.b = h;
                    }
                    self.dirty = true;
                }

                if inputs.take(InputKind::ButtonB) {
                    step = (step + 1) % 3;
                }

                if inputs.take(InputKind::ButtonA) {
                    hw.set_buttons_enabled(false, false, false);
                    self.state = UiState::Scan { step, phase: ScanPhase::AnalyzeOnce };
                    return;
                }

                if inputs.take(InputKind::ButtonJoystick) {
                    renderer.clear_all();
                    hw.set_buttons_enabled(true, true, true);
                    self.state = UiState::Menu;
                    self.menu_banner.reset(hw.now_ms());
                    self.select_beep(hw);
                    self.dirty = true;
                    return;
                }

                if self.dirty {
                    renderer.draw_calibration_chart(&self.scan_sample);
                    self.dirty = false;
                }

                self.state = UiState::Scan { step, phase };
            }
            ScanPhase::AnalyzeOnce => {
                let sample = self.scan_sample;
                let infected = classify(&sample);
                self.report_analysis(hw, renderer, inputs, infected, &sample);

                hw.set_buttons_enabled(true, true, true);
                self.state = UiState::Scan { step: 2, phase: ScanPhase::Calibrate };
                self.dirty = true;
            }
        }
    }

    // Shared sequences

    /// Progress animation, diagnosis feedback and the result screen.
    /// Blocks (bounded polling) until ButtonA confirms.
    fn report_analysis<H: Hardware, R: Renderer>(
        &mut self,
        hw: &mut H,
        renderer: &mut R,
        inputs: &DebouncedInputs,
        infected: bool,
        sample: &Sample,
    ) {
        self.double_beep(hw, ANALYSIS_STARTED_BEEP);

        let frame_ms = ANALYSIS_ANIMATION_MS / ANALYSIS_ANIMATION_STEPS;
        for i in 0..=ANALYSIS_ANIMATION_STEPS {
            renderer.draw_progress((i * 100 / ANALYSIS_ANIMATION_STEPS) as u8);
            hw.delay_ms(frame_ms);
        }

        self.double_beep(hw, ANALYSIS_DONE_BEEP);

        hw.status_led(Self::infection_led(infected));
        self.play_jingle(hw, if infected { INFECTED_JINGLE } else { HEALTHY_JINGLE });

        renderer.draw_analysis_result(infected, sample, sample.ndvi(), sample.gndvi());

        // Only ButtonA can confirm the result.
        hw.set_buttons_enabled(true, false, false);
        while !inputs.take(InputKind::ButtonA) {
            hw.delay_ms(RESULT_POLL_MS);
        }
    }

    /// Two short beeps with a gap, as used around every long-running
    /// sequence.
    fn double_beep<H: Hardware>(&mut self, hw: &mut H, beep: Note) {
        for _ in 0..2 {
            let now = hw.now_ms();
            self.tone.start(hw, beep.freq_hz, beep.dur_ms, now);
            hw.delay_ms(100);
            self.tone.stop(hw);
            hw.delay_ms(100);
        }
    }

    fn play_jingle<H: Hardware>(&mut self, hw: &mut H, notes: &[Note]) {
        for note in notes {
            let now = hw.now_ms();
            self.tone.start(hw, note.freq_hz, note.dur_ms, now);
            hw.delay_ms(note.dur_ms);
        }
        self.tone.stop(hw);
    }

    /// Fire-and-forget confirmation beep; expires via the tone tick.
    fn select_beep<H: Hardware>(&mut self, hw: &mut H) {
        let now = hw.now_ms();
        self.tone.start(hw, SELECT_BEEP.freq_hz, SELECT_BEEP.dur_ms, now);
    }

    /// Horizontal navigation direction, or None when centered.
    fn nav_direction<H: Hardware>(hw: &mut H) -> Option<Direction> {
        let (x, _) = hw.read_axes();
        let x = apply_deadzone(x, ADC_CENTER, ADC_DEADZONE);
        match direction(x, ADC_CENTER, ADC_DEADZONE) {
            Direction::Center => None,
            dir => Some(dir),
        }
    }

    fn infection_led(infected: bool) -> StatusLed {
        if infected {
            StatusLed::Infected
        } else {
            StatusLed::Healthy
        }
    }
}
