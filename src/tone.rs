//! Non-blocking single-tone scheduler for the piezo buzzer.
//!
//! The scheduler owns no hardware; it drives a [`ToneSink`] passed into
//! each call, which keeps it testable on the host and lets the embedded
//! side back it with a PWM slice.
//!
//! `tick` must run once per main-loop iteration. It never sleeps: callers
//! that want audible sequencing (two short beeps, a jingle) insert their
//! own bounded waits between `start`/`stop` pairs.

/// Hardware seam for tone output.
pub trait ToneSink {
    /// Start emitting a tone at the given frequency.
    fn tone_on(&mut self, freq_hz: u32);
    /// Silence the output.
    fn tone_off(&mut self);
}

/// A single note of a sound effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    pub freq_hz: u32,
    pub dur_ms: u32,
}

const fn note(freq_hz: u32, dur_ms: u32) -> Note {
    Note { freq_hz, dur_ms }
}

/// Short confirmation beep for menu selections.
pub const SELECT_BEEP: Note = note(392, 100);

/// Beep marking the start of an analysis.
pub const ANALYSIS_STARTED_BEEP: Note = note(440, 50);

/// Beep marking the end of an analysis.
pub const ANALYSIS_DONE_BEEP: Note = note(523, 200);

/// Alarm jingle played on a positive diagnosis.
pub const INFECTED_JINGLE: &[Note] = &[note(5000, 150), note(2000, 150), note(5000, 150)];

/// A-major confirmation jingle played on a negative diagnosis (A4, C#5, E5).
pub const HEALTHY_JINGLE: &[Note] = &[note(440, 150), note(554, 150), note(659, 150)];

/// Manages at most one active tone and its requested stop time.
pub struct ToneScheduler {
    active: bool,
    end_ms: u32,
}

impl ToneScheduler {
    pub const fn new() -> Self {
        Self { active: false, end_ms: 0 }
    }

    /// Unconditionally stop any in-flight tone and start a new one that
    /// expires `dur_ms` after `now_ms`.
    pub fn start(&mut self, sink: &mut impl ToneSink, freq_hz: u32, dur_ms: u32, now_ms: u32) {
        sink.tone_off();
        sink.tone_on(freq_hz);
        self.active = true;
        self.end_ms = now_ms.wrapping_add(dur_ms);
    }

    /// Silence the output and forget the deadline.
    pub fn stop(&mut self, sink: &mut impl ToneSink) {
        sink.tone_off();
        self.active = false;
    }

    /// Expiry poll; call once per loop iteration.
    ///
    /// A zero-duration tone is legal and expires here on the first tick at
    /// or past its start time.
    pub fn tick(&mut self, sink: &mut impl ToneSink, now_ms: u32) {
        // Wrapping comparison: "now has reached end" as long as the gap is
        // under half the u32 range, which any UI-scale duration is.
        if self.active && now_ms.wrapping_sub(self.end_ms) < u32::MAX / 2 {
            self.stop(sink);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for ToneScheduler {
    fn default() -> Self {
        Self::new()
    }
}
