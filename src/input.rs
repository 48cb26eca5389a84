//! Button and joystick input handling.
//!
//! Three physical buttons (active-low with external pull-up on the board):
//!   - A        - treat plant / back / confirm result
//!   - B        - select / cycle calibration step
//!   - JOYSTICK - enter or leave scan mode
//!
//! Button edges arrive from an interrupt (or edge-waiter task) context and
//! are latched into sticky flags here. The foreground loop consumes them
//! with read-and-clear `take` semantics, so a burst of bounces inside the
//! debounce window collapses to at most one logical event.
//!
//! The joystick side is plain polling: raw ADC values pass through a
//! deadzone and are reduced to a tri-state [`Direction`] before any
//! navigation decision.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::DEBOUNCE_US;

/// The three edge-triggered input channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputKind {
    ButtonA,
    ButtonB,
    ButtonJoystick,
}

impl InputKind {
    const fn index(self) -> usize {
        match self {
            InputKind::ButtonA => 0,
            InputKind::ButtonB => 1,
            InputKind::ButtonJoystick => 2,
        }
    }
}

/// Tri-state joystick reading along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Negative,
    Center,
    Positive,
}

/// Debounced, latched button state shared between the edge-interrupt
/// context and the foreground loop.
///
/// Single producer (the interrupt context calls [`on_edge`]) and single
/// consumer (the foreground loop calls [`take`]); each flag is written
/// atomically and plain load/store suffices on thumbv6-m, which has no
/// compare-and-swap.
///
/// [`on_edge`]: DebouncedInputs::on_edge
/// [`take`]: DebouncedInputs::take
pub struct DebouncedInputs {
    pending: [AtomicBool; 3],
    last_accepted_us: [AtomicU32; 3],
    enabled: [AtomicBool; 3],
}

impl DebouncedInputs {
    pub const fn new() -> Self {
        Self {
            pending: [AtomicBool::new(false), AtomicBool::new(false), AtomicBool::new(false)],
            last_accepted_us: [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)],
            enabled: [AtomicBool::new(true), AtomicBool::new(true), AtomicBool::new(true)],
        }
    }

    /// Record a raw falling edge on `kind` observed at `now_us`.
    ///
    /// The edge is silently dropped when the channel is disabled or when it
    /// falls inside the debounce window of the previously accepted edge.
    /// The timestamp is only updated on acceptance, so a bounce train does
    /// not keep pushing the window forward.
    pub fn on_edge(&self, kind: InputKind, now_us: u32) {
        let i = kind.index();
        if !self.enabled[i].load(Ordering::Relaxed) {
            return;
        }
        let last = self.last_accepted_us[i].load(Ordering::Relaxed);
        if now_us.wrapping_sub(last) >= DEBOUNCE_US {
            self.last_accepted_us[i].store(now_us, Ordering::Relaxed);
            self.pending[i].store(true, Ordering::Release);
        }
    }

    /// Read and clear the pending flag for `kind`.
    ///
    /// This is the only consumption path; reading without clearing would
    /// re-process a stale event on the next tick.
    pub fn take(&self, kind: InputKind) -> bool {
        let i = kind.index();
        if self.pending[i].load(Ordering::Acquire) {
            self.pending[i].store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Enable or disable one input channel.
    ///
    /// Disabling also clears any pending flag so an event latched during a
    /// blocking animation cannot leak into the next state.
    pub fn set_enabled(&self, kind: InputKind, enabled: bool) {
        let i = kind.index();
        self.enabled[i].store(enabled, Ordering::Relaxed);
        if !enabled {
            self.pending[i].store(false, Ordering::Release);
        }
    }

    /// Gate all three channels at once, in A / B / joystick order.
    pub fn set_all_enabled(&self, a: bool, b: bool, joy: bool) {
        self.set_enabled(InputKind::ButtonA, a);
        self.set_enabled(InputKind::ButtonB, b);
        self.set_enabled(InputKind::ButtonJoystick, joy);
    }
}

impl Default for DebouncedInputs {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp joystick noise to the neutral reading.
///
/// Returns `center` for any value within `center ± window`, otherwise the
/// raw value unchanged. This is noise suppression, not range clamping.
pub fn apply_deadzone(raw: u16, center: u16, window: u16) -> u16 {
    if raw >= center.saturating_sub(window) && raw <= center.saturating_add(window) {
        center
    } else {
        raw
    }
}

/// Reduce an axis reading to a tri-state direction.
///
/// The three ranges partition the whole ADC domain: strictly above
/// `center + window` is positive, strictly below `center - window` is
/// negative, everything else (the deadzone inclusive) is center.
pub fn direction(value: u16, center: u16, window: u16) -> Direction {
    if value > center.saturating_add(window) {
        Direction::Positive
    } else if value < center.saturating_sub(window) {
        Direction::Negative
    } else {
        Direction::Center
    }
}

/// Move a wrap-around cursor one step in either direction.
///
/// `len` must be non-zero; the result is always in `0..len`.
pub fn step_wrapping(index: usize, dir: Direction, len: usize) -> usize {
    match dir {
        Direction::Positive => (index + 1) % len,
        Direction::Negative => (index + len - 1) % len,
        Direction::Center => index,
    }
}
