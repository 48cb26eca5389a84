//! Board bindings for the BitDogLab (RP2040).
//!
//! Wires the core's `Hardware` trait to the joystick ADC, the passive
//! buzzer PWM, the RGB status LED and the shared debounce state. Button
//! edges themselves arrive through the tasks spawned in `main`.

use embassy_futures::block_on;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::{block_for, Duration, Instant};

use leafscan::app::{Hardware, StatusLed};
use leafscan::config::ADC_CENTER;
use leafscan::input::DebouncedInputs;
use leafscan::tone::ToneSink;

/// System clock over the PWM divider below.
const PWM_TICK_HZ: u32 = 125_000_000 / 64;
/// Duty cycle of the buzzer square wave, in percent.
const BUZZER_DUTY_PCT: u32 = 70;

pub struct Board<'d> {
    adc: Adc<'d, Async>,
    axis_x: Channel<'d>,
    axis_y: Channel<'d>,
    buzzer: Pwm<'d>,
    led_red: Output<'d>,
    led_green: Output<'d>,
    inputs: &'static DebouncedInputs,
}

impl<'d> Board<'d> {
    pub fn new(
        adc: Adc<'d, Async>,
        axis_x: Channel<'d>,
        axis_y: Channel<'d>,
        buzzer: Pwm<'d>,
        led_red: Output<'d>,
        led_green: Output<'d>,
        inputs: &'static DebouncedInputs,
    ) -> Self {
        Self {
            adc,
            axis_x,
            axis_y,
            buzzer,
            led_red,
            led_green,
            inputs,
        }
    }
}

impl ToneSink for Board<'_> {
    fn tone_on(&mut self, freq_hz: u32) {
        if freq_hz == 0 {
            self.tone_off();
            return;
        }
        let top = (PWM_TICK_HZ / freq_hz).saturating_sub(1).min(u16::MAX as u32) as u16;
        let mut cfg = PwmConfig::default();
        cfg.divider = 64u8.into();
        cfg.top = top;
        // GP21 is the B output of its PWM slice.
        cfg.compare_b = (top as u32 * BUZZER_DUTY_PCT / 100) as u16;
        self.buzzer.set_config(&cfg);
    }

    fn tone_off(&mut self) {
        let mut cfg = PwmConfig::default();
        cfg.divider = 64u8.into();
        cfg.compare_b = 0;
        self.buzzer.set_config(&cfg);
    }
}

impl Hardware for Board<'_> {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(ms as u64));
    }

    fn read_axes(&mut self) -> (u16, u16) {
        let x = block_on(self.adc.read(&mut self.axis_x)).unwrap_or(ADC_CENTER);
        let y = block_on(self.adc.read(&mut self.axis_y)).unwrap_or(ADC_CENTER);
        (x, y)
    }

    fn set_buttons_enabled(&mut self, a: bool, b: bool, joy: bool) {
        self.inputs.set_all_enabled(a, b, joy);
    }

    fn status_led(&mut self, led: StatusLed) {
        match led {
            StatusLed::Infected => {
                self.led_red.set_high();
                self.led_green.set_low();
            }
            StatusLed::Healthy => {
                self.led_red.set_low();
                self.led_green.set_high();
            }
            StatusLed::Off => {
                self.led_red.set_low();
                self.led_green.set_low();
            }
        }
    }
}
