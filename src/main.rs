//! Firmware entry point for the BitDogLab leaf-reflectance demo.
//!
//! Spawns one task per button that feeds the shared debounce state,
//! then runs the interaction core at a fixed 100 ms cadence on the
//! main task.

#![no_std]
#![no_main]

mod board;
mod render;

use defmt::info;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{self, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::{Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use leafscan::app::App;
use leafscan::config::{DISPLAY_I2C_HZ, LOOP_PERIOD_MS, NUM_PLANTS};
use leafscan::input::{DebouncedInputs, InputKind};
use leafscan::plant::{Plant, Profile, Xorshift};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

/// Shared between the button tasks (producers) and the UI loop (consumer).
static INPUTS: DebouncedInputs = DebouncedInputs::new();

/// Executor for the button tasks, driven by a software interrupt above
/// thread priority. The UI loop blocks in `delay_ms` for whole animation
/// sequences, so edge latching must preempt it; the debounce flags are the
/// only state crossing that boundary.
static BUTTON_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    BUTTON_EXECUTOR.on_interrupt()
}

/// Latch one debounced press per falling edge. Buttons are active low.
#[embassy_executor::task(pool_size = 3)]
async fn button_task(mut pin: Input<'static>, kind: InputKind) {
    loop {
        pin.wait_for_falling_edge().await;
        INPUTS.on_edge(kind, Instant::now().as_micros() as u32);
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("leafscan starting, {} plants", NUM_PLANTS);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let buttons = BUTTON_EXECUTOR.start(interrupt::SWI_IRQ_1);
    buttons.must_spawn(button_task(
        Input::new(p.PIN_5, Pull::Up),
        InputKind::ButtonA,
    ));
    buttons.must_spawn(button_task(
        Input::new(p.PIN_6, Pull::Up),
        InputKind::ButtonB,
    ));
    buttons.must_spawn(button_task(
        Input::new(p.PIN_22, Pull::Up),
        InputKind::ButtonJoystick,
    ));

    // OLED on I2C1, GP14 = SDA, GP15 = SCL.
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = DISPLAY_I2C_HZ;
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_15, p.PIN_14, i2c_config);

    // 5x5 WS2812 chain on GP7, driven by PIO0.
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let ws2812_program = PioWs2812Program::new(&mut common);
    let ws2812 = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_7, &ws2812_program);

    let mut renderer = render::UiRenderer::new(i2c, ws2812);

    // Joystick on the ADC, GP27 = X, GP26 = Y.
    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let axis_x = adc::Channel::new_pin(p.PIN_27, Pull::None);
    let axis_y = adc::Channel::new_pin(p.PIN_26, Pull::None);

    // Passive buzzer on GP21, silent until the first tone.
    let buzzer = Pwm::new_output_b(p.PWM_SLICE2, p.PIN_21, PwmConfig::default());

    let mut board = board::Board::new(
        adc,
        axis_x,
        axis_y,
        buzzer,
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_11, Level::Low),
        &INPUTS,
    );

    // The blue channel of the status LED stays off.
    let _led_blue = Output::new(p.PIN_12, Level::Low);

    // Seed from the boot clock, forced nonzero.
    let mut rng = Xorshift::new(Instant::now().as_ticks() as u32 | 1);
    let plants = [
        Plant::generate(Profile::Healthy, &mut rng),
        Plant::generate(Profile::Healthy, &mut rng),
        Plant::generate(Profile::VisiblyInfected, &mut rng),
        Plant::generate(Profile::OccultInfected, &mut rng),
        Plant::generate(Profile::OccultInfected, &mut rng),
    ];

    let mut app = App::new(plants);
    loop {
        app.tick(&mut board, &mut renderer, &INPUTS);
        Timer::after_millis(LOOP_PERIOD_MS).await;
    }
}
