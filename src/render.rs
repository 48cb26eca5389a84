//! Concrete rendering: SSD1306 OLED screens plus the 5×5 WS2812 matrix.
//!
//! Implements the core's `Renderer` trait. Frame content for the matrix
//! comes from the pure builders in `leafscan::matrix`; this module only
//! shifts frames out through PIO and draws text/bars on the OLED.

use core::fmt::Write as _;

use embassy_futures::block_on;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use smart_leds::RGB8;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use leafscan::app::Renderer;
use leafscan::config::MATRIX_LEDS;
use leafscan::matrix::{plant_frame, spectrum_frame, Frame};
use leafscan::plant::Plant;
use leafscan::spectral::Sample;

/// Concrete display driver, generic over the I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const FONT_WIDTH: i32 = 6;
const LINE_HEIGHT: i32 = 11;

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Rotating footer hints on the plant menu.
const MENU_HINTS: [[&str; 2]; 4] = [
    ["MOVE THE", "JOYSTICK < >"],
    ["PRESS B", "TO SELECT"],
    ["PRESS A", "TO TREAT"],
    ["PRESS JOY", "TO SCAN"],
];

/// Rotating footer hints on the leaf menu.
const LEAF_HINTS: [[&str; 2]; 3] = [
    ["MOVE THE", "JOYSTICK < >"],
    ["PRESS B", "TO ANALYZE"],
    ["PRESS A", "TO GO BACK"],
];

/// OLED + matrix renderer for the interaction core.
pub struct UiRenderer<'d, I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    display: Display<I2C>,
    matrix: PioWs2812<'d, PIO0, 0, MATRIX_LEDS>,
}

impl<'d, I2C> UiRenderer<'d, I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 and clear both outputs.
    pub fn new(i2c: I2C, matrix: PioWs2812<'d, PIO0, 0, MATRIX_LEDS>) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        let _ = display.init();
        display.clear_buffer();
        let _ = display.flush();

        let mut renderer = Self { display, matrix };
        renderer.flush_matrix(&[Default::default(); MATRIX_LEDS]);
        renderer
    }

    fn flush_matrix(&mut self, frame: &Frame) {
        let mut leds = [RGB8::default(); MATRIX_LEDS];
        for (led, px) in leds.iter_mut().zip(frame.iter()) {
            *led = RGB8::new(px.0, px.1, px.2);
        }
        // The PIO shift is a short DMA transfer; blocking on it keeps the
        // renderer callable from the synchronous UI loop.
        block_on(self.matrix.write(&leds));
    }

    fn line(&mut self, text: &str, row: i32, col: i32) {
        let x = col * FONT_WIDTH;
        let y = 10 + row * LINE_HEIGHT;
        let _ = Text::new(text, Point::new(x, y), text_style()).draw(&mut self.display);
    }

    fn line_centered(&mut self, text: &str, row: i32) {
        let x = (128 - text.len() as i32 * FONT_WIDTH) / 2;
        let y = 10 + row * LINE_HEIGHT;
        let _ = Text::new(text, Point::new(x, y), text_style()).draw(&mut self.display);
    }

    fn footer(&mut self, hint: &[&str; 2]) {
        self.line_centered(hint[0], 3);
        self.line_centered(hint[1], 4);
    }

    fn bar(&mut self, left: i32, top: i32, width: u32, height: u32) {
        let _ = Rectangle::new(Point::new(left, top), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut self.display);
    }
}

impl<I2C> Renderer for UiRenderer<'_, I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn draw_plant_overview(&mut self, plant: &Plant, selected: Option<usize>) {
        let frame = plant_frame(plant, selected);
        self.flush_matrix(&frame);
    }

    fn draw_menu(&mut self, plant_index: usize, cost: u32, message: u8) {
        self.display.clear_buffer();

        self.line("<", 0, 0);
        let mut header: heapless::String<20> = heapless::String::new();
        let _ = write!(header, "PLANT: {}/5", plant_index + 1);
        self.line_centered(header.as_str(), 0);
        self.line(">", 0, 20);

        let mut cost_line: heapless::String<20> = heapless::String::new();
        let _ = write!(cost_line, "COST: {}.00", cost);
        self.line_centered(cost_line.as_str(), 1);

        self.footer(&MENU_HINTS[message as usize % MENU_HINTS.len()]);
        let _ = self.display.flush();
    }

    fn draw_leaf_menu(&mut self, leaf_index: usize, message: u8) {
        self.display.clear_buffer();

        self.line("<", 0, 0);
        let mut header: heapless::String<20> = heapless::String::new();
        let _ = write!(header, "LEAF: {}/5", leaf_index + 1);
        self.line_centered(header.as_str(), 0);
        self.line(">", 0, 20);

        self.footer(&LEAF_HINTS[message as usize % LEAF_HINTS.len()]);
        let _ = self.display.flush();
    }

    fn draw_analysis_result(&mut self, infected: bool, sample: &Sample, ndvi: f32, gndvi: f32) {
        self.display.clear_buffer();

        self.line_centered(if infected { "INFECTED" } else { "HEALTHY" }, 0);

        let mut buf: heapless::String<24> = heapless::String::new();
        let _ = write!(
            buf,
            "R:{}% G:{}%",
            (sample.r * 100.0) as i32,
            (sample.g * 100.0) as i32
        );
        self.line(buf.as_str(), 1, 0);

        buf.clear();
        let _ = write!(
            buf,
            "B:{}% NIR:{}%",
            (sample.b * 100.0) as i32,
            (sample.nir * 100.0) as i32
        );
        self.line(buf.as_str(), 2, 0);

        buf.clear();
        let _ = write!(buf, "NDVI: {:.2}", ndvi);
        self.line(buf.as_str(), 3, 0);

        buf.clear();
        let _ = write!(buf, "GNDVI: {:.2}", gndvi);
        self.line(buf.as_str(), 4, 0);

        let _ = self.display.flush();
    }

    fn draw_progress(&mut self, percent: u8) {
        self.display.clear_buffer();
        self.line_centered("ANALYZING", 1);
        self.bar(14, 35, percent as u32, 6);
        let _ = self.display.flush();
    }

    fn draw_calibration_chart(&mut self, sample: &Sample) {
        self.display.clear_buffer();

        // Four bars, 40 px of height per full-scale band, labels below.
        const COLUMNS: [i32; 4] = [4, 34, 64, 94];
        const LABELS: [&str; 4] = ["R", "G", "B", "NIR"];
        let base_y = 40;
        let values = [sample.r, sample.g, sample.b, sample.nir];

        for i in 0..4 {
            let height = ((values[i] * 40.0) as u32).min(base_y as u32);
            self.bar(COLUMNS[i], base_y - height as i32, 20, height);

            let mut buf: heapless::String<8> = heapless::String::new();
            let _ = write!(buf, "{}%", (values[i] * 100.0) as i32);
            let _ = Text::new(buf.as_str(), Point::new(COLUMNS[i], base_y + 10), text_style())
                .draw(&mut self.display);
            let _ = Text::new(LABELS[i], Point::new(COLUMNS[i] + 6, base_y + 21), text_style())
                .draw(&mut self.display);
        }

        let _ = self.display.flush();

        self.flush_matrix(&spectrum_frame(sample));
    }

    fn draw_treatment(&mut self, dots: u8) {
        self.display.clear_buffer();
        self.line_centered("TREATING PLANT", 2);
        let dot_str = match dots % 4 {
            0 => "",
            1 => ".",
            2 => "..",
            _ => "...",
        };
        self.line_centered(dot_str, 3);
        let _ = self.display.flush();
    }

    fn draw_already_treated(&mut self) {
        self.display.clear_buffer();
        self.line_centered("ALREADY", 2);
        self.line_centered("TREATED", 3);
        let _ = self.display.flush();
    }

    fn clear_all(&mut self) {
        self.display.clear_buffer();
        let _ = self.display.flush();
        self.flush_matrix(&[Default::default(); MATRIX_LEDS]);
    }
}
