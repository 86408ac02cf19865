//! WS2812 strip on the RMT peripheral.
//!
//! The game only uses it to signal a failed start, so the API is just
//! whole-strip colour plus flush.

extern crate alloc;

use defmt::error;
use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::{
    Blocking,
    gpio::Level,
    rmt::{
        PulseCode,
        Tx,
    },
};
use palette::Srgb;

/// Two bars of five.
pub const LED_COUNT: usize = 10;

pub struct Leds<'a> {
    channel: Option<esp_hal::rmt::Channel<'a, Blocking, Tx>>,
    framebuffer: [Srgb<u8>; LED_COUNT],
}

impl<'a> Leds<'a> {
    pub const fn new(channel: esp_hal::rmt::Channel<'a, Blocking, Tx>) -> Self {
        Self {
            channel: Some(channel),
            framebuffer: [Srgb::new(0, 0, 0); LED_COUNT],
        }
    }

    pub fn fill(&mut self, color: Srgb<u8>) {
        self.framebuffer.fill(color);
    }

    pub fn clear(&mut self) {
        self.fill(Srgb::new(0, 0, 0));
    }

    /// Sends the frame buffer to the strip.
    pub async fn update(&mut self) {
        let Some(channel) = self.channel.take() else {
            error!("LED channel lost in an earlier transfer");
            return;
        };

        // GRB on the wire.
        let pulses = self
            .framebuffer
            .iter()
            .flat_map(|c| [c.green, c.red, c.blue])
            .flat_map(byte_pulses)
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect::<alloc::vec::Vec<_>>();

        let transaction = match channel.transmit(&pulses) {
            Ok(t) => t,
            Err(e) => {
                error!("LED transmit failed: {}", e);
                return;
            }
        };

        self.channel = Some(match transaction.wait() {
            Ok(ch) => ch,
            Err((err, ch)) => {
                error!("LED transfer failed: {}", err);
                ch
            }
        });

        // Latch.
        Timer::after(Duration::from_micros(50)).await;
    }
}

/// One bit at 40 MHz: `1` is 0.8 µs high / 0.45 µs low, `0` is 0.4 / 0.85.
const fn bit_pulse(bit: bool) -> PulseCode {
    if bit {
        PulseCode::new(Level::High, 32, Level::Low, 18)
    } else {
        PulseCode::new(Level::High, 16, Level::Low, 34)
    }
}

fn byte_pulses(byte: u8) -> [PulseCode; 8] {
    core::array::from_fn(|i| bit_pulse(byte & (0x80 >> i) != 0))
}
