//! # tilt-maze
//!
//! Board support for the tilt maze: an ESP32-S3 badge with an MPU6050 wired
//! to its I2C header.
//!
//! - **Display**: 320×170 ST7789 LCD over SPI with DMA, plus its backlight
//! - **Button**: the A button, used to restart after a round
//! - **IMU**: MPU6050 accelerometer/gyro on I2C0
//! - **LEDs**: the WS2812 strip, used as a fault indicator
//!
//! The game itself lives in `tilt-maze-core`; this crate turns pins into the
//! types that crate expects.
//!
//! ```rust,ignore
//! let peripherals = tilt_maze::init();
//! let resources = tilt_maze::split_resources!(peripherals);
//!
//! let display = tilt_maze::Display::try_from(resources.display)?;
//! let imu = tilt_maze::imu::Mpu6050::probe(tilt_maze::imu::bus(resources.imu)?)?;
//! ```

#![no_std]

mod button;
mod display;
pub mod imu;
mod leds;

pub use button::Button;
pub use display::{
    Backlight,
    Display,
};
use esp_hal::{
    assign_resources,
    clock::{
        Clock,
        CpuClock,
    },
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    rmt::{
        Rmt,
        TxChannelConfig,
        TxChannelCreator as _,
    },
    rom,
    time::Rate,
};
pub use leds::Leds;

/// Puts a value into a `static` exactly once and returns `&'static mut` to it.
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

// ── Pin / peripheral assignments ────────────────────────────────────────────

assign_resources! {
    pub Resources<'d> {
        display: DisplayResources<'d> {
            dc: GPIO15,
            rst: GPIO7,
            sck: GPIO4,
            cs: GPIO6,
            miso: GPIO16,
            mosi: GPIO5,
            spi: SPI2,
            dma: DMA_CH0,
        },
        backlight: BacklightResources<'d> {
            led: GPIO19,
        },
        button: ButtonResources<'d> {
            a: GPIO13,
        },
        leds: LedResources<'d> {
            power: GPIO17,
            io: GPIO18,
            rmt: RMT,
        },
        imu: ImuResources<'d> {
            sda: GPIO9,
            scl: GPIO10,
            i2c: I2C0,
        }
    }
}

// ── Board initialisation ────────────────────────────────────────────────────

/// Moves the CPU onto the PLL at 160 MHz.
///
/// The S3 must pass through an intermediate frequency before `esp_hal::init`
/// raises it to the maximum.
fn step_cpu_clock() {
    let system = esp_hal::peripherals::SYSTEM::regs();
    let _ = system
        .sysclk_conf()
        .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
    let _ = system.cpu_per_conf().modify(|_, w| unsafe {
        let _ = w.pll_freq_sel().set_bit();
        w.cpuperiod_sel().bits(1)
    });

    rom::ets_update_cpu_frequency_rom(CpuClock::_160MHz.frequency().as_mhz());
}

/// Brings up clocks and returns the raw peripherals.
///
/// Call once at the top of `main`, then split with [`split_resources!`].
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    step_cpu_clock();
    esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()))
}

impl<'a> LedResources<'a> {
    /// Powers the strip and claims an RMT channel for it.
    ///
    /// `None` if the RMT peripheral refuses the configuration; the firmware
    /// then runs without a fault indicator.
    pub fn into_leds(self) -> Option<Leds<'a>> {
        let _power = Output::new(self.power, Level::High, OutputConfig::default());
        let rmt = Rmt::new(self.rmt, Rate::from_mhz(40)).ok()?;
        let tx_config = TxChannelConfig::default().with_clk_divider(1);
        let channel = rmt.channel0.configure_tx(self.io, tx_config).ok()?;
        Some(Leds::new(channel))
    }
}
