//! Tilt maze firmware.
//!
//! Bring-up runs on core 0: panel, splash, IMU probe and configuration,
//! level calibration. Any failure there parks the board in a halted state
//! with a red screen and a blinking LED strip.
//!
//! Afterwards the sense/decide tasks move to core 1, so SPI traffic to the
//! panel never delays them. The sensor sampler runs on an interrupt executor
//! there and preempts the game logic and clock timer on the thread executor.
//! Core 0 keeps the renderer, the button sampler and the clock overlay.

#![no_std]
#![no_main]

use defmt::{
    error,
    info,
    warn,
};
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    Blocking,
    i2c::master::I2c,
    interrupt::{
        Priority,
        software::SoftwareInterruptControl,
    },
    timer::timg::TimerGroup,
};
use esp_println as _;
use esp_rtos::embassy::{
    Executor,
    InterruptExecutor,
};
use palette::named;
use tilt_maze::{
    Backlight,
    Button,
    Display,
    ImuResources,
    Leds,
    imu::{
        self,
        Mpu6050,
    },
    mk_static,
    split_resources,
};
use tilt_maze_core::{
    Config,
    DisplayLock,
    Game,
    Shared,
    StartupError,
    render,
    tasks,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

type Imu = Mpu6050<I2c<'static, Blocking>>;
type Panel = DisplayLock<Display<'static>>;

static SHARED: Shared = Shared::new();

const SETTLE: Duration = Duration::from_secs(1);
const CALIBRATED_HOLD: Duration = Duration::from_millis(500);
const FAULT_BLINK: Duration = Duration::from_millis(500);

// ── Tasks ───────────────────────────────────────────────────────────────────

#[embassy_executor::task]
async fn sensor_task(imu: &'static mut Imu, period: Duration) {
    tasks::sensor_sampler(imu, &SHARED, period).await
}

#[embassy_executor::task]
async fn logic_task(game: &'static mut Game, period: Duration) {
    tasks::game_logic(game, &SHARED, period).await
}

#[embassy_executor::task]
async fn clock_task(period: Duration) {
    tasks::clock_timer(&SHARED.clock, period).await
}

#[embassy_executor::task]
async fn render_task(panel: &'static Panel, config: Config) {
    tasks::renderer(panel, &SHARED, config.geometry, config.timing).await
}

#[embassy_executor::task]
async fn input_task(button: &'static mut Button, period: Duration) {
    tasks::input_sampler(button, &SHARED.button, period).await
}

#[embassy_executor::task]
async fn clock_render_task(panel: &'static Panel, config: Config) {
    tasks::clock_renderer(panel, &SHARED.clock, config.geometry, config.timing).await
}

// ── Bring-up ────────────────────────────────────────────────────────────────

fn draw<E>(result: Result<(), E>) {
    if result.is_err() {
        warn!("boot screen draw failed");
    }
}

fn bring_up_imu(res: ImuResources<'static>) -> Result<Imu, StartupError> {
    let mut imu = Mpu6050::probe(imu::bus(res)?)?;
    imu.configure()?;
    Ok(imu)
}

/// Terminal state for a failed start. Nothing else is ever spawned.
async fn halt(display: Option<&mut Display<'static>>, mut leds: Option<Leds<'static>>, err: StartupError) -> ! {
    error!("startup failed: {}", err);
    if let Some(display) = display {
        draw(render::draw_startup_failure(display, err));
    }

    let mut lit = false;
    loop {
        if let Some(leds) = leds.as_mut() {
            lit = !lit;
            if lit {
                leds.fill(named::DARKRED);
            } else {
                leds.clear();
            }
            leds.update().await;
        }
        Timer::after(FAULT_BLINK).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = tilt_maze::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("tilt maze starting");
    let config = Config::default().with_map_select(true);

    let leds = resources.leds.into_leds();
    if leds.is_none() {
        warn!("LED strip unavailable");
    }
    let mut backlight = Backlight::from(resources.backlight);

    let mut display = match Display::try_from(resources.display) {
        Ok(display) => display,
        Err(err) => halt(None, leds, err).await,
    };
    draw(render::draw_splash(&mut display));
    backlight.on();
    info!("display up");

    let imu = match bring_up_imu(resources.imu) {
        Ok(imu) => mk_static!(Imu, imu),
        Err(err) => halt(Some(&mut display), leds, err).await,
    };

    draw(render::draw_calibrating(&mut display));
    Timer::after(SETTLE).await;
    let calibration = tasks::calibrate(imu, config.calibration_samples, config.calibration_interval).await;
    draw(render::draw_calibrated(&mut display));
    Timer::after(CALIBRATED_HOLD).await;

    let game = mk_static!(Game, Game::new(config, calibration));

    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    let sensor_int = sw_ints.software_interrupt2;
    let core1_stack = mk_static!(esp_hal::system::Stack<8192>, esp_hal::system::Stack::new());

    esp_rtos::start_second_core::<8192>(
        peripherals.CPU_CTRL,
        sw_ints.software_interrupt0,
        sw_ints.software_interrupt1,
        core1_stack,
        move || {
            let sensing = mk_static!(InterruptExecutor<2>, InterruptExecutor::new(sensor_int));
            sensing
                .start(Priority::Priority2)
                .must_spawn(sensor_task(imu, config.timing.sensor_period));

            let executor = mk_static!(Executor, Executor::new());
            executor.run(move |spawner| {
                spawner.must_spawn(logic_task(game, config.timing.logic_period));
                spawner.must_spawn(clock_task(config.timing.clock_period));
            });
        },
    );

    let panel = mk_static!(Panel, DisplayLock::new(display));
    let button = mk_static!(Button, resources.button.into());

    spawner.must_spawn(render_task(panel, config));
    spawner.must_spawn(input_task(button, config.timing.input_period));
    spawner.must_spawn(clock_render_task(panel, config));
    info!("all tasks running");

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
