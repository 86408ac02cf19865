//! MPU6050 six-axis IMU over I2C.
//!
//! Only what the game needs: find the chip, wake it with fixed ranges and
//! burst-read one sample. Generic over [`embedded_hal::i2c::I2c`].

use defmt::{
    info,
    warn,
};
use embedded_hal::i2c::I2c;
use esp_hal::{
    Blocking,
    i2c::master::{
        Config,
        I2c as EspI2c,
    },
    time::Rate,
};
use tilt_maze_core::{
    StartupError,
    sample::{
        InertialSample,
        InertialSensor,
    },
};

use crate::ImuResources;

/// AD0 low, then AD0 high.
pub const ADDRESSES: [u8; 2] = [0x68, 0x69];

mod reg {
    pub const SMPLRT_DIV: u8 = 0x19;
    pub const CONFIG: u8 = 0x1A;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

/// Register writes done after the probe, in order.
const SETUP: [(u8, u8); 5] = [
    // Leave sleep, internal 8 MHz oscillator.
    (reg::PWR_MGMT_1, 0x00),
    // 1 kHz / (1 + 9) = 100 Hz.
    (reg::SMPLRT_DIV, 9),
    // DLPF 44 Hz accel / 42 Hz gyro.
    (reg::CONFIG, 0x03),
    // ±250 °/s.
    (reg::GYRO_CONFIG, 0x00),
    // ±2 g.
    (reg::ACCEL_CONFIG, 0x00),
];

#[derive(Debug, defmt::Format)]
pub enum ImuError<E> {
    /// Nothing answered at any of [`ADDRESSES`].
    NotFound,
    Bus(E),
}

impl<E> From<ImuError<E>> for StartupError {
    fn from(err: ImuError<E>) -> Self {
        match err {
            ImuError::NotFound => StartupError::SensorMissing,
            ImuError::Bus(_) => StartupError::SensorConfig,
        }
    }
}

/// Blocking 400 kHz I2C master on the IMU pins.
pub fn bus(res: ImuResources<'static>) -> Result<EspI2c<'static, Blocking>, StartupError> {
    let i2c = EspI2c::new(res.i2c, Config::default().with_frequency(Rate::from_khz(400)))
        .map_err(|_| StartupError::Bus)?
        .with_sda(res.sda)
        .with_scl(res.scl);
    Ok(i2c)
}

pub struct Mpu6050<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Mpu6050<I> {
    /// Looks for the chip at each address by reading `WHO_AM_I`.
    ///
    /// Any answer is accepted; clones report values other than `0x68`.
    pub fn probe(mut i2c: I) -> Result<Self, ImuError<I::Error>> {
        for address in ADDRESSES {
            let mut who = [0u8];
            match i2c.write_read(address, &[reg::WHO_AM_I], &mut who) {
                Ok(()) => {
                    info!("MPU6050 at {=u8:#x}, WHO_AM_I={=u8:#x}", address, who[0]);
                    return Ok(Self { i2c, address });
                }
                Err(_) => warn!("no IMU at {=u8:#x}", address),
            }
        }
        Err(ImuError::NotFound)
    }

    pub fn configure(&mut self) -> Result<(), ImuError<I::Error>> {
        for (register, value) in SETUP {
            self.i2c
                .write(self.address, &[register, value])
                .map_err(ImuError::Bus)?;
        }
        info!("MPU6050 configured");
        Ok(())
    }
}

/// Big-endian accel, temperature, gyro block starting at `ACCEL_XOUT_H`.
fn decode(raw: &[u8; 14]) -> InertialSample {
    let word = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]);
    InertialSample {
        ax: word(0),
        ay: word(2),
        az: word(4),
        gx: word(8),
        gy: word(10),
        gz: word(12),
    }
}

impl<I: I2c> InertialSensor for Mpu6050<I> {
    type Error = I::Error;

    fn read(&mut self) -> Result<InertialSample, I::Error> {
        let mut raw = [0u8; 14];
        self.i2c
            .write_read(self.address, &[reg::ACCEL_XOUT_H], &mut raw)?;
        Ok(decode(&raw))
    }
}
