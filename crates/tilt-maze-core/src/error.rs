use core::fmt;

/// Bring-up failures. Any of these parks the firmware in the halted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// The panel did not accept its init sequence.
    Display,
    /// No IMU answered at either bus address.
    SensorMissing,
    /// The IMU answered but rejected its configuration writes.
    SensorConfig,
    /// The I2C peripheral could not be set up.
    Bus,
}

impl StartupError {
    /// Short line for the failure screen.
    pub fn banner(self) -> &'static str {
        match self {
            StartupError::Display => "DISPLAY FAIL",
            StartupError::SensorMissing => "IMU NOT FOUND",
            StartupError::SensorConfig => "IMU CONFIG FAIL",
            StartupError::Bus => "I2C FAIL",
        }
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.banner())
    }
}
