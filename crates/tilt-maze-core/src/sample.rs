//! Raw IMU samples and the level calibration applied to them.

/// One six-axis reading in raw sensor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InertialSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

/// A six-axis inertial sensor.
///
/// `read` performs one complete burst read. A failed read is transient: the
/// caller drops that tick and tries again on the next one.
pub trait InertialSensor {
    type Error;

    fn read(&mut self) -> Result<InertialSample, Self::Error>;
}

/// Tilt in screen coordinates (+x right, +y down), in calibrated raw units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    pub x: f32,
    pub y: f32,
}

/// Accelerometer offsets measured with the board lying level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub offset_x: i16,
    pub offset_y: i16,
}

impl Calibration {
    /// Maps a sample onto the screen axes.
    ///
    /// The IMU is mounted rotated by 90°: tilting the board toward the user
    /// drives `ax` negative while screen y grows downward, and sensor y runs
    /// against screen x.
    pub fn tilt(&self, sample: &InertialSample) -> Tilt {
        let x = i32::from(sample.ax) - i32::from(self.offset_x);
        let y = i32::from(sample.ay) - i32::from(self.offset_y);
        Tilt {
            x: -(y as f32),
            y: -(x as f32),
        }
    }
}

/// Running average of level readings.
#[derive(Debug, Default)]
pub struct Calibrator {
    sum_x: i32,
    sum_y: i32,
    count: u16,
}

impl Calibrator {
    pub const fn new() -> Self {
        Self {
            sum_x: 0,
            sum_y: 0,
            count: 0,
        }
    }

    pub fn add(&mut self, sample: &InertialSample) {
        self.sum_x += i32::from(sample.ax);
        self.sum_y += i32::from(sample.ay);
        self.count = self.count.saturating_add(1);
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    /// Mean over the readings that succeeded; zero offsets when none did.
    pub fn finish(&self) -> Calibration {
        if self.count == 0 {
            return Calibration::default();
        }
        let n = i32::from(self.count);
        Calibration {
            offset_x: (self.sum_x / n) as i16,
            offset_y: (self.sum_y / n) as i16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ax: i16, ay: i16) -> InertialSample {
        InertialSample {
            ax,
            ay,
            az: 16384,
            ..Default::default()
        }
    }

    #[test]
    fn tilt_subtracts_offsets_and_rotates() {
        let cal = Calibration {
            offset_x: 100,
            offset_y: -50,
        };
        let tilt = cal.tilt(&sample(1100, 950));
        assert_eq!(tilt.x, -1000.0);
        assert_eq!(tilt.y, -1000.0);
    }

    #[test]
    fn tilt_does_not_overflow_at_extremes() {
        let cal = Calibration {
            offset_x: i16::MAX,
            offset_y: i16::MAX,
        };
        let tilt = cal.tilt(&sample(i16::MIN, i16::MIN));
        assert_eq!(tilt.y, 65535.0);
        assert_eq!(tilt.x, 65535.0);
    }

    #[test]
    fn calibrator_averages_successful_reads() {
        let mut cal = Calibrator::new();
        cal.add(&sample(10, -20));
        cal.add(&sample(30, -40));
        assert_eq!(cal.count(), 2);
        assert_eq!(
            cal.finish(),
            Calibration {
                offset_x: 20,
                offset_y: -30
            }
        );
    }

    #[test]
    fn calibrator_without_reads_is_zero() {
        assert_eq!(Calibrator::new().finish(), Calibration::default());
    }
}
