// MotionCoach — Motion Sensor Source
//
// The pipeline reads acceleration and angular velocity through `MotionSensor`.
// Driver errors never reach it: the provided methods substitute a zeroed
// sample and log the failure.

use crate::events::Axes;

pub trait MotionSensor {
    /// Linear acceleration in mg.
    fn read_acceleration(&mut self) -> anyhow::Result<Axes>;

    /// Angular velocity in mdps.
    fn read_angular_velocity(&mut self) -> anyhow::Result<Axes>;

    fn linear_acceleration(&mut self) -> Axes {
        self.read_acceleration().unwrap_or_else(|e| {
            log::warn!("Accelerometer read error: {}", e);
            Axes::ZERO
        })
    }

    fn angular_velocity(&mut self) -> Axes {
        self.read_angular_velocity().unwrap_or_else(|e| {
            log::warn!("Gyroscope read error: {}", e);
            Axes::ZERO
        })
    }
}

// ---------------------------------------------------------------------------
// MPU6050 register-level driver (device only)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
pub use device::Mpu6050;

#[cfg(target_os = "espidf")]
mod device {
    use esp_idf_hal::i2c::I2cDriver;

    use super::MotionSensor;
    use crate::config::*;
    use crate::events::Axes;

    // MPU6050 register addresses
    const REG_PWR_MGMT_1: u8 = 0x6B;
    const REG_CONFIG: u8 = 0x1A;
    const REG_GYRO_CONFIG: u8 = 0x1B;
    const REG_ACCEL_CONFIG: u8 = 0x1C;
    const REG_ACCEL_XOUT_H: u8 = 0x3B; // 6-byte accel burst
    const REG_GYRO_XOUT_H: u8 = 0x43;  // 6-byte gyro burst
    const REG_WHO_AM_I: u8 = 0x75;
    const WHO_AM_I_EXPECTED: u8 = 0x68;

    pub struct Mpu6050 {
        bus: I2cDriver<'static>,
    }

    impl Mpu6050 {
        pub fn new(bus: I2cDriver<'static>) -> Self {
            Self { bus }
        }

        /// Verify the device is reachable on the I2C bus.
        pub fn is_connected(&mut self) -> bool {
            let mut buf = [0u8; 1];
            match self.bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
                Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
                Err(_) => false,
            }
        }

        /// Wake the sensor and configure accel (±8 g), gyro (±500 °/s), DLPF 21 Hz.
        pub fn init(&mut self) -> anyhow::Result<()> {
            // Wake up (clear SLEEP bit)
            self.bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)?;
            self.bus.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x04], I2C_TIMEOUT_TICKS)?;
            self.bus.write(I2C_ADDR_MPU6050, &[REG_GYRO_CONFIG, 0x08], I2C_TIMEOUT_TICKS)?;
            self.bus.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x10], I2C_TIMEOUT_TICKS)?;

            log::info!("MPU6050 initialised (±8g, ±500°/s, DLPF 21Hz)");
            Ok(())
        }

        fn read_burst(&mut self, reg: u8) -> anyhow::Result<[i16; 3]> {
            let mut raw = [0u8; 6];
            self.bus.write_read(I2C_ADDR_MPU6050, &[reg], &mut raw, I2C_TIMEOUT_TICKS)?;
            Ok([
                i16::from_be_bytes([raw[0], raw[1]]),
                i16::from_be_bytes([raw[2], raw[3]]),
                i16::from_be_bytes([raw[4], raw[5]]),
            ])
        }
    }

    fn scaled(raw: [i16; 3], lsb_per_unit: f32) -> Axes {
        let milli = |v: i16| (v as f32 * MILLI_PER_UNIT / lsb_per_unit) as i32;
        Axes::new(milli(raw[0]), milli(raw[1]), milli(raw[2]))
    }

    impl MotionSensor for Mpu6050 {
        fn read_acceleration(&mut self) -> anyhow::Result<Axes> {
            Ok(scaled(self.read_burst(REG_ACCEL_XOUT_H)?, ACCEL_SCALE_8G))
        }

        fn read_angular_velocity(&mut self) -> anyhow::Result<Axes> {
            Ok(scaled(self.read_burst(REG_GYRO_XOUT_H)?, GYRO_SCALE_500))
        }
    }
}
