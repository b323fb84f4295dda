#![deny(unsafe_code)]
#![no_std]
#![allow(non_snake_case)] // Allow non-snake-case crate name (ThermoLink-rs)

//! Driver for the MAX31855 cold-junction compensated thermocouple-to-digital
//! converter.
//!
//! The device is read-only: every read cycle shifts one 32-bit frame off the
//! chip, carrying the linearized probe temperature, the internal reference
//! junction temperature and three probe fault bits. The frame can be pulled
//! either by bit-banging the clock/select/data lines directly or through a
//! hardware SPI peripheral; both transports reconstruct the identical value.
//!
//! ## Usage
//! ```
//! use ThermoLink_rs::{FrameTransport, Max31855};
//!
//! fn sample<T: FrameTransport>(sensor: &mut Max31855<T>) -> Result<f32, T::Error> {
//!     if sensor.read_fault_status()?.has_fault() {
//!         return Ok(f32::NAN);
//!     }
//!     sensor.read_celsius()
//! }
//! ```

pub mod max31855;

pub use max31855::transport::{BitBangTransport, Error, FrameTransport, SpiTransport, MODE};
pub use max31855::{FaultStatus, Max31855};

#[cfg(all(test, not(all(target_arch = "arm", target_os = "none"))))]
#[macro_use]
extern crate std;

/// Log faults for a sensor
#[cfg(feature = "defmt")]
pub fn log_faults(sensor_num: u8, faults: &FaultStatus) {
    if faults.open {
        defmt::warn!("Sensor {} - Open circuit fault", sensor_num);
    }
    if faults.short_to_ground {
        defmt::warn!("Sensor {} - Short to GND fault", sensor_num);
    }
    if faults.short_to_supply {
        defmt::warn!("Sensor {} - Short to VCC fault", sensor_num);
    }
}
