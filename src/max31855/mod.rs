//! MAX31855 cold-junction compensated thermocouple-to-digital converter.
//!
//! The chip has no registers to configure: each read cycle streams one
//! 32-bit frame. Every public read pulls a fresh frame through the
//! transport selected at construction and decodes the relevant fields, so
//! no reading is ever served from a stale sample.

pub mod frame;
pub mod transport;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use transport::{BitBangTransport, FrameTransport, SpiTransport};

/// Probe-side fault flags decoded from a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultStatus {
    pub open: bool,            // Thermocouple Open-Circuit Fault
    pub short_to_ground: bool, // Thermocouple Short to GND Fault
    pub short_to_supply: bool, // Thermocouple Short to VCC Fault
}

impl FaultStatus {
    pub fn from_frame(frame: u32) -> Self {
        Self {
            open: (frame & frame::FAULT_OPEN) != 0,
            short_to_ground: (frame & frame::FAULT_SHORT_GND) != 0,
            short_to_supply: (frame & frame::FAULT_SHORT_VCC) != 0,
        }
    }

    pub fn has_fault(&self) -> bool {
        self.open || self.short_to_ground || self.short_to_supply
    }

    /// The raw 3-bit fault code, range 0..=7
    pub fn bits(&self) -> u8 {
        (self.open as u8) | (self.short_to_ground as u8) << 1 | (self.short_to_supply as u8) << 2
    }
}

/// MAX31855 driver over a frame transport fixed at construction time.
pub struct Max31855<T> {
    transport: T,
}

impl<Sck, Cs, Miso, D> Max31855<BitBangTransport<Sck, Cs, Miso, D>>
where
    Sck: OutputPin,
    Cs: OutputPin,
    Miso: InputPin,
    D: DelayNs,
{
    /// Manual (bit-banged) strategy: the clock, chip-select and data-in
    /// lines are driven directly, with `delay` providing the per-edge
    /// settling time.
    pub fn bitbang(sck: Sck, cs: Cs, miso: Miso, delay: D) -> Self {
        Self::new(BitBangTransport::new(sck, cs, miso, delay))
    }
}

impl<Spi, Cs, D> Max31855<SpiTransport<Spi, Cs, D>>
where
    Spi: SpiBus,
    Cs: OutputPin,
    D: DelayNs,
{
    /// Hardware-assisted strategy: `spi` is the host's bus, configured for
    /// [`transport::MODE`] at a conservative clock rate.
    pub fn spi(spi: Spi, cs: Cs, delay: D) -> Self {
        Self::new(SpiTransport::new(spi, cs, delay))
    }
}

impl<T: FrameTransport> Max31855<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The verbatim 32-bit frame, as shifted off the device MSB first.
    pub fn read_raw(&mut self) -> Result<u32, T::Error> {
        self.transport.acquire_frame()
    }

    /// Internal (cold-junction reference) temperature in degrees Celsius.
    ///
    /// Never fault-gated: a disconnected device still yields a number,
    /// physically meaningless as it may be.
    pub fn read_internal(&mut self) -> Result<f32, T::Error> {
        Ok(frame::internal_celsius(self.transport.acquire_frame()?))
    }

    /// Probe temperature in degrees Celsius, or NAN when a fault bit is
    /// set. Use [`Max31855::read_fault_status`] for fault detail.
    pub fn read_celsius(&mut self) -> Result<f32, T::Error> {
        Ok(frame::probe_celsius(self.transport.acquire_frame()?))
    }

    /// Probe temperature in degrees Fahrenheit, or NAN when a fault bit is
    /// set.
    pub fn read_fahrenheit(&mut self) -> Result<f32, T::Error> {
        Ok(frame::probe_fahrenheit(self.transport.acquire_frame()?))
    }

    /// Probe-side fault flags. Decoding the flags never fails; only the
    /// transport plumbing can.
    pub fn read_fault_status(&mut self) -> Result<FaultStatus, T::Error> {
        Ok(FaultStatus::from_frame(self.transport.acquire_frame()?))
    }
}
