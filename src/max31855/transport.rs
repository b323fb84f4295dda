use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{Mode, SpiBus, MODE_0};

/// SPI mode (CPOL = 0, CPHA = 0). The MAX31855 updates data on the falling
/// SCK edge for sampling on the rising edge, MSB first, at up to 5 MHz.
pub const MODE: Mode = MODE_0;

/// Settling time after each line transition in the bit-banged strategy and
/// after chip-select assertion in both strategies.
const SETTLE_MS: u32 = 1;

/// Errors in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Pin setting or sampling error
    Pin,
    /// SPI bus error
    Spi,
}

/// Delivers one 32-bit frame, bit-exact, regardless of the underlying
/// signaling strategy.
///
/// A disconnected or dead device is not detected at this layer: it clocks
/// in as all-ones or all-zeros, which the frame decoder surfaces through
/// the fault bits.
pub trait FrameTransport {
    type Error;

    /// Pull one fresh frame off the device, MSB first.
    fn acquire_frame(&mut self) -> Result<u32, Self::Error>;
}

/// Manually clocked (bit-banged) transport.
///
/// Drives SCK and CS directly and samples MISO, with a fixed settling delay
/// after every edge. Needs no SPI peripheral and makes no bus clock-rate
/// assumptions, at the cost of roughly 64 settling delays per frame.
pub struct BitBangTransport<Sck, Cs, Miso, D> {
    sck: Sck,
    cs: Cs,
    miso: Miso,
    delay: D,
}

impl<Sck, Cs, Miso, D> BitBangTransport<Sck, Cs, Miso, D>
where
    Sck: OutputPin,
    Cs: OutputPin,
    Miso: InputPin,
    D: DelayNs,
{
    /// The chip-select pin must be constructed deasserted (high).
    pub fn new(sck: Sck, cs: Cs, miso: Miso, delay: D) -> Self {
        Self {
            sck,
            cs,
            miso,
            delay,
        }
    }
}

impl<Sck, Cs, Miso, D> FrameTransport for BitBangTransport<Sck, Cs, Miso, D>
where
    Sck: OutputPin,
    Cs: OutputPin,
    Miso: InputPin,
    D: DelayNs,
{
    type Error = Error;

    fn acquire_frame(&mut self) -> Result<u32, Error> {
        self.sck.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(SETTLE_MS);
        // the device selects on this falling edge
        self.cs.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(SETTLE_MS);

        let mut frame = 0u32;
        for _ in 0..32 {
            self.sck.set_low().map_err(|_| Error::Pin)?;
            self.delay.delay_ms(SETTLE_MS);
            frame <<= 1;
            if self.miso.is_high().map_err(|_| Error::Pin)? {
                frame |= 1;
            }
            self.sck.set_high().map_err(|_| Error::Pin)?;
            self.delay.delay_ms(SETTLE_MS);
        }

        self.cs.set_high().map_err(|_| Error::Pin)?;
        Ok(frame)
    }
}

/// Hardware-assisted transport.
///
/// Bit timing is delegated to an SPI bus peripheral configured for [`MODE`]
/// at a conservative clock rate. The device is read-only, so the outgoing
/// bytes are don't-cares.
pub struct SpiTransport<Spi, Cs, D> {
    spi: Spi,
    cs: Cs,
    delay: D,
}

impl<Spi, Cs, D> SpiTransport<Spi, Cs, D>
where
    Spi: SpiBus,
    Cs: OutputPin,
    D: DelayNs,
{
    /// The bus must already be configured for [`MODE`]; the chip-select pin
    /// must be constructed deasserted (high).
    pub fn new(spi: Spi, cs: Cs, delay: D) -> Self {
        Self { spi, cs, delay }
    }
}

impl<Spi, Cs, D> FrameTransport for SpiTransport<Spi, Cs, D>
where
    Spi: SpiBus,
    Cs: OutputPin,
    D: DelayNs,
{
    type Error = Error;

    fn acquire_frame(&mut self) -> Result<u32, Error> {
        self.cs.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(SETTLE_MS);

        let mut buf = [0u8; 4];
        self.spi.transfer(&mut buf, &[0u8; 4]).map_err(|_| Error::Spi)?;
        self.spi.flush().map_err(|_| Error::Spi)?;

        self.cs.set_high().map_err(|_| Error::Pin)?;
        // explicit byte order, independent of host layout
        Ok(u32::from_be_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use std::vec::Vec;

    const FRAME: u32 = 0x0191_8003;

    fn sck_expectations() -> Vec<PinTransaction> {
        let mut t = vec![PinTransaction::set(PinState::Low)];
        for _ in 0..32 {
            t.push(PinTransaction::set(PinState::Low));
            t.push(PinTransaction::set(PinState::High));
        }
        t
    }

    fn cs_expectations() -> Vec<PinTransaction> {
        vec![
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]
    }

    fn miso_expectations(frame: u32) -> Vec<PinTransaction> {
        (0..32)
            .rev()
            .map(|bit| {
                if frame & (1 << bit) != 0 {
                    PinTransaction::get(PinState::High)
                } else {
                    PinTransaction::get(PinState::Low)
                }
            })
            .collect()
    }

    fn bitbang_acquire(frame: u32) -> u32 {
        let sck = PinMock::new(&sck_expectations());
        let cs = PinMock::new(&cs_expectations());
        let miso = PinMock::new(&miso_expectations(frame));
        let (mut sck_done, mut cs_done, mut miso_done) = (sck.clone(), cs.clone(), miso.clone());

        let mut transport = BitBangTransport::new(sck, cs, miso, NoopDelay::new());
        let acquired = transport.acquire_frame().unwrap();

        sck_done.done();
        cs_done.done();
        miso_done.done();
        acquired
    }

    fn spi_acquire(frame: u32) -> u32 {
        let expectations = [
            SpiTransaction::transfer(vec![0u8; 4], frame.to_be_bytes().to_vec()),
            SpiTransaction::flush(),
        ];
        let spi = SpiMock::new(&expectations);
        let cs = PinMock::new(&cs_expectations());
        let (mut spi_done, mut cs_done) = (spi.clone(), cs.clone());

        let mut transport = SpiTransport::new(spi, cs, NoopDelay::new());
        let acquired = transport.acquire_frame().unwrap();

        spi_done.done();
        cs_done.done();
        acquired
    }

    #[test]
    fn bitbang_reconstructs_msb_first() {
        assert_eq!(bitbang_acquire(FRAME), FRAME);
        assert_eq!(bitbang_acquire(0x8000_0001), 0x8000_0001);
    }

    #[test]
    fn spi_reassembles_big_endian() {
        assert_eq!(spi_acquire(FRAME), FRAME);
        assert_eq!(spi_acquire(0x0102_0304), 0x0102_0304);
    }

    #[test]
    fn transports_are_equivalent() {
        for frame in [0x0000_0000, 0xFFFF_FFFF, FRAME, 0x0640_0000, 0xDEAD_BEEF] {
            assert_eq!(bitbang_acquire(frame), spi_acquire(frame));
        }
    }
}
