//! Hardware abstraction: time source and the expander register bus

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Tick-count instant stand-in used when no embassy time driver is linked
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Instant(u64);

    impl Instant {
        pub fn now() -> Self {
            Self(0) // Placeholder implementation
        }

        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub fn duration_since(&self, other: Instant) -> Duration {
            Duration::from_millis(self.0.saturating_sub(other.0))
        }

        pub const fn as_millis(&self) -> u64 {
            self.0
        }
    }

    /// Tick-count duration stand-in
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms)
        }

        pub const fn from_secs(s: u64) -> Self {
            Self(s * 1_000)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0
        }
    }

    impl core::ops::Div<u32> for Duration {
        type Output = Duration;

        fn div(self, rhs: u32) -> Duration {
            Duration(self.0 / rhs as u64)
        }
    }

    impl core::ops::Mul<u32> for Duration {
        type Output = Duration;

        fn mul(self, rhs: u32) -> Duration {
            Duration(self.0 * rhs as u64)
        }
    }
}

use embedded_hal::i2c::{Error as I2cError, ErrorKind, I2c};

/// Errors surfaced by the expander register bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Device did not acknowledge its address or a data byte
    Nack,
    /// Any other bus-level fault (arbitration, framing, overrun)
    Bus,
}

#[cfg(feature = "std")]
impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BusError::Nack => write!(f, "device did not acknowledge"),
            BusError::Bus => write!(f, "bus fault"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BusError {}

/// Byte-register access to an I2C-attached expander.
///
/// The capture engine owns the bus exclusively, so implementations need no
/// internal locking.
pub trait RegisterBus {
    /// Write one register of the device at `address`
    fn write(&mut self, address: u8, register: u8, value: u8) -> Result<(), BusError>;

    /// Read one register of the device at `address`
    fn read(&mut self, address: u8, register: u8) -> Result<u8, BusError>;
}

/// Adapter binding any blocking `embedded-hal` I2C bus to the register
/// contract: register writes are `[register, value]` frames, register reads
/// a write-read of the register address.
pub struct I2cRegisterBus<I> {
    i2c: I,
}

impl<I> I2cRegisterBus<I>
where
    I: I2c,
{
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Give the bus back (for sharing with other bus users at shutdown)
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I> RegisterBus for I2cRegisterBus<I>
where
    I: I2c,
{
    fn write(&mut self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
        self.i2c
            .write(address, &[register, value])
            .map_err(classify)
    }

    fn read(&mut self, address: u8, register: u8) -> Result<u8, BusError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(address, &[register], &mut value)
            .map_err(classify)?;
        Ok(value[0])
    }
}

fn classify<E: I2cError>(err: E) -> BusError {
    match err.kind() {
        ErrorKind::NoAcknowledge(_) => BusError::Nack,
        _ => BusError::Bus,
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock register bus for testing

    use super::{BusError, RegisterBus};
    use crate::expander::regs;
    use crate::types::Port;

    /// RAM-backed register file with the expander's latch semantics:
    /// reading an interrupt-capture register clears that port's flag
    /// register and re-arms the capture byte to all-high.
    pub struct MockBus {
        regs: [u8; 32],
        /// Total register reads performed
        pub reads: usize,
        /// Total register writes performed
        pub writes: usize,
        fail_next: Option<BusError>,
    }

    impl MockBus {
        pub fn new() -> Self {
            let mut regs = [0u8; 32];
            // reset defaults: all inputs, beams unobstructed (lines high)
            regs[regs::IODIRA as usize] = 0xFF;
            regs[regs::IODIRB as usize] = 0xFF;
            regs[regs::GPIOA as usize] = 0xFF;
            regs[regs::GPIOB as usize] = 0xFF;
            regs[regs::INTCAPA as usize] = 0xFF;
            regs[regs::INTCAPB as usize] = 0xFF;
            Self {
                regs,
                reads: 0,
                writes: 0,
                fail_next: None,
            }
        }

        /// Latch raw flag and capture bytes for one port
        pub fn latch(&mut self, port: Port, flags: u8, captured: u8) {
            self.regs[regs::intf(port) as usize] = flags;
            self.regs[regs::intcap(port) as usize] = captured;
        }

        /// Latch a falling edge on a single line, as the chip would when a
        /// beam becomes obstructed
        pub fn latch_falling(&mut self, port: Port, channel: usize) {
            self.regs[regs::intf(port) as usize] |= 1 << channel;
            self.regs[regs::intcap(port) as usize] &= !(1 << channel);
        }

        /// Latch a rising edge (beam restored); flagged but captured high
        pub fn latch_rising(&mut self, port: Port, channel: usize) {
            self.regs[regs::intf(port) as usize] |= 1 << channel;
            self.regs[regs::intcap(port) as usize] |= 1 << channel;
        }

        /// Make the next bus operation fail once
        pub fn fail_next(&mut self, err: BusError) {
            self.fail_next = Some(err);
        }

        /// Current value of one register, without latch side effects
        pub fn register(&self, register: u8) -> u8 {
            self.regs[register as usize]
        }
    }

    impl Default for MockBus {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RegisterBus for MockBus {
        fn write(&mut self, _address: u8, register: u8, value: u8) -> Result<(), BusError> {
            if let Some(err) = self.fail_next.take() {
                return Err(err);
            }
            self.writes += 1;
            self.regs[register as usize] = value;
            Ok(())
        }

        fn read(&mut self, _address: u8, register: u8) -> Result<u8, BusError> {
            if let Some(err) = self.fail_next.take() {
                return Err(err);
            }
            self.reads += 1;
            let value = self.regs[register as usize];
            // INTCAP read clears the latched interrupt condition
            for port in Port::ALL {
                if register == regs::intcap(port) {
                    self.regs[regs::intf(port) as usize] = 0;
                    self.regs[regs::intcap(port) as usize] = 0xFF;
                }
            }
            Ok(value)
        }
    }

}
