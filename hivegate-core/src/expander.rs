//! Thin driver for the MCP23017-class I2C GPIO expander
//!
//! Only the registers the crossing engine depends on are covered: direction
//! and pull-up configuration (setup time), interrupt enable/control (setup
//! time), and the flag/capture pair (hot path). Bus transactions go through
//! the [`RegisterBus`] contract so the chip can be mocked out.

use crate::hal::{BusError, RegisterBus};
use crate::types::Port;

/// Register map (IOCON.BANK = 0 addressing).
pub mod regs {
    use crate::types::Port;

    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    pub const GPINTENA: u8 = 0x04;
    pub const GPINTENB: u8 = 0x05;
    pub const DEFVALA: u8 = 0x06;
    pub const DEFVALB: u8 = 0x07;
    pub const INTCONA: u8 = 0x08;
    pub const INTCONB: u8 = 0x09;
    pub const IOCON: u8 = 0x0A;
    pub const GPPUA: u8 = 0x0C;
    pub const GPPUB: u8 = 0x0D;
    pub const INTFA: u8 = 0x0E;
    pub const INTFB: u8 = 0x0F;
    pub const INTCAPA: u8 = 0x10;
    pub const INTCAPB: u8 = 0x11;
    pub const GPIOA: u8 = 0x12;
    pub const GPIOB: u8 = 0x13;

    /// Direction register for one port
    pub const fn iodir(port: Port) -> u8 {
        match port {
            Port::Outer => IODIRA,
            Port::Inner => IODIRB,
        }
    }

    /// Pull-up enable register for one port
    pub const fn gppu(port: Port) -> u8 {
        match port {
            Port::Outer => GPPUA,
            Port::Inner => GPPUB,
        }
    }

    /// Interrupt enable register for one port
    pub const fn gpinten(port: Port) -> u8 {
        match port {
            Port::Outer => GPINTENA,
            Port::Inner => GPINTENB,
        }
    }

    /// Interrupt control (compare mode) register for one port
    pub const fn intcon(port: Port) -> u8 {
        match port {
            Port::Outer => INTCONA,
            Port::Inner => INTCONB,
        }
    }

    /// Default-compare register for one port
    pub const fn defval(port: Port) -> u8 {
        match port {
            Port::Outer => DEFVALA,
            Port::Inner => DEFVALB,
        }
    }

    /// Latched interrupt flag register for one port
    pub const fn intf(port: Port) -> u8 {
        match port {
            Port::Outer => INTFA,
            Port::Inner => INTFB,
        }
    }

    /// Interrupt capture register for one port (read clears the latch)
    pub const fn intcap(port: Port) -> u8 {
        match port {
            Port::Outer => INTCAPA,
            Port::Inner => INTCAPB,
        }
    }
}

/// IOCON.MIRROR: either port's interrupt drives both INT pins, so one
/// microcontroller line serves the whole chip.
const IOCON_MIRROR: u8 = 0b0100_0000;

/// One expander chip on the bus.
pub struct Expander<B> {
    bus: B,
    address: u8,
}

impl<B: RegisterBus> Expander<B> {
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Configure both ports as pulled-up inputs with interrupt-on-change on
    /// every line, then drain any latched interrupt so a stale INT level
    /// cannot wedge the line before the edge handler is armed.
    pub fn init(&mut self) -> Result<(), BusError> {
        for port in Port::ALL {
            self.write(regs::iodir(port), 0xFF)?;
            self.write(regs::gppu(port), 0xFF)?;
            self.write(regs::gpinten(port), 0xFF)?;
            // compare against the previous pin value, not DEFVAL
            self.write(regs::intcon(port), 0x00)?;
            self.write(regs::defval(port), 0xFF)?;
        }
        self.write(regs::IOCON, IOCON_MIRROR)?;
        self.clear_pending()
    }

    /// Drain latched interrupt state on both ports
    pub fn clear_pending(&mut self) -> Result<(), BusError> {
        for port in Port::ALL {
            self.interrupt_capture(port)?;
        }
        Ok(())
    }

    /// Which lines of `port` have a latched interrupt, one bit per channel
    pub fn interrupt_flags(&mut self, port: Port) -> Result<u8, BusError> {
        self.bus.read(self.address, regs::intf(port))
    }

    /// Line levels at the moment the interrupt latched. Reading this
    /// register clears the latched condition on the chip.
    pub fn interrupt_capture(&mut self, port: Port) -> Result<u8, BusError> {
        self.bus.read(self.address, regs::intcap(port))
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        self.bus.write(self.address, register, value)
    }

    /// Give the bus back (for sharing with other bus users at shutdown)
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Direct bus access for test harnesses that inject register state
    #[cfg(any(test, feature = "test-utils"))]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
