#![no_std]

//! Firmware library: mock expander hardware and the gate monitor tasks

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;
pub use static_cell::StaticCell;

pub use hivegate_core::*;

pub use crate::mock_hardware::*;
pub use crate::tasks::*;

// Mock hardware module
pub mod mock_hardware {
    use hivegate_core::expander::regs;
    use hivegate_core::hal::{BusError, RegisterBus};
    use hivegate_core::types::Port;

    /// Stand-in expander bus for bench bring-up without the sensor board
    /// attached. Keeps a register file with the chip's latch semantics:
    /// reading an interrupt-capture register clears that port's flags.
    pub struct MockExpanderBus {
        regs: [u8; 32],
    }

    impl MockExpanderBus {
        pub fn new() -> Self {
            let mut regs = [0u8; 32];
            // reset defaults: all inputs, beams unobstructed
            regs[regs::IODIRA as usize] = 0xFF;
            regs[regs::IODIRB as usize] = 0xFF;
            regs[regs::GPIOA as usize] = 0xFF;
            regs[regs::GPIOB as usize] = 0xFF;
            regs[regs::INTCAPA as usize] = 0xFF;
            regs[regs::INTCAPB as usize] = 0xFF;
            Self { regs }
        }

        /// Latch a falling edge on one line, as the chip would when a beam
        /// becomes obstructed
        pub fn trigger(&mut self, port: Port, channel: u8) {
            self.regs[regs::intf(port) as usize] |= 1 << channel;
            self.regs[regs::intcap(port) as usize] &= !(1 << channel);
        }
    }

    impl Default for MockExpanderBus {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RegisterBus for MockExpanderBus {
        fn write(&mut self, _address: u8, register: u8, value: u8) -> Result<(), BusError> {
            self.regs[register as usize] = value;
            Ok(())
        }

        fn read(&mut self, _address: u8, register: u8) -> Result<u8, BusError> {
            let value = self.regs[register as usize];
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

// Embassy tasks module
pub mod tasks {
    use super::*;
    use embassy_time::{Instant, Timer};

    /// Wakes on the expander interrupt and drains latched events into the
    /// channel queues
    #[embassy_executor::task]
    pub async fn capture_task(
        bridge: &'static InterruptBridge,
        mut engine: CaptureEngine<'static, MockExpanderBus>,
    ) {
        #[cfg(feature = "defmt")]
        defmt::info!("capture task started");

        loop {
            bridge.wait().await;
            match engine.service(Instant::now()) {
                Ok(summary) => {
                    if summary.total() > 0 || summary.dropped > 0 {
                        #[cfg(feature = "defmt")]
                        defmt::debug!(
                            "captured outer={} inner={} dropped={}",
                            summary.outer,
                            summary.inner,
                            summary.dropped
                        );
                    }
                }
                Err(_err) => {
                    // transient bus fault; the next wake-up reads fresh state
                    #[cfg(feature = "defmt")]
                    defmt::warn!("expander read failed: {}", _err);
                }
            }
        }
    }

    /// Periodically pairs queued events and settles the shared counter
    #[embassy_executor::task]
    pub async fn correlator_task(mut correlator: Correlator<'static>, counter: &'static SharedCounter) {
        #[cfg(feature = "defmt")]
        defmt::info!("correlator task started");

        let period = correlator.config().scan_period;
        loop {
            let stats = correlator.scan(counter, Instant::now());
            if stats.had_activity() {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "scan entries={} exits={} population={}",
                    stats.entries,
                    stats.exits,
                    counter.read()
                );
            }
            Timer::after(period).await;
        }
    }

    /// Ten-second population report
    #[embassy_executor::task]
    pub async fn stats_task(counter: &'static SharedCounter, bridge: &'static InterruptBridge) {
        loop {
            Timer::after(Duration::from_secs(10)).await;
            let _population = counter.read();
            let _raised = bridge.raised_total();
            let _lost = crate::telemetry::samples_lost();
            #[cfg(feature = "defmt")]
            defmt::info!(
                "population={} interrupts={} samples_lost={}",
                _population,
                _raised,
                _lost
            );
        }
    }
}

// Downstream count reporting
pub mod telemetry;

// Time driver for embassy
mod time_driver;
