//! Capture path and register driver tests

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use hivegate_core::expander::regs;
    use hivegate_core::hal::mock::MockBus;
    use hivegate_core::test_utils::traffic::TrafficScript;
    use hivegate_core::*;

    const ADDR: u8 = 0x20;

    /// The exact bus traffic of a cold init: both ports configured as
    /// pulled-up interrupt-on-change inputs, mirrored INT output, then the
    /// pending-latch drain.
    #[test]
    fn init_register_sequence_over_i2c() {
        let expectations = [
            // PORTA (outer beams)
            I2cTransaction::write(ADDR, vec![regs::IODIRA, 0xFF]),
            I2cTransaction::write(ADDR, vec![regs::GPPUA, 0xFF]),
            I2cTransaction::write(ADDR, vec![regs::GPINTENA, 0xFF]),
            I2cTransaction::write(ADDR, vec![regs::INTCONA, 0x00]),
            I2cTransaction::write(ADDR, vec![regs::DEFVALA, 0xFF]),
            // PORTB (inner beams)
            I2cTransaction::write(ADDR, vec![regs::IODIRB, 0xFF]),
            I2cTransaction::write(ADDR, vec![regs::GPPUB, 0xFF]),
            I2cTransaction::write(ADDR, vec![regs::GPINTENB, 0xFF]),
            I2cTransaction::write(ADDR, vec![regs::INTCONB, 0x00]),
            I2cTransaction::write(ADDR, vec![regs::DEFVALB, 0xFF]),
            // one INT line for both ports
            I2cTransaction::write(ADDR, vec![regs::IOCON, 0b0100_0000]),
            // drain anything latched before the edge handler is armed
            I2cTransaction::write_read(ADDR, vec![regs::INTCAPA], vec![0xFF]),
            I2cTransaction::write_read(ADDR, vec![regs::INTCAPB], vec![0xFF]),
        ];
        let i2c = I2cMock::new(&expectations);

        let mut expander = Expander::new(I2cRegisterBus::new(i2c), ADDR);
        expander.init().unwrap();

        expander.into_bus().release().done();
    }

    #[test]
    fn hot_path_reads_flags_then_capture() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![regs::INTFA], vec![0b0000_0010]),
            I2cTransaction::write_read(ADDR, vec![regs::INTCAPA], vec![0b1111_1101]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut expander = Expander::new(I2cRegisterBus::new(i2c), ADDR);

        let flags = expander.interrupt_flags(Port::Outer).unwrap();
        let captured = expander.interrupt_capture(Port::Outer).unwrap();
        assert_eq!(falling_edges(flags, captured), 0b0000_0010);

        expander.into_bus().release().done();
    }

    #[test]
    fn nack_maps_to_a_transient_bus_error() {
        let expectations = [I2cTransaction::write(ADDR, vec![regs::IODIRA, 0xFF])
            .with_error(embedded_hal::i2c::ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ))];
        let i2c = I2cMock::new(&expectations);

        let mut expander = Expander::new(I2cRegisterBus::new(i2c), ADDR);
        assert_eq!(expander.init(), Err(BusError::Nack));

        expander.into_bus().release().done();
    }

    /// Scripted traffic through the whole capture-correlate pipeline: the
    /// mock bus latches edges, the engine drains them on simulated
    /// interrupt wake-ups, the correlator settles the counter.
    #[test]
    fn scripted_traffic_settles_the_population() {
        let mut player = TrafficScript::new()
            .entry(0, 100, 80) // one in through tunnel 0
            .entry(3, 150, 40) // one in through tunnel 3
            .exit(0, 700, 60) // one back out through tunnel 0
            .activation(900, Port::Outer, 5) // half passage, never completed
            .into_player();

        let outer_bank: &'static mut QueueBank = Box::leak(Box::new(new_bank()));
        let inner_bank: &'static mut QueueBank = Box::leak(Box::new(new_bank()));
        let (outer_p, outer_c) = split_bank(outer_bank);
        let (inner_p, inner_c) = split_bank(inner_bank);

        let mut engine = CaptureEngine::new(Expander::new(MockBus::new(), ADDR), outer_p, inner_p);
        let mut correlator =
            Correlator::new(ChannelPair::from_banks(outer_c, inner_c), test_config());
        let counter = counter();

        // walk simulated time in scan periods
        for step in 0..400u64 {
            let now = step * 50;
            if player.advance_to(engine.expander_mut().bus_mut(), now) > 0 {
                // the INT edge would have woken the capture task here
                engine.service(ms(now)).unwrap();
            }
            correlator.scan(counter, ms(now));
        }

        assert!(player.finished());
        // two in, one out, the lone activation aged away
        assert_eq!(counter.read(), 1);
        assert_eq!(engine.dropped_total(), 0);
        assert!(!correlator.scan(counter, ms(30_000)).had_activity());
    }

    /// A burst faster than the wake-up rate coalesces into one capture
    /// pass, and every flagged line still produces its event.
    #[test]
    fn coalesced_burst_loses_no_flagged_line() {
        let mut bus = MockBus::new();
        for channel in 0..NUM_CHANNELS {
            bus.latch_falling(Port::Outer, channel);
        }

        let outer_bank: &'static mut QueueBank = Box::leak(Box::new(new_bank()));
        let inner_bank: &'static mut QueueBank = Box::leak(Box::new(new_bank()));
        let (outer_p, outer_c) = split_bank(outer_bank);
        let (inner_p, _inner_c) = split_bank(inner_bank);

        let mut engine = CaptureEngine::new(Expander::new(bus, ADDR), outer_p, inner_p);
        let summary = engine.service(ms(10)).unwrap();
        assert_eq!(summary.outer as usize, NUM_CHANNELS);

        let mut outer_c = outer_c;
        for consumer in outer_c.iter_mut() {
            assert_eq!(consumer.dequeue().unwrap().at, ms(10));
        }
    }
}
