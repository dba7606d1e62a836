//! Test utilities for the crossing engine

pub mod traffic {
    //! Scripted beam activity played into a mock register bus
    //!
    //! A script is a list of absolute-time activations. A player latches
    //! everything due up to "now" into the bus, so a test can interleave
    //! capture passes with traffic exactly as the hardware would.

    use crate::hal::mock::MockBus;
    use crate::types::Port;

    /// One scripted beam activation at an absolute millisecond tick.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Activation {
        pub at_ms: u64,
        pub port: Port,
        pub channel: usize,
    }

    /// Builder for activation scripts.
    #[derive(Clone, Debug, Default)]
    pub struct TrafficScript {
        steps: Vec<Activation>,
    }

    impl TrafficScript {
        pub fn new() -> Self {
            Self::default()
        }

        /// Single activation on one beam
        pub fn activation(mut self, at_ms: u64, port: Port, channel: usize) -> Self {
            self.steps.push(Activation {
                at_ms,
                port,
                channel,
            });
            self
        }

        /// Complete entry: outer beam at `at_ms`, inner `gap_ms` later
        pub fn entry(self, channel: usize, at_ms: u64, gap_ms: u64) -> Self {
            self.activation(at_ms, Port::Outer, channel)
                .activation(at_ms + gap_ms, Port::Inner, channel)
        }

        /// Complete exit: inner beam at `at_ms`, outer `gap_ms` later
        pub fn exit(self, channel: usize, at_ms: u64, gap_ms: u64) -> Self {
            self.activation(at_ms, Port::Inner, channel)
                .activation(at_ms + gap_ms, Port::Outer, channel)
        }

        pub fn into_player(mut self) -> ScriptPlayer {
            self.steps.sort_by_key(|step| step.at_ms);
            ScriptPlayer {
                steps: self.steps,
                cursor: 0,
            }
        }
    }

    /// Plays a script forward in time against a mock bus.
    pub struct ScriptPlayer {
        steps: Vec<Activation>,
        cursor: usize,
    }

    impl ScriptPlayer {
        /// Latch every activation due at or before `now_ms`. Returns how
        /// many were latched (a burst latched together coalesces into one
        /// capture pass, as on the real chip).
        pub fn advance_to(&mut self, bus: &mut MockBus, now_ms: u64) -> usize {
            let mut latched = 0;
            while let Some(step) = self.steps.get(self.cursor) {
                if step.at_ms > now_ms {
                    break;
                }
                bus.latch_falling(step.port, step.channel);
                self.cursor += 1;
                latched += 1;
            }
            latched
        }

        pub fn finished(&self) -> bool {
            self.cursor == self.steps.len()
        }

        /// Tick of the next pending activation
        pub fn next_due(&self) -> Option<u64> {
            self.steps.get(self.cursor).map(|step| step.at_ms)
        }
    }

}
