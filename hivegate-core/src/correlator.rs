//! Pairing of outer/inner beam events into entries and exits
//!
//! Runs on a fixed period. Every channel is decided independently from the
//! oldest event on each of its two queues. Peeking both heads before any
//! decision keeps an unmatched event available for a later pairing attempt
//! within its staleness budget, which rides out scheduling jitter between
//! the two detections without a per-channel state machine.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::counter::PopulationCounter;
use crate::hal::Instant;
use crate::queue::EventConsumer;
use crate::types::{Crossing, GateConfig, Port, NUM_CHANNELS};

/// The consumer halves of one channel's two queues.
pub struct ChannelPair<'q> {
    pub outer: EventConsumer<'q>,
    pub inner: EventConsumer<'q>,
}

/// Outcome of examining one channel during a scan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelVerdict {
    /// Nothing to pair yet
    Idle,
    /// Completed passage; the counter was adjusted and both heads popped
    Crossed(Crossing),
    /// Both heads present but too far apart to be one passage; the older
    /// side was dropped, the younger stays queued for the next scan
    WindowExceeded(Port),
    /// Lone head(s) aged past the staleness timeout and were dropped
    Expired { outer: bool, inner: bool },
}

/// Totals for one scan over all channels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanStats {
    pub entries: u8,
    pub exits: u8,
    /// Older halves dropped because the gap exceeded the passage window
    pub window_drops: u8,
    /// Lone events discarded as noise past the staleness timeout
    pub stale_drops: u8,
}

impl ScanStats {
    pub fn had_activity(&self) -> bool {
        self.entries != 0 || self.exits != 0 || self.window_drops != 0 || self.stale_drops != 0
    }
}

impl<'q> ChannelPair<'q> {
    /// Zip two banks of consumer halves into per-channel pairs
    pub fn from_banks(
        outer: [EventConsumer<'q>; NUM_CHANNELS],
        inner: [EventConsumer<'q>; NUM_CHANNELS],
    ) -> [ChannelPair<'q>; NUM_CHANNELS] {
        let mut pairs: heapless::Vec<ChannelPair<'q>, NUM_CHANNELS> = heapless::Vec::new();
        for (outer, inner) in outer.into_iter().zip(inner) {
            pairs.push(ChannelPair { outer, inner }).ok();
        }
        let Ok(pairs) = pairs.into_array::<NUM_CHANNELS>() else {
            // both banks hold exactly NUM_CHANNELS halves
            unreachable!()
        };
        pairs
    }

    /// Decide this channel from its two queue heads.
    ///
    /// Outer strictly first and within the window counts an entry; inner
    /// first, or the same tick, counts an exit (the tie policy is arbitrary
    /// but fixed, for determinism). A gap beyond the window drops only the
    /// older head: the younger one may still pair with a later event. With
    /// at most one side populated, a head older than `stale_after` is
    /// discarded as noise, each side independently.
    pub fn resolve<M: RawMutex>(
        &mut self,
        config: &GateConfig,
        counter: &PopulationCounter<M>,
        now: Instant,
    ) -> ChannelVerdict {
        let outer_head = self.outer.peek().copied();
        let inner_head = self.inner.peek().copied();

        match (outer_head, inner_head) {
            (Some(a), Some(b)) => {
                if a.at < b.at {
                    // outer broke first: candidate entry
                    if b.at.duration_since(a.at) <= config.passage_window {
                        counter.increment();
                        self.outer.dequeue();
                        self.inner.dequeue();
                        ChannelVerdict::Crossed(Crossing::Entry)
                    } else {
                        // too old to belong to any passage b completes
                        self.outer.dequeue();
                        ChannelVerdict::WindowExceeded(Port::Outer)
                    }
                } else {
                    // inner broke first (ties included): candidate exit
                    if a.at.duration_since(b.at) <= config.passage_window {
                        counter.decrement_saturating();
                        self.outer.dequeue();
                        self.inner.dequeue();
                        ChannelVerdict::Crossed(Crossing::Exit)
                    } else {
                        self.inner.dequeue();
                        ChannelVerdict::WindowExceeded(Port::Inner)
                    }
                }
            }
            (outer_head, inner_head) => {
                // at most one side has data; age it out independently
                let outer = matches!(outer_head, Some(e) if now.duration_since(e.at) > config.stale_after);
                if outer {
                    self.outer.dequeue();
                }
                let inner = matches!(inner_head, Some(e) if now.duration_since(e.at) > config.stale_after);
                if inner {
                    self.inner.dequeue();
                }
                if outer || inner {
                    ChannelVerdict::Expired { outer, inner }
                } else {
                    ChannelVerdict::Idle
                }
            }
        }
    }
}

/// Owns the consumer side of every channel and settles the shared counter.
pub struct Correlator<'q> {
    channels: [ChannelPair<'q>; NUM_CHANNELS],
    config: GateConfig,
}

impl<'q> Correlator<'q> {
    pub fn new(channels: [ChannelPair<'q>; NUM_CHANNELS], config: GateConfig) -> Self {
        Self { channels, config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// One pass over all channels. Nothing here is fatal; every decision
    /// depends only on the current queue heads, so the next pass starts
    /// clean whatever happened in this one.
    pub fn scan<M: RawMutex>(&mut self, counter: &PopulationCounter<M>, now: Instant) -> ScanStats {
        let mut stats = ScanStats::default();
        for pair in self.channels.iter_mut() {
            match pair.resolve(&self.config, counter, now) {
                ChannelVerdict::Idle => {}
                ChannelVerdict::Crossed(Crossing::Entry) => stats.entries += 1,
                ChannelVerdict::Crossed(Crossing::Exit) => stats.exits += 1,
                ChannelVerdict::WindowExceeded(_) => stats.window_drops += 1,
                ChannelVerdict::Expired { outer, inner } => {
                    stats.stale_drops += outer as u8 + inner as u8
                }
            }
        }
        stats
    }
}
