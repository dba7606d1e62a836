//! Bounded per-(channel, port) event FIFOs
//!
//! Each queue has exactly one producer (the capture engine) and one consumer
//! (the correlator), so the lock-free `heapless` SPSC queue fits without
//! extra locking. Timestamps within a queue are strictly increasing because
//! the single producer appends in arrival order.

use heapless::spsc::{Consumer, Producer, Queue};
use heapless::Vec;

use crate::types::{BeamEvent, NUM_CHANNELS};

/// Backing capacity of each (channel, port) FIFO.
pub const QUEUE_DEPTH: usize = 8;

pub type EventQueue = Queue<BeamEvent, QUEUE_DEPTH>;
pub type EventProducer<'q> = Producer<'q, BeamEvent, QUEUE_DEPTH>;
pub type EventConsumer<'q> = Consumer<'q, BeamEvent, QUEUE_DEPTH>;

/// One port's worth of queues, one per channel.
pub type QueueBank = [EventQueue; NUM_CHANNELS];

/// Fresh bank of empty queues
pub fn new_bank() -> QueueBank {
    core::array::from_fn(|_| Queue::new())
}

/// Split a bank into its producer and consumer halves.
pub fn split_bank(
    bank: &mut QueueBank,
) -> (
    [EventProducer<'_>; NUM_CHANNELS],
    [EventConsumer<'_>; NUM_CHANNELS],
) {
    let mut producers: Vec<EventProducer<'_>, NUM_CHANNELS> = Vec::new();
    let mut consumers: Vec<EventConsumer<'_>, NUM_CHANNELS> = Vec::new();
    for queue in bank.iter_mut() {
        let (producer, consumer) = queue.split();
        producers.push(producer).ok();
        consumers.push(consumer).ok();
    }
    // both vecs hold exactly NUM_CHANNELS halves
    let (Ok(producers), Ok(consumers)) = (
        producers.into_array::<NUM_CHANNELS>(),
        consumers.into_array::<NUM_CHANNELS>(),
    ) else {
        unreachable!()
    };
    (producers, consumers)
}
