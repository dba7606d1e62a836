//! Downstream count reporting
//!
//! The gate engine exposes nothing but the counter; telemetry samples it on
//! a fixed period into a bounded queue and a separate task drains the queue
//! into whatever transport is attached. Reports buffer while the link is
//! down and a full backlog drops the newest sample with a counted loss,
//! the same policy the event queues use.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::{AtomicU32, Ordering};

use hivegate_core::SharedCounter;

/// Reports held while the transport is unavailable.
pub const REPORT_BACKLOG: usize = 32;

/// One population sample.
#[derive(Copy, Clone, Debug)]
pub struct CountReport {
    pub taken_at: Instant,
    pub population: u32,
    pub sequence: u32,
}

pub type ReportQueue = Channel<CriticalSectionRawMutex, CountReport, REPORT_BACKLOG>;

/// Samples dropped because the backlog was full.
static SAMPLES_LOST: AtomicU32 = AtomicU32::new(0);

pub fn samples_lost() -> u32 {
    SAMPLES_LOST.load(Ordering::Relaxed)
}

/// Transport seam; the broker client lives behind this.
pub trait ReportSink {
    /// Whether the link can accept a report right now
    fn ready(&mut self) -> bool;

    fn publish(&mut self, report: &CountReport) -> Result<(), SinkError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// The link dropped between the readiness check and the publish
    Offline,
}

/// Sink that only logs what it would have sent (bench builds).
#[derive(Default)]
pub struct LogSink {
    pub published: u32,
}

impl ReportSink for LogSink {
    fn ready(&mut self) -> bool {
        true
    }

    fn publish(&mut self, report: &CountReport) -> Result<(), SinkError> {
        self.published += 1;
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "report #{} population={}",
            report.sequence,
            report.population
        );
        let _ = report;
        Ok(())
    }
}

/// Samples the counter on a fixed period into the report queue
#[embassy_executor::task]
pub async fn sampler_task(
    counter: &'static SharedCounter,
    queue: &'static ReportQueue,
    period: Duration,
) {
    let mut sequence = 0u32;
    loop {
        Timer::after(period).await;
        sequence = sequence.wrapping_add(1);
        let report = CountReport {
            taken_at: Instant::now(),
            population: counter.read(),
            sequence,
        };
        if queue.try_send(report).is_err() {
            SAMPLES_LOST.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "defmt")]
            defmt::warn!("report backlog full, sample dropped");
        }
    }
}

/// Drains the report queue into the sink whenever the link is up
#[embassy_executor::task]
pub async fn publish_task(queue: &'static ReportQueue, mut sink: LogSink) {
    loop {
        let report = queue.receive().await;
        while !sink.ready() {
            Timer::after(Duration::from_secs(1)).await;
        }
        if sink.publish(&report).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("publish failed, report lost");
        }
    }
}
