#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// Panic handler
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::Duration;
use static_cell::StaticCell;

use hivegate_core::*;
use hivegate_firmware::telemetry;
use hivegate_firmware::*;

/// I2C address of the gate expander (A0..A2 strapped low)
const EXPANDER_ADDR: u8 = 0x20;

// Static resources, created once and handed to the tasks by reference
static BRIDGE: InterruptBridge = InterruptBridge::new();
static COUNTER: SharedCounter = SharedCounter::new();
static OUTER_QUEUES: StaticCell<QueueBank> = StaticCell::new();
static INNER_QUEUES: StaticCell<QueueBank> = StaticCell::new();
static REPORTS: telemetry::ReportQueue = telemetry::ReportQueue::new();

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("hivegate firmware starting");

    // Bench bring-up runs against the mock expander; board bring-up swaps
    // in I2cRegisterBus over the RP2040 I2C peripheral.
    let mut expander = Expander::new(MockExpanderBus::new(), EXPANDER_ADDR);
    if expander.init().is_err() {
        #[cfg(feature = "defmt")]
        defmt::error!("expander init failed, running with a dead gate");
    }

    let config = default_config();

    let (outer_producers, outer_consumers) = split_bank(OUTER_QUEUES.init(new_bank()));
    let (inner_producers, inner_consumers) = split_bank(INNER_QUEUES.init(new_bank()));

    let engine = CaptureEngine::new(expander, outer_producers, inner_producers);
    let correlator = Correlator::new(
        ChannelPair::from_banks(outer_consumers, inner_consumers),
        config,
    );

    #[cfg(feature = "defmt")]
    defmt::info!(
        "spawning gate tasks, scan period {}ms",
        config.scan_period.as_millis()
    );

    spawner.must_spawn(capture_task(&BRIDGE, engine));
    spawner.must_spawn(correlator_task(correlator, &COUNTER));
    spawner.must_spawn(stats_task(&COUNTER, &BRIDGE));
    spawner.must_spawn(telemetry::sampler_task(
        &COUNTER,
        &REPORTS,
        Duration::from_secs(30),
    ));
    spawner.must_spawn(telemetry::publish_task(
        &REPORTS,
        telemetry::LogSink::default(),
    ));

    #[cfg(feature = "defmt")]
    defmt::info!("hivegate ready");

    // Supervision loop. Board bring-up wires the expander INT pin to a
    // falling-edge handler that calls BRIDGE.notify().
    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
    }
}
