//! Watch an RCWL-0516 sensor and log every detection/clear event.
//!
//! `--backend sim` (the default) runs without hardware: a background thread
//! toggles the simulated line. `--backend rpi` needs the `rpi` feature.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rcwl0516::{
    DriverRegistry, GpioBackend, LoggingHandler, MotionHandler, Pin, PinState,
    SimulatedGpio,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// In-memory GPIO with a simulated sensor
    Sim,
    /// Raspberry Pi GPIO (requires the `rpi` feature)
    Rpi,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// BCM number of the pin the sensor output is wired to
    #[arg(long, default_value_t = 18)]
    pin: u8,

    #[arg(long, value_enum, default_value_t = Backend::Sim)]
    backend: Backend,

    /// Seconds to watch before closing the driver
    #[arg(long, default_value_t = 10)]
    duration: u64,

    /// Milliseconds between simulated level changes
    #[arg(long, default_value_t = 1000)]
    toggle_ms: u64,
}

fn watch<G>(
    registry: &DriverRegistry<G>,
    pin: Pin,
    duration: Duration,
) -> Result<()>
where
    G: GpioBackend,
    G::Error: Send + Sync + 'static,
{
    let handler: Arc<dyn MotionHandler> = Arc::new(LoggingHandler);
    let sensor = registry.get_instance(pin, Some(handler))?;

    sensor.open()?;
    thread::sleep(duration);
    sensor.close()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let pin = Pin::bcm(cli.pin);
    let duration = Duration::from_secs(cli.duration);

    match cli.backend {
        Backend::Sim => {
            let gpio = Arc::new(SimulatedGpio::new());
            let registry = DriverRegistry::with_shared_backend(gpio.clone());

            let toggle = Duration::from_millis(cli.toggle_ms);
            let sensor_pin = pin.clone();
            thread::spawn(move || {
                let mut level = PinState::High;
                loop {
                    thread::sleep(toggle);
                    gpio.inject(&sensor_pin, level);
                    level = match level {
                        PinState::High => PinState::Low,
                        _ => PinState::High,
                    };
                }
            });

            watch(&registry, pin, duration)
        }
        #[cfg(feature = "rpi")]
        Backend::Rpi => {
            use anyhow::Context;

            let gpio = rcwl0516::RppalGpio::new().context("failed to open GPIO")?;
            watch(&DriverRegistry::new(gpio), pin, duration)
        }
        #[cfg(not(feature = "rpi"))]
        Backend::Rpi => anyhow::bail!("built without the `rpi` feature"),
    }
}
