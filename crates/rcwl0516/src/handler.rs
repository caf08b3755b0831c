//! Consumer side of the driver: the handler contract and stock handlers.

use core::fmt;
use std::sync::mpsc::Sender;

use chrono::{DateTime, Local};
use tracing::{info, warn};

/// `strftime` format used when logging event timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Receives motion events from a driver.
///
/// `handle` runs on the GPIO backend's delivery context. It must not block
/// for long: the next edge on the same pin is not delivered until it returns.
/// It must not call `open`/`close` on its own driver, since closing waits for
/// the backend to stop delivering.
pub trait MotionHandler: Send + Sync {
    /// `detected` is `true` when the sensor output went high (motion) and
    /// `false` when it went low (clear).
    fn handle(&self, pin_name: &str, detected: bool, observed_at: DateTime<Local>);
}

impl<F> MotionHandler for F
where
    F: Fn(&str, bool, DateTime<Local>) + Send + Sync,
{
    fn handle(&self, pin_name: &str, detected: bool, observed_at: DateTime<Local>) {
        self(pin_name, detected, observed_at)
    }
}

/// A single detection or clear event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionEvent {
    pub pin_name: String,
    pub detected: bool,
    pub observed_at: DateTime<Local>,
}

impl MotionEvent {
    pub fn new(pin_name: &str, detected: bool, observed_at: DateTime<Local>) -> Self {
        Self { pin_name: pin_name.to_owned(), detected, observed_at }
    }
}

impl fmt::Display for MotionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.pin_name,
            self.detected,
            self.observed_at.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Forwards each event into a channel.
///
/// A disconnected receiver is logged and the event dropped.
impl MotionHandler for Sender<MotionEvent> {
    fn handle(&self, pin_name: &str, detected: bool, observed_at: DateTime<Local>) {
        let event = MotionEvent::new(pin_name, detected, observed_at);
        if self.send(event).is_err() {
            warn!("[{}] event receiver disconnected", pin_name);
        }
    }
}

/// Logs every event at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl MotionHandler for LoggingHandler {
    fn handle(&self, pin_name: &str, detected: bool, observed_at: DateTime<Local>) {
        info!("{}", MotionEvent::new(pin_name, detected, observed_at));
    }
}
