//! Driver for the RCWL-0516 doppler radar motion sensor.
//!
//! The sensor drives a single GPIO line high while it detects motion and low
//! otherwise. A [`DriverRegistry`] hands out one [`Rcwl0516`] instance per
//! pin; opening an instance provisions the pin through a [`GpioBackend`] and
//! forwards each edge to the instance's [`MotionHandler`] as a timestamped
//! detection or clear event.

pub mod backend;
mod dispatcher;
mod driver;
mod error;
mod handler;
mod pin;
mod registry;

pub use backend::sim::{SimError, SimHandle, SimulatedGpio};
pub use backend::{EdgeListener, GpioBackend, PinState, PullMode};
pub use driver::Rcwl0516;
pub use error::DriverError;
pub use handler::{LoggingHandler, MotionEvent, MotionHandler, TIMESTAMP_FORMAT};
pub use pin::{
    allowed_pin_names, canonical_name, is_allowed, validate, Pin, PinName,
    ALLOWED_PINS, ALLOWED_PIN_COUNT, DEFAULT_PIN, GPIO_10, GPIO_12, GPIO_13, GPIO_18, GPIO_19,
};
pub use registry::DriverRegistry;

#[cfg(feature = "rpi")]
pub use backend::rpi::RppalGpio;
