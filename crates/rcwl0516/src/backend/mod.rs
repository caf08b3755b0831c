//! GPIO capability the driver is built on.
//!
//! The driver never touches hardware directly. It provisions a pin, installs
//! one [`EdgeListener`] and later releases the pin through a [`GpioBackend`].
//! Backends deliver edge notifications on their own execution context.

use std::sync::Arc;

use derive_more::Display;

use crate::pin::Pin;

#[cfg(feature = "rpi")]
pub mod rpi;
pub mod sim;

/// Pull resistor configuration for an input pin.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PullMode {
    /// No pull resistor (floating input).
    Off,
    /// Pull-up resistor.
    PullUp,
    /// Pull-down resistor.
    PullDown,
}

/// Pin level reported by a state-change notification.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    #[display("HIGH")]
    High,
    #[display("LOW")]
    Low,
    /// Any level the platform cannot classify as high or low.
    #[display("UNKNOWN")]
    Unknown,
}

/// Receives raw pin state changes from a backend.
///
/// Called synchronously on the backend's delivery context, once per
/// notification, in delivery order.
pub trait EdgeListener: Send + Sync {
    fn on_state_change(&self, state: PinState);
}

/// Abstracts GPIO pin provisioning and edge-interrupt registration.
///
/// Implementors own the platform specifics. Each driver calls these methods
/// under its own per-pin lock, so a handle is only ever touched by one caller
/// at a time. Calls for different pins may run concurrently.
///
/// `remove_all_listeners` may wait for an in-flight listener call to finish.
/// Meanwhile the driver holds only that pin's own lock, never a registry
/// lock or another pin's lock.
pub trait GpioBackend: Send + Sync {
    /// A provisioned input pin.
    type Handle: Send;
    /// Error type for backend failures.
    type Error: core::fmt::Debug;

    /// Claim `pin` as a digital input with the given pull resistor.
    fn provision(
        &self,
        pin: &Pin,
        pull: PullMode,
    ) -> Result<Self::Handle, Self::Error>;

    /// Ask the platform to restore the pin to a safe state on process exit.
    fn set_shutdown_options(
        &self,
        handle: &mut Self::Handle,
        unexport: bool,
    ) -> Result<(), Self::Error>;

    /// Install `listener` for both rising and falling edges.
    fn add_listener(
        &self,
        handle: &mut Self::Handle,
        listener: Arc<dyn EdgeListener>,
    ) -> Result<(), Self::Error>;

    /// Remove every listener installed on the handle.
    fn remove_all_listeners(
        &self,
        handle: &mut Self::Handle,
    ) -> Result<(), Self::Error>;

    /// Release the pin.
    fn unprovision(&self, handle: Self::Handle) -> Result<(), Self::Error>;
}
