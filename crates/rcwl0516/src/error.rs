use core::fmt;

use derive_more::Display;

use crate::pin::PinName;

/// Errors that can occur while creating, opening or closing a driver.
///
/// `E` is the error type of the [`GpioBackend`](crate::GpioBackend).
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum DriverError<E: fmt::Debug> {
    /// The pin is not wired to one of the sensor's interrupt-capable lines.
    #[display("the set {pin} is not {allowed}")]
    InvalidPin { pin: PinName, allowed: String },
    /// The backend failed to provision or configure the pin.
    #[display("failed to provision pin: {_0:?}")]
    Provisioning(E),
    /// The backend failed to remove the listener or release the pin.
    #[display("failed to release pin: {_0:?}")]
    Release(E),
    /// An edge was delivered to a driver created without a handler.
    #[display("{pin}: edge delivered with no handler bound")]
    MissingHandler { pin: PinName },
    /// The registry has no room for another instance.
    #[display("driver registry is full")]
    RegistryFull,
}

impl<E: fmt::Debug> std::error::Error for DriverError<E> {}
