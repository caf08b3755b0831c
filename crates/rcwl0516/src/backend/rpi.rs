//! Raspberry Pi backend built on `rppal`, using BCM pin numbering.

use std::sync::Arc;

use rppal::gpio::{Gpio, InputPin, Level, Trigger};

use super::{EdgeListener, GpioBackend, PinState, PullMode};
use crate::pin::Pin;

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::High => PinState::High,
            Level::Low => PinState::Low,
        }
    }
}

/// GPIO backend for the Raspberry Pi's `/dev/gpiomem` interface.
pub struct RppalGpio {
    gpio: Gpio,
}

impl RppalGpio {
    pub fn new() -> Result<Self, rppal::gpio::Error> {
        Ok(Self { gpio: Gpio::new()? })
    }
}

impl GpioBackend for RppalGpio {
    type Handle = InputPin;
    type Error = rppal::gpio::Error;

    fn provision(
        &self,
        pin: &Pin,
        pull: PullMode,
    ) -> Result<Self::Handle, Self::Error> {
        let pin = self.gpio.get(pin.address())?;
        Ok(match pull {
            PullMode::Off => pin.into_input(),
            PullMode::PullUp => pin.into_input_pullup(),
            PullMode::PullDown => pin.into_input_pulldown(),
        })
    }

    fn set_shutdown_options(
        &self,
        handle: &mut Self::Handle,
        unexport: bool,
    ) -> Result<(), Self::Error> {
        handle.set_reset_on_drop(unexport);
        Ok(())
    }

    fn add_listener(
        &self,
        handle: &mut Self::Handle,
        listener: Arc<dyn EdgeListener>,
    ) -> Result<(), Self::Error> {
        // rppal runs the callback on its own interrupt thread.
        handle.set_async_interrupt(Trigger::Both, move |level: Level| {
            listener.on_state_change(level.into())
        })
    }

    fn remove_all_listeners(
        &self,
        handle: &mut Self::Handle,
    ) -> Result<(), Self::Error> {
        handle.clear_async_interrupt()
    }

    fn unprovision(&self, handle: Self::Handle) -> Result<(), Self::Error> {
        drop(handle);
        Ok(())
    }
}
