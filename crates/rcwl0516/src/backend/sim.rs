//! Simulated GPIO backend.
//!
//! Keeps pin bookkeeping in memory and lets callers inject synthetic state
//! changes with [`SimulatedGpio::inject`]. Used by the tests and by the demo
//! binary when no hardware is present.

use std::collections::HashMap;
use std::sync::Arc;

use derive_more::Display;
use parking_lot::{Mutex, MutexGuard};

use super::{EdgeListener, GpioBackend, PinState, PullMode};
use crate::pin::Pin;

/// Errors reported by [`SimulatedGpio`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// The pin is already provisioned.
    #[display("pin {_0} already in use")]
    PinInUse(u8),
    /// The handle does not refer to a provisioned pin.
    #[display("pin {_0} is not provisioned")]
    NotProvisioned(u8),
    /// Failure requested through [`SimulatedGpio::fail_next_provision`].
    #[display("injected provisioning failure")]
    Injected,
}

impl std::error::Error for SimError {}

/// Handle to a pin provisioned on a [`SimulatedGpio`].
#[derive(Debug)]
pub struct SimHandle {
    address: u8,
}

impl SimHandle {
    pub fn address(&self) -> u8 {
        self.address
    }
}

struct SimPin {
    pull: PullMode,
    unexport_on_shutdown: bool,
    listeners: Vec<Arc<dyn EdgeListener>>,
}

#[derive(Default)]
struct SimState {
    pins: HashMap<u8, SimPin>,
    provision_count: usize,
    unprovision_count: usize,
    fail_next: bool,
}

/// In-memory GPIO backend.
#[derive(Default)]
pub struct SimulatedGpio {
    state: Mutex<SimState>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock()
    }

    /// Deliver a state change to every listener on `pin`.
    ///
    /// Listeners run on the calling thread, after the internal lock has been
    /// released. Returns the number of listeners notified.
    pub fn inject(&self, pin: &Pin, level: PinState) -> usize {
        let listeners = match self.state().pins.get(&pin.address()) {
            Some(p) => p.listeners.clone(),
            None => return 0,
        };
        for listener in &listeners {
            listener.on_state_change(level);
        }
        listeners.len()
    }

    /// Make the next `provision` call fail with [`SimError::Injected`].
    pub fn fail_next_provision(&self) {
        self.state().fail_next = true;
    }

    /// Total successful `provision` calls.
    pub fn provision_count(&self) -> usize {
        self.state().provision_count
    }

    /// Total successful `unprovision` calls.
    pub fn unprovision_count(&self) -> usize {
        self.state().unprovision_count
    }

    pub fn is_provisioned(&self, pin: &Pin) -> bool {
        self.state().pins.contains_key(&pin.address())
    }

    /// Pull mode `pin` was provisioned with, if it is provisioned.
    pub fn pull_mode(&self, pin: &Pin) -> Option<PullMode> {
        self.state().pins.get(&pin.address()).map(|p| p.pull)
    }

    /// Shutdown option of `pin`, if it is provisioned.
    pub fn unexport_on_shutdown(&self, pin: &Pin) -> Option<bool> {
        self.state().pins.get(&pin.address()).map(|p| p.unexport_on_shutdown)
    }

    pub fn listener_count(&self, pin: &Pin) -> usize {
        self.state()
            .pins
            .get(&pin.address())
            .map_or(0, |p| p.listeners.len())
    }
}

impl GpioBackend for SimulatedGpio {
    type Handle = SimHandle;
    type Error = SimError;

    fn provision(
        &self,
        pin: &Pin,
        pull: PullMode,
    ) -> Result<Self::Handle, Self::Error> {
        let mut state = self.state();
        if state.fail_next {
            state.fail_next = false;
            return Err(SimError::Injected);
        }
        if state.pins.contains_key(&pin.address()) {
            return Err(SimError::PinInUse(pin.address()));
        }
        state.pins.insert(
            pin.address(),
            SimPin { pull, unexport_on_shutdown: false, listeners: Vec::new() },
        );
        state.provision_count += 1;
        Ok(SimHandle { address: pin.address() })
    }

    fn set_shutdown_options(
        &self,
        handle: &mut Self::Handle,
        unexport: bool,
    ) -> Result<(), Self::Error> {
        let mut state = self.state();
        let pin = state
            .pins
            .get_mut(&handle.address)
            .ok_or(SimError::NotProvisioned(handle.address))?;
        pin.unexport_on_shutdown = unexport;
        Ok(())
    }

    fn add_listener(
        &self,
        handle: &mut Self::Handle,
        listener: Arc<dyn EdgeListener>,
    ) -> Result<(), Self::Error> {
        let mut state = self.state();
        let pin = state
            .pins
            .get_mut(&handle.address)
            .ok_or(SimError::NotProvisioned(handle.address))?;
        pin.listeners.push(listener);
        Ok(())
    }

    fn remove_all_listeners(
        &self,
        handle: &mut Self::Handle,
    ) -> Result<(), Self::Error> {
        let mut state = self.state();
        let pin = state
            .pins
            .get_mut(&handle.address)
            .ok_or(SimError::NotProvisioned(handle.address))?;
        pin.listeners.clear();
        Ok(())
    }

    fn unprovision(&self, handle: Self::Handle) -> Result<(), Self::Error> {
        let mut state = self.state();
        state
            .pins
            .remove(&handle.address)
            .ok_or(SimError::NotProvisioned(handle.address))?;
        state.unprovision_count += 1;
        Ok(())
    }
}
