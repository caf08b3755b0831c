use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use portable_atomic::{AtomicU8, Ordering};
use tracing::{debug, error, info, warn};

use crate::backend::{GpioBackend, PullMode};
use crate::dispatcher::Dispatcher;
use crate::error::DriverError;
use crate::handler::MotionHandler;
use crate::pin::{allowed_pin_names, canonical_name, validate, Pin, PinName};

/// Usage flag values. Only the 0 -> 1 and 1 -> 0 transitions do any work.
/// The flag is written under the instance lock and read without it.
const CLOSED: u8 = 0;
const OPEN: u8 = 1;

/// Driver instance for one RCWL-0516 sensor output pin.
///
/// Instances are created by [`DriverRegistry`](crate::DriverRegistry), one per
/// pin, and live as long as the registry. The pin is provisioned on the first
/// [`open`](Self::open) and released on the matching [`close`](Self::close).
///
/// The usage counter is a single open/closed bit, not a nested reference
/// count: a second `open` from another caller is a no-op, and the first
/// `close` from any caller releases the pin.
pub struct Rcwl0516<G: GpioBackend> {
    pin: Pin,
    name: PinName,
    log_prefix: String,
    backend: Arc<G>,
    handler: Option<Arc<dyn MotionHandler>>,
    usage: AtomicU8,
    /// Provisioned pin. Serializes open/close of this instance only.
    io: Mutex<Option<G::Handle>>,
}

impl<G: GpioBackend> Rcwl0516<G> {
    /// Pull resistor the sensor input is provisioned with. Holds the line low
    /// while the sensor output is inactive or disconnected.
    pub const PULL_MODE: PullMode = PullMode::PullDown;

    /// Validate `pin` and create a closed driver. Only called by the registry.
    pub(crate) fn new(
        pin: Pin,
        backend: Arc<G>,
        handler: Option<Arc<dyn MotionHandler>>,
    ) -> Result<Self, DriverError<G::Error>> {
        if let Err(rejected) = validate(&pin) {
            return Err(DriverError::InvalidPin {
                pin: rejected,
                allowed: allowed_pin_names(),
            });
        }

        let name = canonical_name(&pin);
        let log_prefix = format!("[{name}] ");
        Ok(Self {
            pin,
            name,
            log_prefix,
            backend,
            handler,
            usage: AtomicU8::new(CLOSED),
            io: Mutex::new(None),
        })
    }

    /// Provision the pin and start delivering events to the handler.
    ///
    /// No-op if the driver is already open. On error the driver stays closed.
    /// Only this instance's lock is held while the backend works, so other
    /// pins are never blocked by a slow provision.
    pub fn open(&self) -> Result<(), DriverError<G::Error>> {
        let mut io = self.io.lock();
        debug!("{}before - usage:{}", self.log_prefix, self.usage());

        let mut result = Ok(());
        if io.is_none() {
            match self.provision() {
                Ok(handle) => {
                    *io = Some(handle);
                    // published only once the handle is in place
                    self.usage.store(OPEN, Ordering::Release);
                    info!("{}opened", self.log_prefix);
                }
                Err(err) => {
                    error!("{}open failed: {:?}", self.log_prefix, err);
                    result = Err(DriverError::Provisioning(err));
                }
            }
        }

        debug!("{}after - usage:{}", self.log_prefix, self.usage());
        result
    }

    /// Stop event delivery and release the pin.
    ///
    /// No-op if the driver is already closed. A backend failure is returned,
    /// but the handle is surrendered and the driver ends up closed either way.
    pub fn close(&self) -> Result<(), DriverError<G::Error>> {
        let mut io = self.io.lock();
        debug!("{}before - usage:{}", self.log_prefix, self.usage());

        let mut result = Ok(());
        if let Some(mut handle) = io.take() {
            self.usage.store(CLOSED, Ordering::Release);
            let removed = self.backend.remove_all_listeners(&mut handle);
            let released = self.backend.unprovision(handle);
            match removed.and(released) {
                Ok(()) => info!("{}closed", self.log_prefix),
                Err(err) => {
                    error!("{}close failed: {:?}", self.log_prefix, err);
                    result = Err(DriverError::Release(err));
                }
            }
        }

        debug!("{}after - usage:{}", self.log_prefix, self.usage());
        result
    }

    fn provision(&self) -> Result<G::Handle, G::Error> {
        let mut handle = self.backend.provision(&self.pin, Self::PULL_MODE)?;

        let dispatcher = Dispatcher::new(
            self.name.clone(),
            self.log_prefix.clone(),
            self.handler.clone(),
        );
        let configured = self
            .backend
            .set_shutdown_options(&mut handle, true)
            .and_then(|()| self.backend.add_listener(&mut handle, Arc::new(dispatcher)));

        if let Err(err) = configured {
            // Don't leak a half-configured pin.
            if let Err(release_err) = self.backend.unprovision(handle) {
                warn!("{}release after failed open: {:?}", self.log_prefix, release_err);
            }
            return Err(err);
        }
        Ok(handle)
    }

    /// Returns `true` while the pin is provisioned.
    pub fn is_open(&self) -> bool {
        self.usage.load(Ordering::Acquire) == OPEN
    }

    /// Current usage flag, `0` (closed) or `1` (open).
    pub fn usage(&self) -> u8 {
        self.usage.load(Ordering::Relaxed)
    }

    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    /// Canonical pin name.
    pub fn name(&self) -> &PinName {
        &self.name
    }

    /// `"[<name>] "`, prepended to every log line of this instance.
    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl<G: GpioBackend> fmt::Debug for Rcwl0516<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rcwl0516")
            .field("name", &self.name)
            .field("usage", &self.usage())
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
