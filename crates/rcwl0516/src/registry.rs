use std::sync::Arc;

use heapless::index_map::FnvIndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::backend::GpioBackend;
use crate::driver::Rcwl0516;
use crate::error::DriverError;
use crate::handler::MotionHandler;
use crate::pin::{canonical_name, Pin, PinName, ALLOWED_PIN_COUNT, DEFAULT_PIN};

/// Only allow-listed pins are ever inserted.
type DriverMap<G> = FnvIndexMap<PinName, Arc<Rcwl0516<G>>, ALLOWED_PIN_COUNT>;

/// Maps canonical pin names to driver instances.
///
/// Create one registry per process (or per test) and pass it to the code that
/// needs sensor access. Instances are created lazily on first lookup and are
/// kept until [`reset`](Self::reset); lookups of the same pin always return
/// the same instance.
///
/// The map lock is held only for map access, never while a backend call is
/// in flight, so lookups of existing instances run concurrently with each
/// other and with any driver's open or close.
pub struct DriverRegistry<G: GpioBackend> {
    backend: Arc<G>,
    drivers: RwLock<DriverMap<G>>,
}

impl<G: GpioBackend> DriverRegistry<G> {
    pub fn new(backend: G) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    /// Create a registry on a backend that is also used elsewhere.
    pub fn with_shared_backend(backend: Arc<G>) -> Self {
        Self { backend, drivers: RwLock::new(FnvIndexMap::new()) }
    }

    pub fn backend(&self) -> &Arc<G> {
        &self.backend
    }

    /// Driver for `pin`, creating it with `handler` if it does not exist yet.
    ///
    /// If the instance already exists it is returned unchanged and `handler`
    /// is discarded: a driver's handler is bound once, at creation.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidPin`] if `pin` is not in
    /// [`ALLOWED_PINS`](crate::ALLOWED_PINS).
    pub fn get_instance(
        &self,
        pin: Pin,
        handler: Option<Arc<dyn MotionHandler>>,
    ) -> Result<Arc<Rcwl0516<G>>, DriverError<G::Error>> {
        let key = canonical_name(&pin);

        if let Some(driver) = self.drivers.read().get(&key) {
            return Ok(reuse(driver, handler.is_some()));
        }

        let mut drivers = self.drivers.write();
        // another caller may have created it between the two locks
        if let Some(driver) = drivers.get(&key) {
            return Ok(reuse(driver, handler.is_some()));
        }

        let driver = Arc::new(Rcwl0516::new(pin, self.backend.clone(), handler)?);
        drivers
            .insert(key, driver.clone())
            .map_err(|_| DriverError::RegistryFull)?;
        debug!("{}instance created", driver.log_prefix());
        Ok(driver)
    }

    /// Driver for `pin` without binding a handler.
    pub fn get(
        &self,
        pin: Pin,
    ) -> Result<Arc<Rcwl0516<G>>, DriverError<G::Error>> {
        self.get_instance(pin, None)
    }

    /// Driver for [`DEFAULT_PIN`](crate::DEFAULT_PIN) without binding a handler.
    pub fn get_default(
        &self,
    ) -> Result<Arc<Rcwl0516<G>>, DriverError<G::Error>> {
        self.get_instance(DEFAULT_PIN, None)
    }

    /// Returns `true` if an instance exists for the pin's canonical name.
    pub fn contains(&self, pin: &Pin) -> bool {
        let key = canonical_name(pin);
        self.drivers.read().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.drivers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canonical names of all created instances, in creation order.
    pub fn names(&self) -> Vec<PinName> {
        self.drivers.read().keys().cloned().collect()
    }

    /// Close every instance and forget them.
    ///
    /// Instances still held by callers remain usable but are no longer
    /// returned by lookups. Returns the first close error, after attempting
    /// to close all instances.
    pub fn reset(&self) -> Result<(), DriverError<G::Error>> {
        let drivers: Vec<_> = {
            let mut drivers = self.drivers.write();
            let all: Vec<_> = drivers.values().cloned().collect();
            drivers.clear();
            all
        };

        let mut result = Ok(());
        for driver in drivers {
            if let Err(err) = driver.close() {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}

fn reuse<G: GpioBackend>(driver: &Arc<Rcwl0516<G>>, handler_given: bool) -> Arc<Rcwl0516<G>> {
    if handler_given {
        debug!("{}instance exists, handler ignored", driver.log_prefix());
    }
    driver.clone()
}
