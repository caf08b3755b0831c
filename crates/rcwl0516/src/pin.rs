//! Pin identity and the sensor's pin allow-list.
//!
//! Pins are addressed with BCM (Broadcom) numbering. The RCWL-0516 output can
//! only be wired to the four interrupt-capable lines listed in
//! [`ALLOWED_PINS`]; any other pin is rejected when a driver instance is
//! first created.

use std::borrow::Cow;

use derive_more::Display;

/// A platform pin reference: BCM address plus the platform's display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pin {
    address: u8,
    name: Cow<'static, str>,
}

impl Pin {
    /// Create a pin reference with a static platform name.
    pub const fn new(address: u8, name: &'static str) -> Self {
        Self { address, name: Cow::Borrowed(name) }
    }

    /// Pin reference for a BCM address, named `"GPIO <address>"`.
    pub fn bcm(address: u8) -> Self {
        Self { address, name: Cow::Owned(format!("GPIO {address}")) }
    }

    /// BCM address of the pin.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Platform name, as reported by the GPIO layer (may contain whitespace).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical name of this pin; see [`canonical_name`].
    pub fn canonical_name(&self) -> PinName {
        canonical_name(self)
    }
}

/// Canonical pin name: the platform name with every whitespace character
/// replaced by `_`. Used as registry key and log prefix.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{_0}")]
pub struct PinName(String);

impl PinName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PinName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PinName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PinName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

pub const GPIO_10: Pin = Pin::new(10, "GPIO 10");
pub const GPIO_12: Pin = Pin::new(12, "GPIO 12");
pub const GPIO_13: Pin = Pin::new(13, "GPIO 13");
pub const GPIO_18: Pin = Pin::new(18, "GPIO 18");
pub const GPIO_19: Pin = Pin::new(19, "GPIO 19");

/// Number of entries in [`ALLOWED_PINS`].
pub const ALLOWED_PIN_COUNT: usize = 4;

/// Interrupt-capable pins the sensor output may be wired to.
pub const ALLOWED_PINS: [Pin; ALLOWED_PIN_COUNT] = [GPIO_18, GPIO_19, GPIO_12, GPIO_13];

/// Pin used by [`DriverRegistry::get_default`](crate::DriverRegistry::get_default).
pub const DEFAULT_PIN: Pin = GPIO_18;

/// Normalize a pin reference into its canonical name.
///
/// Each whitespace character is replaced individually, runs are not
/// collapsed: `"GPIO  18"` becomes `"GPIO__18"`.
pub fn canonical_name(pin: &Pin) -> PinName {
    PinName(
        pin.name()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect(),
    )
}

/// Returns `true` if `pin` is one of [`ALLOWED_PINS`].
pub fn is_allowed(pin: &Pin) -> bool {
    ALLOWED_PINS.contains(pin)
}

/// Human readable allow-list, e.g. `"GPIO_18, GPIO_19, GPIO_12 or GPIO_13"`.
pub fn allowed_pin_names() -> String {
    let names: Vec<String> =
        ALLOWED_PINS.iter().map(|p| canonical_name(p).0).collect();
    match names.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => String::new(),
    }
}

/// Check `pin` against the allow-list.
///
/// On rejection returns the canonical name of the offending pin so callers can
/// build an [`InvalidPin`](crate::DriverError::InvalidPin) error.
pub fn validate(pin: &Pin) -> Result<&Pin, PinName> {
    if is_allowed(pin) {
        Ok(pin)
    } else {
        Err(canonical_name(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_replaces_whitespace() {
        assert_eq!(canonical_name(&GPIO_18), "GPIO_18");
        assert_eq!(canonical_name(&Pin::new(5, "GPIO\t5")), "GPIO_5");
    }

    #[test]
    fn canonical_name_does_not_collapse_runs() {
        let pin = Pin::new(18, "GPIO  18");
        assert_eq!(canonical_name(&pin).as_str(), "GPIO__18");
    }

    #[test]
    fn bcm_pins_match_constants() {
        assert_eq!(Pin::bcm(18), GPIO_18);
        assert_eq!(Pin::bcm(13), GPIO_13);
        assert_ne!(Pin::bcm(10), GPIO_18);
    }

    #[test]
    fn allow_list_accepts_only_interrupt_pins() {
        for pin in ALLOWED_PINS.iter() {
            assert!(validate(pin).is_ok());
        }
        assert_eq!(validate(&GPIO_10), Err(PinName("GPIO_10".into())));
        assert!(validate(&Pin::bcm(4)).is_err());
    }

    #[test]
    fn same_address_different_name_is_rejected() {
        let pin = Pin::new(18, "PWM0");
        assert!(!is_allowed(&pin));
    }

    #[test]
    fn allowed_names_are_enumerated() {
        assert_eq!(allowed_pin_names(), "GPIO_18, GPIO_19, GPIO_12 or GPIO_13");
    }

    #[test]
    fn default_pin_is_allowed() {
        assert!(is_allowed(&DEFAULT_PIN));
    }
}
