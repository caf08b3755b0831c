use std::convert::Infallible;
use std::sync::Arc;

use chrono::Local;
use tracing::{error, trace};

use crate::backend::{EdgeListener, PinState};
use crate::error::DriverError;
use crate::handler::MotionHandler;
use crate::pin::PinName;

/// Translates raw pin state changes into handler calls.
///
/// One dispatcher is installed per open driver. It does not queue, debounce
/// or coalesce: each high/low notification produces exactly one handler call
/// on the delivering context.
pub(crate) struct Dispatcher {
    name: PinName,
    log_prefix: String,
    handler: Option<Arc<dyn MotionHandler>>,
}

impl Dispatcher {
    pub(crate) fn new(
        name: PinName,
        log_prefix: String,
        handler: Option<Arc<dyn MotionHandler>>,
    ) -> Self {
        Self { name, log_prefix, handler }
    }

    fn deliver(&self, detected: bool) {
        let observed_at = Local::now();
        match &self.handler {
            Some(handler) => handler.handle(self.name.as_str(), detected, observed_at),
            None => {
                let err = DriverError::<Infallible>::MissingHandler {
                    pin: self.name.clone(),
                };
                error!("{}{}", self.log_prefix, err);
                panic!("{err}");
            }
        }
    }
}

impl EdgeListener for Dispatcher {
    fn on_state_change(&self, state: PinState) {
        trace!("{}{} -> {}", self.log_prefix, self.name, state);

        match state {
            PinState::High => self.deliver(true),
            PinState::Low => self.deliver(false),
            PinState::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::handler::MotionEvent;

    fn dispatcher(handler: Option<Arc<dyn MotionHandler>>) -> Dispatcher {
        Dispatcher::new(
            crate::pin::canonical_name(&crate::pin::GPIO_18),
            "[GPIO_18] ".into(),
            handler,
        )
    }

    #[test]
    fn levels_map_to_detected_flag() {
        let (tx, rx) = mpsc::channel::<MotionEvent>();
        let d = dispatcher(Some(Arc::new(tx)));

        let before = Local::now();
        d.on_state_change(PinState::High);
        d.on_state_change(PinState::Unknown);
        d.on_state_change(PinState::Low);
        drop(d);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events[0].detected);
        assert!(!events[1].detected);
        assert_eq!(events[0].pin_name, "GPIO_18");
        assert!(events[0].observed_at >= before);
        assert!(events[1].observed_at >= events[0].observed_at);
    }

    #[test]
    fn unknown_state_without_handler_is_ignored() {
        dispatcher(None).on_state_change(PinState::Unknown);
    }

    #[test]
    #[should_panic(expected = "no handler bound")]
    fn edge_without_handler_panics() {
        dispatcher(None).on_state_change(PinState::High);
    }
}
