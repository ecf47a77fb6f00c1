//! Cancellation handles for timers and event listeners.

use std::cell::Cell;
use std::rc::Rc;

/// A handle to a repeating timer or an event listener.
///
/// Dropping a subscription does not cancel it; only [`Subscription::cancel`]
/// does. Clones share the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct Subscription {
    cancelled: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the timer or listener. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let subscription = Subscription::new();
        let clone = subscription.clone();
        assert!(!clone.is_cancelled());

        subscription.cancel();
        assert!(clone.is_cancelled());
    }
}
