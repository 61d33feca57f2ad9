//! Per-invocation call context supplied by the hosting environment.

use rust_decimal::Decimal;
use weeklyrace_types::Identity;

/// The verified caller of an entry point and the value attached to the call.
///
/// The environment guarantees `value` was attached atomically: if the
/// invocation is rejected, the value is never captured by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Identity,
    pub value: Decimal,
}

impl CallContext {
    /// A call with no value attached.
    #[must_use]
    pub fn new(caller: Identity) -> Self {
        Self {
            caller,
            value: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn carries_value(&self) -> bool {
        !self.value.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_no_value() {
        let ctx = CallContext::new(Identity::random());
        assert!(!ctx.carries_value());
        assert!(ctx.with_value(Decimal::ONE).carries_value());
    }
}
