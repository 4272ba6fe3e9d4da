//! Handling of introspection failures raised while scanning
//!
//! A failing rung never aborts a scan. The scanner reports the error to a
//! [`FailureHandler`] and treats the rung as yielding nothing further.

use std::sync::Arc;

use heritage_types::{Element, IntrospectionError};
use serde::Deserialize;
use tracing::{debug, warn};

/// Receives errors the scanner contains
pub trait FailureHandler: Send + Sync {
    /// Called once per contained failure
    fn handle(&self, element: Element, error: &IntrospectionError);
}

impl<F> FailureHandler for F
where
    F: Fn(Element, &IntrospectionError) + Send + Sync,
{
    fn handle(&self, element: Element, error: &IntrospectionError) {
        self(element, error)
    }
}

/// Drops failures silently
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreFailures;

impl FailureHandler for IgnoreFailures {
    fn handle(&self, _element: Element, _error: &IntrospectionError) {}
}

/// Logs failures and continues
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFailures;

impl FailureHandler for LogFailures {
    fn handle(&self, element: Element, error: &IntrospectionError) {
        match error {
            // a missing dependency is routine; keep it out of the default log level
            IntrospectionError::TypeNotPresent { .. } => {
                debug!(target: "heritage::scan", element = %element, error = %error,
                    "Failed to introspect metadata");
            }
            _ => {
                warn!(target: "heritage::scan", element = %element, error = %error,
                    "Failed to introspect metadata");
            }
        }
    }
}

/// Configured failure policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Drop failures
    Ignore,
    /// Log failures and continue
    #[default]
    Log,
}

impl FailurePolicy {
    /// Build the handler for this policy
    pub fn handler(self) -> Arc<dyn FailureHandler> {
        match self {
            FailurePolicy::Ignore => Arc::new(IgnoreFailures),
            FailurePolicy::Log => Arc::new(LogFailures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use heritage_types::TypeRegistry;

    #[test]
    fn test_closure_handler() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let handler: Arc<dyn FailureHandler> = Arc::new(move |_: Element, _: &IntrospectionError| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let root = TypeRegistry::new().root();
        let error = IntrospectionError::TypeNotPresent {
            name: "ext.Gone".to_string(),
        };
        handler.handle(Element::Type(root), &error);
        handler.handle(Element::Type(root), &error);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_policy_default_is_log() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Log);
    }
}
