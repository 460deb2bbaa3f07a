//! Operation Context
//!
//! Request metadata carried through handlers for log correlation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header used to propagate the correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Context for an operation, used for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContext {
    /// Correlation ID for request tracing
    pub correlation_id: Uuid,
}

impl OperationContext {
    /// Create a context with a fresh correlation ID
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Create context with a caller-supplied correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Reuse the caller's correlation id when it parses, otherwise generate one
    pub fn from_header(value: Option<&str>) -> Self {
        match value.and_then(|s| Uuid::parse_str(s.trim()).ok()) {
            Some(id) => Self::new().with_correlation_id(id),
            None => Self::new(),
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let correlation_id = Uuid::new_v4();
        let context = OperationContext::new().with_correlation_id(correlation_id);
        assert_eq!(context.correlation_id, correlation_id);
    }

    #[test]
    fn test_from_header() {
        let id = Uuid::new_v4();
        let context = OperationContext::from_header(Some(&id.to_string()));
        assert_eq!(context.correlation_id, id);

        // Garbage is replaced, not rejected
        let context = OperationContext::from_header(Some("not-a-uuid"));
        assert_ne!(context.correlation_id, Uuid::nil());

        let a = OperationContext::from_header(None);
        let b = OperationContext::from_header(None);
        assert_ne!(a.correlation_id, b.correlation_id);
    }
}
