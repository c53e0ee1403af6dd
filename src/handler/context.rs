//! Invocation context passed through from the host runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Execution context of one invocation.
///
/// The resolver never inspects it; it is handed to handlers untouched so
/// they can correlate logs or check the remaining time budget themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Request ID assigned by the host for this invocation.
    pub request_id: String,
    /// Name of the deployed function.
    pub function_name: String,
    /// Version or alias of the deployed function.
    pub function_version: Option<String>,
    /// ARN the function was invoked through.
    pub invoked_function_arn: Option<String>,
    /// Invocation deadline in milliseconds since the Unix epoch.
    pub deadline_ms: Option<u64>,
    /// Anything else the host wants handlers to see.
    pub extras: HashMap<String, String>,
}

impl InvocationContext {
    /// Create a new invocation context.
    pub fn new(function_name: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            function_name: function_name.into(),
            ..Self::default()
        }
    }

    /// Set the invocation deadline.
    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    /// Add an extra value.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Get an extra value.
    pub fn get_extra(&self, key: &str) -> Option<&String> {
        self.extras.get(key)
    }
}
