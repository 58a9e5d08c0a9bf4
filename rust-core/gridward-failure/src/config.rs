// SPDX-License-Identifier: PMPL-1.0-or-later
//! Failure handling configuration.
//!
//! Applied operations are only collected when an error handler is
//! configured; without one nobody would read them. Defaults:
//! - error_handler: log

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use gridward_dialect::GridDialect;

use crate::dialect::InvocationCollectingDialect;
use crate::error::FailureError;
use crate::handler::{ErrorHandler, LoggingErrorHandler};
use crate::scope::FlushCycleRegistry;

/// Which error handler receives failed flush cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandlerSetting {
    /// No handler: operations are not collected at all.
    None,
    /// [`LoggingErrorHandler`].
    Log,
}

/// Configuration for applied-operation collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FailureConfig {
    pub error_handler: ErrorHandlerSetting,
}

impl FailureConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, FailureError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Whether dialects get wrapped in an [`InvocationCollectingDialect`].
    pub fn is_collecting(&self) -> bool {
        self.error_handler != ErrorHandlerSetting::None
    }

    /// The configured handler, if any.
    pub fn error_handler(&self) -> Option<Arc<dyn ErrorHandler>> {
        match self.error_handler {
            ErrorHandlerSetting::None => None,
            ErrorHandlerSetting::Log => Some(Arc::new(LoggingErrorHandler)),
        }
    }

    /// Wrap `dialect` for collection when a handler is configured, otherwise
    /// return it unwrapped.
    pub fn build_dialect<D>(&self, dialect: D) -> Arc<dyn GridDialect>
    where
        D: GridDialect + 'static,
    {
        if self.is_collecting() {
            Arc::new(InvocationCollectingDialect::new(dialect, FlushCycleRegistry))
        } else {
            Arc::new(dialect)
        }
    }
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            error_handler: ErrorHandlerSetting::Log,
        }
    }
}
