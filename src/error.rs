//! Error handling for msgroute
//!
//! This module defines the crate error type and a Result alias. Errors raised
//! by graph edits live in [`crate::routing::RoutingError`] and are wrapped
//! here; recoverable anomalies are not errors at all but
//! [`crate::routing::Diagnostic`]s.

use crate::routing::RoutingError;
use thiserror::Error;

/// Main error type for msgroute operations
#[derive(Error, Debug)]
pub enum MsgRouteError {
    /// An edit was rejected by the routing engine
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed graph document
    #[error("Document error: {0}")]
    Document(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MsgRouteError>,
    },
}

impl MsgRouteError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MsgRouteError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for MsgRouteError {
    fn from(err: serde_json::Error) -> Self {
        MsgRouteError::Serialization(err.to_string())
    }
}

/// Result type alias for msgroute operations
pub type Result<T> = std::result::Result<T, MsgRouteError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, RoutingError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MsgRouteError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| MsgRouteError::from(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::NodeId;

    #[test]
    fn test_error_display() {
        let err = MsgRouteError::Document("missing uid".to_string());
        assert_eq!(err.to_string(), "Document error: missing uid");
    }

    #[test]
    fn test_error_with_context() {
        let err = MsgRouteError::Config("bad".to_string());
        let with_ctx = err.with_context("Failed to load");
        assert!(with_ctx.to_string().starts_with("Failed to load: "));
    }

    #[test]
    fn test_routing_error_context() {
        let res: std::result::Result<(), RoutingError> = Err(RoutingError::NotAGroup(NodeId(3)));
        let err = res.context("Adding bus 'data'").unwrap_err();
        assert!(err.to_string().contains("Adding bus 'data'"));
        assert!(matches!(
            err,
            MsgRouteError::WithContext { ref source, .. }
                if matches!(**source, MsgRouteError::Routing(_))
        ));
    }
}
