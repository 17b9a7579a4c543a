//! Error types for livetrack.
//!
//! Tick generation itself cannot fail; errors come from configuration and
//! from driving session lifecycles in the wrong order.

use thiserror::Error;

use crate::task::TaskKind;

/// The main error type for livetrack operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// A session's timer was started twice.
    #[error("{task} is already running")]
    AlreadyRunning {
        /// The task that was already running.
        task: TaskKind,
    },

    /// A session was stopped without having been started.
    #[error("{task} is not running")]
    NotRunning {
        /// The task that was not running.
        task: TaskKind,
    },

    /// A tick callback panicked; the task is gone.
    #[error("scheduled task '{task}' panicked: {message}")]
    TaskPanicked {
        /// The task that panicked.
        task: TaskKind,
        /// Panic description from the runtime.
        message: String,
    },

    /// A selection referred to a shipment the session does not track.
    #[error("unknown shipment: {id}")]
    UnknownShipment {
        /// The id that was not found.
        id: String,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for livetrack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a task panicked error.
    #[must_use]
    pub fn task_panicked(task: TaskKind, message: impl Into<String>) -> Self {
        Self::TaskPanicked {
            task,
            message: message.into(),
        }
    }

    /// Create an unknown shipment error.
    #[must_use]
    pub fn unknown_shipment(id: impl Into<String>) -> Self {
        Self::UnknownShipment { id: id.into() }
    }

    /// Check if this error comes from calling a lifecycle operation out of order.
    #[must_use]
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(self, Self::AlreadyRunning { .. } | Self::NotRunning { .. })
    }

    /// Check if this error is a configuration problem.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigValidation { .. })
    }
}
