use std::any::Any;
use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a workload. All of these are fatal for the workload that hit them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to allocate {requested} {what}: {source}")]
    Allocation {
        what: &'static str,
        requested: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("failed to spawn {role} worker: {source}")]
    ThreadSpawn {
        role: String,
        #[source]
        source: io::Error,
    },
    #[error("{role} worker did not finish cleanly: {message}")]
    Join { role: String, message: String },
}

impl Error {
    /// Turn the payload of a panicked thread into a `Join` error.
    pub(crate) fn join(role: impl Into<String>, payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panicked with a non-string payload".to_string()
        };
        Error::Join { role: role.into(), message }
    }
}
