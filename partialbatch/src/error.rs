//! Errors produced while processing a single record.

use std::{
    any::Any,
    error::Error as StdError,
    fmt,
    io,
    sync::{
        Mutex,
        PoisonError,
    },
};

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why one record of a batch failed.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The handler returned an error.
    #[error(transparent)]
    Handler(BoxError),

    /// The handler panicked and the panic was recovered.
    ///
    /// `source` is only kept for payloads that are errors: a [`BoxError`], a
    /// `Box<dyn Error + Send>` (wrapped in [`UnsyncError`]) or an [`io::Error`].
    /// Any other error type cannot be recognised behind `dyn Any`.
    #[error("panic: {message}")]
    Panic {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl RecordError {
    pub fn handler(error: impl Into<BoxError>) -> Self {
        Self::Handler(error.into())
    }

    /// Converts a panic payload, keeping it as the source when it already is an error.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<BoxError>() {
            Ok(error) => {
                return Self::Panic {
                    message: error.to_string(),
                    source: Some(*error),
                }
            }
            Err(payload) => payload,
        };

        let payload = match payload.downcast::<Box<dyn StdError + Send>>() {
            Ok(error) => {
                return Self::Panic {
                    message: error.to_string(),
                    source: Some(Box::new(UnsyncError::new(*error))),
                }
            }
            Err(payload) => payload,
        };

        let payload = match payload.downcast::<io::Error>() {
            Ok(error) => {
                return Self::Panic {
                    message: error.to_string(),
                    source: Some(error),
                }
            }
            Err(payload) => payload,
        };

        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_owned(),
                Err(_) => "Box<dyn Any>".to_owned(),
            },
        };

        Self::Panic {
            message,
            source: None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic { .. })
    }
}

/// An error panic payload that is `Send` but not `Sync`.
#[derive(Debug)]
pub struct UnsyncError(Mutex<Box<dyn StdError + Send>>);

impl UnsyncError {
    fn new(error: Box<dyn StdError + Send>) -> Self {
        Self(Mutex::new(error))
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send> {
        self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for UnsyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        fmt::Display::fmt(&**error, f)
    }
}

impl StdError for UnsyncError {}
