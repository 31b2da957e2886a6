use std::{
    fmt,
    sync::Arc,
};

use crate::{
    context::Context,
    error::RecordError,
};

/// Called with the identifier and error of every record that fails.
///
/// Typically used to log or alert. Panics raised here are not contained.
pub type ErrorCallback = Arc<dyn Fn(&Context, &str, &RecordError) + Send + Sync>;

/// Processing options shared by every kind of batch.
///
/// All options are off by default.
#[derive(Clone, Default)]
pub struct Options {
    /// Treat a panicking handler as a failed record instead of aborting the batch.
    pub recover_panics: bool,
    /// Fail every record after the first failure without handling it (FIFO sources).
    pub halt_on_first_error: bool,
    pub on_error: Option<ErrorCallback>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recover_panics(mut self, recover_panics: bool) -> Self {
        self.recover_panics = recover_panics;
        self
    }

    pub fn halt_on_first_error(mut self, halt_on_first_error: bool) -> Self {
        self.halt_on_first_error = halt_on_first_error;
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Context, &str, &RecordError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("recover_panics", &self.recover_panics)
            .field("halt_on_first_error", &self.halt_on_first_error)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
