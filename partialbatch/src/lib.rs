//! Partial-batch record processing.
//!
//! A [`BatchProcessor`] runs a handler over every record of a [`Batch`] in
//! order and reports the identifiers of the records that failed, so that only
//! those are redelivered by whatever delivered the batch.

pub mod context;
pub mod error;
pub mod handler;
pub mod options;
pub mod processor;
pub mod record;
mod recover;

pub use context::Context;
pub use error::{
    BoxError,
    RecordError,
    UnsyncError,
};
pub use handler::{
    IntoRecordHandler,
    RecordHandler,
};
pub use options::{
    ErrorCallback,
    Options,
};
pub use processor::BatchProcessor;
pub use record::{
    Batch,
    FailureReport,
    Record,
};
