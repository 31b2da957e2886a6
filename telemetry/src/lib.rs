//! Log output for the batch processors.
//!
//! Events are filtered with an [`EnvFilter`] directive and written as text or
//! JSON, either to stdout or to a daily rolling file.

use std::{
    env,
    path::PathBuf,
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::ParseError,
    fmt::{
        self,
        writer::BoxMakeWriter,
    },
    layer::SubscriberExt,
    util::{
        SubscriberInitExt,
        TryInitError,
    },
    EnvFilter,
    Layer,
    Registry,
};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("unknown log format: {0}")]
    Format(String),

    #[error("could not install the global subscriber: {0}")]
    Init(#[from] TryInitError),
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(TelemetryError::Format(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info,partialbatch=debug`.
    pub filter: String,
    pub format: LogFormat,
    /// Write to daily rolling files in this directory instead of stdout.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Text,
            directory: None,
            file_prefix: "partialbatch.log".to_owned(),
        }
    }
}

impl LogConfig {
    /// Reads `RUST_LOG`, `LOG_FORMAT` and `LOG_DIRECTORY`, falling back to the defaults.
    pub fn from_env() -> Result<Self, TelemetryError> {
        let mut config = Self::default();

        if let Ok(filter) = env::var(EnvFilter::DEFAULT_ENV) {
            config.filter = filter;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Ok(directory) = env::var("LOG_DIRECTORY") {
            config.directory = Some(directory.into());
        }

        Ok(config)
    }
}

/// Keeps the background log writer alive. Buffered lines are flushed on drop.
#[must_use]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

pub fn subscriber(
    config: &LogConfig,
) -> Result<(Box<dyn Subscriber + Send + Sync>, LogGuard), TelemetryError> {
    let filter = EnvFilter::try_new(&config.filter)?;

    let (writer, worker) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(worker))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };
    let ansi = worker.is_none();

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Text => fmt::layer()
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    };

    let subscriber = Registry::default().with(layer).with(filter);

    Ok((Box::new(subscriber), LogGuard { _worker: worker }))
}

/// Installs the subscriber described by `config` as the global default.
pub fn init(config: &LogConfig) -> Result<LogGuard, TelemetryError> {
    let (subscriber, guard) = subscriber(config)?;
    subscriber.try_init()?;

    tracing::debug!(filter = %config.filter, format = ?config.format, "logging initialised");

    Ok(guard)
}
