//! Records, batches and the failure report produced for them.

use indexmap::IndexSet;

/// A unit of work with an identifier that is stable across redeliveries.
pub trait Record {
    fn identifier(&self) -> &str;
}

/// An ordered batch of records plus the optional continuation state of a windowed source.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<R, S = ()> {
    pub records: Vec<R>,
    pub state: Option<S>,
}

impl<R> Batch<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            state: None,
        }
    }
}

impl<R, S> Batch<R, S> {
    pub fn with_state<T>(self, state: T) -> Batch<R, T> {
        Batch {
            records: self.records,
            state: Some(state),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R> FromIterator<R> for Batch<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Identifiers of the records that have to be redelivered, in batch order.
#[derive(Clone, Debug, PartialEq)]
pub struct FailureReport<S = ()> {
    failures: IndexSet<String>,
    pub state: Option<S>,
}

impl<S> FailureReport<S> {
    pub(crate) fn new() -> Self {
        Self {
            failures: IndexSet::new(),
            state: None,
        }
    }

    pub(crate) fn push(&mut self, identifier: String) {
        self.failures.insert(identifier);
    }

    pub fn failures(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.failures.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Option<S>) {
        (self.failures.into_iter().collect(), self.state)
    }
}
