use std::time::{
    Duration,
    Instant,
};

use tokio_util::sync::{
    CancellationToken,
    WaitForCancellationFuture,
};
use uuid::Uuid;

/// Per-invocation context handed to every record handler.
///
/// The processor never checks the deadline or the cancellation token itself;
/// handlers that need to stop early should observe them.
#[derive(Clone, Debug)]
pub struct Context {
    request_id: String,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl Context {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
