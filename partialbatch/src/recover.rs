use std::{
    panic::AssertUnwindSafe,
    sync::Arc,
};

use async_trait::async_trait;
use futures::FutureExt;

use crate::{
    context::Context,
    error::RecordError,
    handler::{
        HandlerResult,
        RecordHandler,
    },
};

/// Turns a panic raised while handling one record into a failed record.
pub(crate) struct Recover<R> {
    inner: Arc<dyn RecordHandler<R>>,
}

impl<R> Recover<R>
where
    R: Send + 'static,
{
    pub(crate) fn wrap(inner: Arc<dyn RecordHandler<R>>) -> Arc<dyn RecordHandler<R>> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl<R> RecordHandler<R> for Recover<R>
where
    R: Send + 'static,
{
    async fn handle(&self, ctx: Context, record: R) -> HandlerResult {
        match AssertUnwindSafe(self.inner.handle(ctx, record))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(RecordError::from_panic(payload)),
        }
    }
}
