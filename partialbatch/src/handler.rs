//! Record handlers and the normalisation of the accepted handler shapes.
//!
//! A handler can be written in four shapes, any combination of taking the
//! [`Context`] or not and returning a `Result` or not:
//!
//! ```
//! use partialbatch::{BoxError, Context};
//!
//! async fn with_context(_ctx: Context, _record: String) -> Result<(), BoxError> { Ok(()) }
//! async fn context_only(_ctx: Context, _record: String) {}
//! async fn error_only(_record: String) -> Result<(), BoxError> { Ok(()) }
//! async fn bare(_record: String) {}
//! ```
//!
//! Every shape is turned into a [`RecordHandler`] once, when the processor is
//! built. Anything else does not implement [`IntoRecordHandler`] and is
//! rejected by the compiler. Closures need their argument types spelled out.

use std::{
    future::Future,
    sync::Arc,
};

use async_trait::async_trait;
use futures::future::{
    BoxFuture,
    FutureExt,
};

use crate::{
    context::Context,
    error::{
        BoxError,
        RecordError,
    },
};

pub type HandlerResult = Result<(), RecordError>;

/// The canonical handler every accepted shape is normalised into.
#[async_trait]
pub trait RecordHandler<R>: Send + Sync {
    async fn handle(&self, ctx: Context, record: R) -> HandlerResult;
}

/// Marker types naming the accepted handler shapes.
pub mod shape {
    pub struct WithContext;
    pub struct WithoutContext;
    pub struct Fallible;
    pub struct Infallible;
}

/// Conversion of one of the accepted handler shapes into a [`RecordHandler`].
///
/// `Shape` is inferred and never has to be named.
pub trait IntoRecordHandler<R, Shape>: Send + Sync + 'static {
    fn into_record_handler(self) -> Arc<dyn RecordHandler<R>>;
}

struct FnHandler<R> {
    call: Box<dyn Fn(Context, R) -> BoxFuture<'static, HandlerResult> + Send + Sync>,
}

impl<R> FnHandler<R>
where
    R: Send + 'static,
{
    fn boxed<F>(call: F) -> Arc<dyn RecordHandler<R>>
    where
        F: Fn(Context, R) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static,
    {
        Arc::new(Self {
            call: Box::new(call),
        })
    }
}

#[async_trait]
impl<R> RecordHandler<R> for FnHandler<R>
where
    R: Send + 'static,
{
    async fn handle(&self, ctx: Context, record: R) -> HandlerResult {
        (self.call)(ctx, record).await
    }
}

impl<R, F, Fut, E> IntoRecordHandler<R, (shape::WithContext, shape::Fallible)> for F
where
    R: Send + 'static,
    F: Fn(Context, R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    fn into_record_handler(self) -> Arc<dyn RecordHandler<R>> {
        FnHandler::boxed(move |ctx, record| {
            let handled = self(ctx, record);
            async move { handled.await.map_err(RecordError::handler) }.boxed()
        })
    }
}

impl<R, F, Fut> IntoRecordHandler<R, (shape::WithContext, shape::Infallible)> for F
where
    R: Send + 'static,
    F: Fn(Context, R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn into_record_handler(self) -> Arc<dyn RecordHandler<R>> {
        FnHandler::boxed(move |ctx, record| {
            self(ctx, record).map(Ok::<(), RecordError>).boxed()
        })
    }
}

impl<R, F, Fut, E> IntoRecordHandler<R, (shape::WithoutContext, shape::Fallible)> for F
where
    R: Send + 'static,
    F: Fn(R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    fn into_record_handler(self) -> Arc<dyn RecordHandler<R>> {
        FnHandler::boxed(move |_ctx, record| {
            let handled = self(record);
            async move { handled.await.map_err(RecordError::handler) }.boxed()
        })
    }
}

impl<R, F, Fut> IntoRecordHandler<R, (shape::WithoutContext, shape::Infallible)> for F
where
    R: Send + 'static,
    F: Fn(R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn into_record_handler(self) -> Arc<dyn RecordHandler<R>> {
        FnHandler::boxed(move |_ctx, record| {
            self(record).map(Ok::<(), RecordError>).boxed()
        })
    }
}
