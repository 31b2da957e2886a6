use std::{
    fmt,
    sync::Arc,
    time::Instant,
};

use tracing::Instrument;

use crate::{
    context::Context,
    handler::{
        IntoRecordHandler,
        RecordHandler,
    },
    options::Options,
    record::{
        Batch,
        FailureReport,
        Record,
    },
    recover::Recover,
};

/// Runs a handler over every record of a batch and reports the ones that failed.
///
/// Records are handled one at a time, in batch order. A failed record never
/// fails the batch: its identifier is added to the [`FailureReport`]. A panic
/// in the handler unwinds out of [`BatchProcessor::process`] unless
/// [`Options::recover_panics`] is set.
pub struct BatchProcessor<R> {
    handler: Arc<dyn RecordHandler<R>>,
    options: Options,
}

impl<R> BatchProcessor<R>
where
    R: Record + Send + 'static,
{
    pub fn new<H, S>(handler: H, options: Options) -> Self
    where
        H: IntoRecordHandler<R, S>,
    {
        let mut handler = handler.into_record_handler();

        if options.recover_panics {
            handler = Recover::wrap(handler);
        }

        Self { handler, options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub async fn process<S>(&self, ctx: &Context, batch: Batch<R, S>) -> FailureReport<S> {
        let Batch { records, state } = batch;

        let span = tracing::info_span!(
            "partial_batch",
            request_id = ctx.request_id(),
            records = records.len()
        );

        async move {
            let start_time = Instant::now();
            let mut report = FailureReport::new();
            let mut records = records.into_iter().enumerate();

            while let Some((index, record)) = records.next() {
                let record_id = record.identifier().to_owned();

                tracing::debug!(index, record_id = %record_id, "handling record");

                let error = match self.handler.handle(ctx.clone(), record).await {
                    Ok(()) => continue,
                    Err(error) => error,
                };

                tracing::warn!(index, record_id = %record_id, %error, "failed to handle record");

                report.push(record_id.clone());

                if let Some(on_error) = &self.options.on_error {
                    on_error(ctx, &record_id, &error);
                }

                if self.options.halt_on_first_error {
                    let skipped = records.len();
                    for (_, record) in records.by_ref() {
                        report.push(record.identifier().to_owned());
                    }

                    tracing::warn!(
                        index,
                        skipped,
                        "halting batch, remaining records marked as failed"
                    );
                    break;
                }
            }

            tracing::debug!(
                failed = report.len(),
                "batch handled in {:?}",
                start_time.elapsed()
            );

            report.state = state;
            report
        }
        .instrument(span)
        .await
    }
}

impl<R> fmt::Debug for BatchProcessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::AssertUnwindSafe,
        sync::{
            atomic::{
                AtomicUsize,
                Ordering,
            },
            Mutex,
        },
    };

    use futures::FutureExt;

    use super::*;
    use crate::error::{
        BoxError,
        RecordError,
    };

    #[derive(Clone, Debug)]
    struct Item {
        id: &'static str,
        outcome: Outcome,
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Outcome {
        Ok,
        Fail,
        Panic,
    }

    impl Record for Item {
        fn identifier(&self) -> &str {
            self.id
        }
    }

    fn item(id: &'static str, outcome: Outcome) -> Item {
        Item { id, outcome }
    }

    fn abc() -> Batch<Item> {
        Batch::new(vec![
            item("a", Outcome::Ok),
            item("b", Outcome::Fail),
            item("c", Outcome::Ok),
        ])
    }

    /// Processor whose handler records the identifiers it was called with.
    fn counting(options: Options) -> (BatchProcessor<Item>, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        let processor = BatchProcessor::new(
            move |_ctx: Context, item: Item| {
                seen.lock().unwrap().push(item.id);
                async move {
                    match item.outcome {
                        Outcome::Ok => Ok(()),
                        Outcome::Fail => Err(BoxError::from(format!("{} failed", item.id))),
                        Outcome::Panic => panic!("{} panicked", item.id),
                    }
                }
            },
            options,
        );
        (processor, calls)
    }

    fn failures<S>(report: &FailureReport<S>) -> Vec<&str> {
        report.failures().collect()
    }

    #[tokio::test]
    async fn all_successful_records_report_nothing() {
        let (processor, calls) = counting(Options::new());
        let batch = Batch::new(vec![item("a", Outcome::Ok), item("b", Outcome::Ok)]);

        let report = processor.process(&Context::new(), batch).await;

        assert!(report.is_empty());
        assert_eq!(*calls.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test]
    async fn empty_batch() {
        let (processor, calls) = counting(Options::new().halt_on_first_error(true));

        let report = processor.process(&Context::new(), Batch::new(vec![])).await;

        assert!(report.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_failed_records_are_reported() {
        let (processor, calls) = counting(Options::new());

        let report = processor.process(&Context::new(), abc()).await;

        assert_eq!(failures(&report), ["b"]);
        assert_eq!(*calls.lock().unwrap(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn failures_anywhere_in_the_batch() {
        let (processor, _) = counting(Options::new());
        let batch = Batch::new(vec![
            item("a", Outcome::Fail),
            item("b", Outcome::Ok),
            item("c", Outcome::Ok),
            item("d", Outcome::Fail),
            item("e", Outcome::Ok),
            item("f", Outcome::Fail),
        ]);

        let report = processor.process(&Context::new(), batch).await;

        assert_eq!(failures(&report), ["a", "d", "f"]);
    }

    #[tokio::test]
    async fn halt_marks_the_rest_without_handling_it() {
        let (processor, calls) = counting(Options::new().halt_on_first_error(true));

        let report = processor.process(&Context::new(), abc()).await;

        assert_eq!(failures(&report), ["b", "c"]);
        assert_eq!(*calls.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test]
    async fn halt_on_the_last_record() {
        let (processor, calls) = counting(Options::new().halt_on_first_error(true));
        let batch = Batch::new(vec![item("a", Outcome::Ok), item("b", Outcome::Fail)]);

        let report = processor.process(&Context::new(), batch).await;

        assert_eq!(failures(&report), ["b"]);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn on_error_sees_every_failure() {
        let observed = Arc::new(Mutex::new(Vec::new()));
        let options = Options::new().on_error({
            let observed = observed.clone();
            move |ctx: &Context, id: &str, error: &RecordError| {
                observed.lock().unwrap().push(format!(
                    "{}/{}/{}",
                    ctx.request_id(),
                    id,
                    error
                ));
            }
        });
        let (processor, _) = counting(options);
        let batch = Batch::new(vec![
            item("a", Outcome::Fail),
            item("b", Outcome::Ok),
            item("c", Outcome::Fail),
        ]);

        processor
            .process(&Context::new().with_request_id("req"), batch)
            .await;

        assert_eq!(
            *observed.lock().unwrap(),
            ["req/a/a failed", "req/c/c failed"]
        );
    }

    #[tokio::test]
    async fn on_error_is_not_called_for_halted_records() {
        let observed = Arc::new(AtomicUsize::new(0));
        let options = Options::new().halt_on_first_error(true).on_error({
            let observed = observed.clone();
            move |_: &Context, _: &str, _: &RecordError| {
                observed.fetch_add(1, Ordering::SeqCst);
            }
        });
        let (processor, _) = counting(options);

        let report = processor.process(&Context::new(), abc()).await;

        assert_eq!(report.len(), 2);
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovered_panic_fails_only_that_record() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let options = Options::new().recover_panics(true).on_error({
            let errors = errors.clone();
            move |_: &Context, _: &str, error: &RecordError| {
                errors.lock().unwrap().push(error.is_panic());
            }
        });
        let (processor, calls) = counting(options);
        let batch = Batch::new(vec![
            item("a", Outcome::Ok),
            item("b", Outcome::Panic),
            item("c", Outcome::Ok),
        ]);

        let report = processor.process(&Context::new(), batch).await;

        assert_eq!(failures(&report), ["b"]);
        assert_eq!(*calls.lock().unwrap(), ["a", "b", "c"]);
        assert_eq!(*errors.lock().unwrap(), [true]);
    }

    #[tokio::test]
    async fn recovered_panic_still_halts() {
        let (processor, calls) = counting(
            Options::new()
                .recover_panics(true)
                .halt_on_first_error(true),
        );
        let batch = Batch::new(vec![
            item("a", Outcome::Panic),
            item("b", Outcome::Ok),
            item("c", Outcome::Ok),
        ]);

        let report = processor.process(&Context::new(), batch).await;

        assert_eq!(failures(&report), ["a", "b", "c"]);
        assert_eq!(*calls.lock().unwrap(), ["a"]);
    }

    #[tokio::test]
    async fn unrecovered_panic_aborts_the_batch() {
        let (processor, calls) = counting(Options::new());
        let batch = Batch::new(vec![
            item("a", Outcome::Ok),
            item("b", Outcome::Panic),
            item("c", Outcome::Ok),
        ]);
        let ctx = Context::new();

        let result = AssertUnwindSafe(processor.process(&ctx, batch))
            .catch_unwind()
            .await;

        assert!(result.is_err());
        assert_eq!(*calls.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test]
    async fn on_error_panics_are_not_recovered() {
        let (processor, calls) = counting(
            Options::new()
                .recover_panics(true)
                .on_error(|_: &Context, id: &str, _: &RecordError| {
                    panic!("observer failed on {id}")
                }),
        );
        let ctx = Context::new();

        let result = AssertUnwindSafe(processor.process(&ctx, abc()))
            .catch_unwind()
            .await;

        let payload = result.expect_err("on_error panic should unwind out of process");
        assert_eq!(
            payload.downcast_ref::<String>().map(String::as_str),
            Some("observer failed on b")
        );
        assert_eq!(*calls.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test]
    async fn state_is_passed_through() {
        let (processor, _) = counting(Options::new().halt_on_first_error(true));
        let state = b"\x00shard-7\xff".to_vec();

        let report = processor
            .process(&Context::new(), abc().with_state(state.clone()))
            .await;

        assert_eq!(report.state, Some(state.clone()));

        let report = processor
            .process(
                &Context::new(),
                Batch::new(vec![item("a", Outcome::Ok)]).with_state(state.clone()),
            )
            .await;

        assert!(report.is_empty());
        assert_eq!(report.state, Some(state));
    }

    #[tokio::test]
    async fn every_shape_reports_the_same_failures() {
        async fn run<H, S>(handler: H) -> Vec<String>
        where
            H: IntoRecordHandler<Item, S>,
        {
            let processor = BatchProcessor::new(handler, Options::new().recover_panics(true));
            let batch = Batch::new(vec![
                item("a", Outcome::Ok),
                item("b", Outcome::Panic),
                item("c", Outcome::Ok),
                item("d", Outcome::Panic),
            ]);
            let (failures, _) = processor
                .process(&Context::new(), batch)
                .await
                .into_parts();
            failures
        }

        fn outcome(item: &Item) -> Result<(), BoxError> {
            match item.outcome {
                Outcome::Ok => Ok(()),
                Outcome::Fail => Err("failed".into()),
                Outcome::Panic => panic!("{} panicked", item.id),
            }
        }

        let with_context = run(|_ctx: Context, item: Item| async move { outcome(&item) }).await;
        let context_only = run(|_ctx: Context, item: Item| async move {
            let _ = outcome(&item);
        })
        .await;
        let error_only = run(|item: Item| async move { outcome(&item) }).await;
        let bare = run(|item: Item| async move {
            let _ = outcome(&item);
        })
        .await;

        assert_eq!(with_context, ["b", "d"]);
        assert_eq!(context_only, with_context);
        assert_eq!(error_only, with_context);
        assert_eq!(bare, with_context);
    }
}
