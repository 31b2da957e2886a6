use std::{
    collections::HashMap,
    sync::Arc,
};

use partialbatch::{
    Batch,
    BatchProcessor,
    Context,
    FailureReport,
    IntoRecordHandler,
    Options,
    Record,
};

use crate::{
    dynamodb::{
        DynamoDbEvent,
        DynamoDbEventRecord,
    },
    kinesis::{
        KinesisEvent,
        KinesisEventRecord,
    },
    response::{
        BatchResponse,
        TimeWindowResponse,
    },
    sqs::{
        SqsEvent,
        SqsMessage,
    },
    window::{
        TimeWindowEvent,
        Windowed,
    },
};

/// A Lambda event whose records can be reported back individually.
pub trait Event {
    type Record: Record + Send + 'static;
    type State;
    type Response;

    fn into_batch(self) -> Batch<Self::Record, Self::State>;

    fn into_response(report: FailureReport<Self::State>) -> Self::Response;
}

impl Event for SqsEvent {
    type Record = SqsMessage;
    type State = ();
    type Response = BatchResponse;

    fn into_batch(self) -> Batch<SqsMessage> {
        Batch::new(self.records)
    }

    fn into_response(report: FailureReport) -> BatchResponse {
        report.into()
    }
}

impl Event for KinesisEvent {
    type Record = KinesisEventRecord;
    type State = ();
    type Response = BatchResponse;

    fn into_batch(self) -> Batch<KinesisEventRecord> {
        Batch::new(self.records)
    }

    fn into_response(report: FailureReport) -> BatchResponse {
        report.into()
    }
}

impl Event for DynamoDbEvent {
    type Record = DynamoDbEventRecord;
    type State = ();
    type Response = BatchResponse;

    fn into_batch(self) -> Batch<DynamoDbEventRecord> {
        Batch::new(self.records)
    }

    fn into_response(report: FailureReport) -> BatchResponse {
        report.into()
    }
}

impl<R> Event for TimeWindowEvent<R>
where
    R: Record + Send + 'static,
{
    type Record = Windowed<R>;
    type State = HashMap<String, String>;
    type Response = TimeWindowResponse;

    fn into_batch(self) -> Batch<Windowed<R>, HashMap<String, String>> {
        let state = self.properties.state.clone();
        let properties = Arc::new(self.properties);

        self.records
            .into_iter()
            .map(|record| Windowed {
                properties: properties.clone(),
                record,
            })
            .collect::<Batch<_>>()
            .with_state(state)
    }

    fn into_response(report: FailureReport<HashMap<String, String>>) -> TimeWindowResponse {
        report.into()
    }
}

/// Handles every record of an event and answers with its partial batch response.
#[derive(Debug)]
pub struct EventProcessor<E>
where
    E: Event,
{
    processor: BatchProcessor<E::Record>,
}

/// SQS messages, identified by `messageId`.
///
/// Build it with `Options::new().halt_on_first_error(true)` for FIFO queues so
/// no message is delivered ahead of one that failed.
pub type SqsProcessor = EventProcessor<SqsEvent>;
pub type KinesisProcessor = EventProcessor<KinesisEvent>;
pub type KinesisTimeWindowProcessor = EventProcessor<TimeWindowEvent<KinesisEventRecord>>;
pub type DynamoDbProcessor = EventProcessor<DynamoDbEvent>;
pub type DynamoDbTimeWindowProcessor = EventProcessor<TimeWindowEvent<DynamoDbEventRecord>>;

impl<E> EventProcessor<E>
where
    E: Event,
{
    pub fn new<H, S>(handler: H, options: Options) -> Self
    where
        H: IntoRecordHandler<E::Record, S>,
    {
        Self {
            processor: BatchProcessor::new(handler, options),
        }
    }

    pub async fn handle(&self, ctx: &Context, event: E) -> E::Response {
        let batch = event.into_batch();
        let total = batch.len();

        let report = self.processor.process(ctx, batch).await;

        tracing::info!(
            request_id = ctx.request_id(),
            total,
            failed = report.len(),
            "event processed"
        );

        E::into_response(report)
    }
}
