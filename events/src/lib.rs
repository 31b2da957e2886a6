//! Lambda event sources with partial batch responses, mapped onto [`partialbatch`].
//!
//! Each source gets an [`EventProcessor`] alias. The handler receives one
//! record of the event at a time; the processor answers with the
//! `batchItemFailures` response Lambda expects.

pub mod dynamodb;
pub mod kinesis;
pub mod processor;
pub mod response;
pub mod sqs;
pub mod window;

pub use dynamodb::{
    DynamoDbEvent,
    DynamoDbEventRecord,
    DynamoDbTimeWindowEvent,
};
pub use kinesis::{
    KinesisEvent,
    KinesisEventRecord,
    KinesisRecord,
    KinesisTimeWindowEvent,
};
pub use processor::{
    DynamoDbProcessor,
    DynamoDbTimeWindowProcessor,
    Event,
    EventProcessor,
    KinesisProcessor,
    KinesisTimeWindowProcessor,
    SqsProcessor,
};
pub use response::{
    BatchItemFailure,
    BatchResponse,
    TimeWindowResponse,
};
pub use sqs::{
    SqsEvent,
    SqsMessage,
    SqsMessageAttribute,
};
pub use window::{
    TimeWindow,
    TimeWindowEvent,
    TimeWindowProperties,
    Windowed,
};
