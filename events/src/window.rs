//! Tumbling window invocations of the Kinesis and DynamoDB stream sources.
//!
//! The window `state` is the continuation state of the batch. It is handed
//! back unchanged in the response whatever happens to the records.

use std::{
    collections::HashMap,
    sync::Arc,
};

use partialbatch::Record;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeWindowProperties {
    pub window: TimeWindow,
    pub state: HashMap<String, String>,
    pub shard_id: String,
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    pub is_final_invoke_for_window: bool,
    pub is_window_terminated_early: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TimeWindowEvent<R> {
    #[serde(rename = "Records")]
    pub records: Vec<R>,
    #[serde(flatten)]
    pub properties: TimeWindowProperties,
}

/// A record handed to a handler together with the window it was delivered in.
#[derive(Clone, Debug, PartialEq)]
pub struct Windowed<R> {
    pub properties: Arc<TimeWindowProperties>,
    pub record: R,
}

impl<R> Record for Windowed<R>
where
    R: Record,
{
    fn identifier(&self) -> &str {
        self.record.identifier()
    }
}
