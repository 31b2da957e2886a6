use partialbatch::Record;
use serde::{
    Deserialize,
    Serialize,
};

use crate::window::TimeWindowEvent;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct KinesisEvent {
    #[serde(rename = "Records")]
    pub records: Vec<KinesisEventRecord>,
}

pub type KinesisTimeWindowEvent = TimeWindowEvent<KinesisEventRecord>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KinesisEventRecord {
    pub aws_region: String,
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub event_name: String,
    pub event_source: String,
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    pub event_version: String,
    pub invoke_identity_arn: String,
    pub kinesis: KinesisRecord,
}

impl Record for KinesisEventRecord {
    fn identifier(&self) -> &str {
        &self.event_id
    }
}

/// The Kinesis part of a record. `data` stays base64 encoded.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KinesisRecord {
    pub approximate_arrival_timestamp: f64,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_type: Option<String>,
    pub partition_key: String,
    pub sequence_number: String,
    pub kinesis_schema_version: String,
}
