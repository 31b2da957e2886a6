use partialbatch::Record;
use serde::{
    Deserialize,
    Serialize,
};

use crate::window::TimeWindowEvent;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DynamoDbEvent {
    #[serde(rename = "Records")]
    pub records: Vec<DynamoDbEventRecord>,
}

pub type DynamoDbTimeWindowEvent = TimeWindowEvent<DynamoDbEventRecord>;

/// A DynamoDB stream record. The stream record itself is kept as raw JSON.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamoDbEventRecord {
    pub aws_region: String,
    pub dynamodb: serde_json::Value,
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub event_name: String,
    pub event_source: String,
    pub event_version: String,
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_identity: Option<serde_json::Value>,
}

impl Record for DynamoDbEventRecord {
    fn identifier(&self) -> &str {
        &self.event_id
    }
}
