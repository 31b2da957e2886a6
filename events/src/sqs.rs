use std::collections::HashMap;

use partialbatch::Record;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SqsEvent {
    #[serde(rename = "Records")]
    pub records: Vec<SqsMessage>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SqsMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    pub md5_of_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_of_message_attributes: Option<String>,
    pub attributes: HashMap<String, String>,
    pub message_attributes: HashMap<String, SqsMessageAttribute>,
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    pub event_source: String,
    pub aws_region: String,
}

impl SqsMessage {
    /// Whether the message came from a FIFO queue.
    ///
    /// The processor does not act on this; a processor for a FIFO queue is built
    /// with [`Options::halt_on_first_error`](partialbatch::Options::halt_on_first_error).
    pub fn is_fifo(&self) -> bool {
        self.event_source_arn.ends_with(".fifo")
    }
}

impl Record for SqsMessage {
    fn identifier(&self) -> &str {
        &self.message_id
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SqsMessageAttribute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_value: Option<String>,
    pub string_list_values: Vec<String>,
    pub binary_list_values: Vec<String>,
    pub data_type: String,
}
