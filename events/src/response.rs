use std::collections::HashMap;

use partialbatch::FailureReport;
use serde::{
    Deserialize,
    Serialize,
};

/// One record Lambda has to deliver again.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Partial batch response of the SQS, Kinesis and DynamoDB sources.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

/// Partial batch response of a tumbling window invocation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowResponse {
    #[serde(default)]
    pub state: HashMap<String, String>,
    pub batch_item_failures: Vec<BatchItemFailure>,
}

fn item_failures(failures: Vec<String>) -> Vec<BatchItemFailure> {
    failures
        .into_iter()
        .map(|item_identifier| BatchItemFailure { item_identifier })
        .collect()
}

impl From<FailureReport> for BatchResponse {
    fn from(report: FailureReport) -> Self {
        let (failures, _) = report.into_parts();
        Self {
            batch_item_failures: item_failures(failures),
        }
    }
}

impl From<FailureReport<HashMap<String, String>>> for TimeWindowResponse {
    fn from(report: FailureReport<HashMap<String, String>>) -> Self {
        let (failures, state) = report.into_parts();
        Self {
            state: state.unwrap_or_default(),
            batch_item_failures: item_failures(failures),
        }
    }
}
