//! Uniform response envelope.
//!
//! Every response, success or failure, is rendered as
//! `{ "data": ..., "operationStatus": { "isSuccess": .., "message": .. } }`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub operation_status: OperationStatus,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            operation_status: OperationStatus {
                is_success: true,
                message: None,
            },
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            operation_status: OperationStatus {
                is_success: false,
                message: Some(message.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_renders_data_and_status() {
        let value = serde_json::to_value(Envelope::success(vec![1, 2])).unwrap();
        assert_eq!(
            value,
            json!({ "data": [1, 2], "operationStatus": { "isSuccess": true } })
        );
    }

    #[test]
    fn failure_omits_data() {
        let value = serde_json::to_value(Envelope::failure("client not found")).unwrap();
        assert_eq!(
            value,
            json!({
                "operationStatus": { "isSuccess": false, "message": "client not found" }
            })
        );
    }
}
