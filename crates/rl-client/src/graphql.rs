//! GraphQL request and response envelopes

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Body posted to the GraphQL endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
}

/// A single entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }
}

/// Response envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    /// Errors win over partial data
    pub fn into_result(self, operation: &str) -> Result<T> {
        if !self.errors.is_empty() {
            return Err(Error::GraphQl(self.errors));
        }
        self.data
            .ok_or_else(|| Error::MissingData(format!("{} returned no data", operation)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_take_precedence() {
        let response: GraphQlResponse<serde_json::Value> = serde_json::from_value(serde_json::json!({
            "data": {"roles": []},
            "errors": [{"message": "bad", "extensions": {"code": "validation-failed"}}]
        }))
        .unwrap();

        match response.into_result("Roles") {
            Err(Error::GraphQl(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, "bad");
            }
            other => panic!("expected GraphQl error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_data() {
        let response: GraphQlResponse<serde_json::Value> =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(response.into_result("Roles"), Err(Error::MissingData(_))));
    }

    #[test]
    fn test_request_omits_operation_name_when_unset() {
        let request = GraphQlRequest {
            query: "query { x }",
            variables: serde_json::json!({}),
            operation_name: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("operationName").is_none());
    }
}
