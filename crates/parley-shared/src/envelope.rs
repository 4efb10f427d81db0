//! Response envelope used by every REST endpoint.
//!
//! A successful body is `{ "data": ... }`; a failed one is
//! `{ "message": "...", "exceptionCode": "400.5" }`. The code may arrive as a
//! JSON string or a bare number.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult, ErrorKind};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Failure {
        #[serde(default)]
        message: Option<String>,
        #[serde(rename = "exceptionCode")]
        exception_code: Value,
    },
    Success {
        data: T,
    },
}

impl<T> Envelope<T> {
    /// Collapse the envelope into a result, classifying the failure code.
    pub fn into_result(self) -> ApiResult<T> {
        match self {
            Envelope::Success { data } => Ok(data),
            Envelope::Failure {
                message,
                exception_code,
            } => Err(ApiError {
                kind: ErrorKind::from_exception_code(&code_to_string(&exception_code)),
                message,
            }),
        }
    }
}

fn code_to_string(code: &Value) -> String {
    match code {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
