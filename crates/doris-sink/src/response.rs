//! Frontend response contract

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Value of the `code` field in a successful response.
pub const SUCCESS_CODE: &str = "0";

#[derive(Debug, Deserialize)]
struct FrontendResponse {
    #[serde(default)]
    code: Option<Value>,
}

/// A call succeeded iff the status is 2xx and the body's `code` is `"0"`.
///
/// The code may be sent as a string or as a number. A missing code or a body
/// that is not JSON counts as failure.
pub fn is_success_response(status: StatusCode, body: &str) -> bool {
    if !status.is_success() {
        return false;
    }
    let Ok(response) = serde_json::from_str::<FrontendResponse>(body) else {
        return false;
    };
    let code = match response.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => return false,
    };
    code == SUCCESS_CODE
}
