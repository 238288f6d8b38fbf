//! Doris frontend client for light schema change.
//!
//! Applying a column change is a two-step protocol against a Doris frontend
//! (FE) node:
//!
//! 1. `GET /api/enable_light_schema_change/<db>/<table>` with
//!    `{"isDropColumn": bool, "columnName": string}` asks whether the table
//!    accepts the change without a rewrite.
//! 2. `POST /api/query/default_cluster/<db>` with `{"stmt": "ALTER ..."}`
//!    executes the statement.
//!
//! Both calls succeed only on an HTTP 2xx whose JSON body has `code == "0"`.
//! Every call uses its own HTTP client, picks a random FE endpoint, and never
//! retries; failures are logged and reported as `false`.
//!
//! # Example
//!
//! ```ignore
//! use doris_sink::{DorisClient, DorisConnection};
//!
//! let client = DorisClient::new(DorisConnection::new(
//!     vec!["127.0.0.1:8030".to_string()],
//!     "root",
//!     "",
//! ));
//! let params = DorisClient::build_request_params(&intent);
//! if client.check_schema_change("db", "tbl", &params).await {
//!     client.execute_schema_change("db", &statement).await;
//! }
//! ```

mod client;
mod endpoint;
mod error;
mod response;

pub use client::{
    basic_auth_header, check_schema_change_url, schema_change_url, DorisClient, DorisConnection,
};
pub use endpoint::random_endpoint;
pub use error::{DorisSinkError, Result};
pub use response::{is_success_response, SUCCESS_CODE};
