//! Light schema change calls against a Doris frontend

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use doris_types::SchemaChangeIntent;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Map, Value};

use crate::endpoint::random_endpoint;
use crate::error::{DorisSinkError, Result};
use crate::response::is_success_response;

/// Capability check URL for `database.table` on a frontend.
pub fn check_schema_change_url(host: &str, database: &str, table: &str) -> String {
    format!("http://{host}/api/enable_light_schema_change/{database}/{table}")
}

/// Statement execution URL for `database` on a frontend.
pub fn schema_change_url(host: &str, database: &str) -> String {
    format!("http://{host}/api/query/default_cluster/{database}")
}

const PARAM_IS_DROP_COLUMN: &str = "isDropColumn";
const PARAM_COLUMN_NAME: &str = "columnName";

/// Connection settings for the Doris frontend.
#[derive(Debug, Clone)]
pub struct DorisConnection {
    /// Frontend `host:port` entries; one is picked per request.
    pub fenodes: Vec<String>,
    pub username: String,
    pub password: String,
    pub request_timeout: Duration,
}

impl DorisConnection {
    pub fn new(fenodes: Vec<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            fenodes,
            username: username.into(),
            password: password.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// `Basic base64(user:password)`
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Client for the frontend's schema change endpoints.
///
/// Holds no connection state; every call builds its own HTTP client.
#[derive(Debug, Clone)]
pub struct DorisClient {
    connection: DorisConnection,
}

impl DorisClient {
    pub fn new(connection: DorisConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &DorisConnection {
        &self.connection
    }

    /// Capability check parameters for an intent.
    ///
    /// Always carries `isDropColumn`. `columnName` is left out when blank, which
    /// makes the check fail without a request.
    pub fn build_request_params(intent: &SchemaChangeIntent) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(
            PARAM_IS_DROP_COLUMN.to_string(),
            Value::Bool(intent.is_drop_column()),
        );
        let column_name = intent.column_name.trim();
        if !column_name.is_empty() {
            params.insert(
                PARAM_COLUMN_NAME.to_string(),
                Value::String(column_name.to_string()),
            );
        }
        params
    }

    /// Ask whether `database.table` supports the change as a light schema change.
    pub async fn check_schema_change(
        &self,
        database: &str,
        table: &str,
        params: &Map<String, Value>,
    ) -> bool {
        if !has_check_params(params) {
            tracing::warn!("Schema change check params are incomplete: {params:?}");
            return false;
        }

        let result: Result<bool> = async {
            let host = random_endpoint(&self.connection.fenodes)?;
            let url = check_schema_change_url(&host, database, table);
            let body = serde_json::to_vec(params)?;
            let request = self
                .http_client()?
                .get(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(body);
            self.send(request, url).await
        }
        .await;

        match result {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!("Light schema change is not supported for {database}.{table}");
                false
            }
            Err(e) => {
                tracing::error!("Schema change check failed for {database}.{table}: {e}");
                false
            }
        }
    }

    /// Execute a DDL statement against `database`.
    pub async fn execute_schema_change(&self, database: &str, statement: &str) -> bool {
        let result: Result<bool> = async {
            let host = random_endpoint(&self.connection.fenodes)?;
            let url = schema_change_url(&host, database);
            let body = serde_json::to_vec(&json!({ "stmt": statement }))?;
            let request = self
                .http_client()?
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(body);
            self.send(request, url).await
        }
        .await;

        match result {
            Ok(true) => {
                tracing::info!("Executed schema change on {database}: {statement}");
                true
            }
            Ok(false) => {
                tracing::warn!("Doris rejected schema change on {database}: {statement}");
                false
            }
            Err(e) => {
                tracing::error!("Schema change execution failed for {statement}: {e}");
                false
            }
        }
    }

    /// Check, then execute. The statement is only sent after a successful check.
    pub async fn apply(
        &self,
        database: &str,
        table: &str,
        intent: &SchemaChangeIntent,
        statement: &str,
    ) -> bool {
        let params = Self::build_request_params(intent);
        if !self.check_schema_change(database, table, &params).await {
            return false;
        }
        self.execute_schema_change(database, statement).await
    }

    fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.connection.request_timeout)
            .build()
            .map_err(DorisSinkError::Client)
    }

    async fn send(&self, request: RequestBuilder, url: String) -> Result<bool> {
        tracing::debug!("Sending Doris frontend request to {url}");
        let response = request
            .header(
                AUTHORIZATION,
                basic_auth_header(&self.connection.username, &self.connection.password),
            )
            .send()
            .await
            .map_err(|source| DorisSinkError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| DorisSinkError::Request {
                url: url.clone(),
                source,
            })?;
        tracing::debug!("Doris frontend responded {status} from {url}: {body}");
        Ok(is_success_response(status, &body))
    }
}

fn has_check_params(params: &Map<String, Value>) -> bool {
    params.len() == 2
        && params.get(PARAM_IS_DROP_COLUMN).is_some_and(Value::is_boolean)
        && params.get(PARAM_COLUMN_NAME).is_some_and(Value::is_string)
}
