//! REST backend implementation.
//!
//! Talks to a hosted PostgREST-style API: one endpoint per table, JSON
//! bodies, upserts expressed as `POST` with a merge-duplicates preference.
//! The actual HTTP client is abstracted via a trait so applications can
//! plug in whichever HTTP library they already use.

use crate::backend::Backend;
use crate::config::RestConfig;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use officesync_model::{Row, PRIMARY_KEY};
use parking_lot::RwLock;
use serde_json::Value;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// An outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL including query string.
    pub url: String,
    /// Header pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the first header with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Sends a request and returns the response. `Err` means the request
    /// never produced a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// Backend speaking the hosted REST dialect.
pub struct RestBackend<C: HttpClient> {
    config: RestConfig,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> RestBackend<C> {
    /// Creates a REST backend.
    pub fn new(config: RestConfig, client: C) -> Self {
        Self {
            config,
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("apikey".into(), self.config.api_key.clone()),
            (
                "Authorization".into(),
                format!("Bearer {}", self.config.api_key),
            ),
            ("Content-Type".into(), "application/json".into()),
        ]
    }

    async fn execute(&self, table: &str, request: HttpRequest) -> SyncResult<HttpResponse> {
        let response = match self.client.send(request).await {
            Ok(response) => response,
            Err(e) => {
                *self.last_error.write() = Some(e.clone());
                return Err(SyncError::transport(e));
            }
        };

        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).into_owned();
            *self.last_error.write() = Some(message.clone());
            return Err(SyncError::backend(table, response.status, message));
        }

        *self.last_error.write() = None;
        Ok(response)
    }
}

#[async_trait]
impl<C: HttpClient> Backend for RestBackend<C> {
    async fn select(&self, table: &str) -> SyncResult<Vec<Row>> {
        let request = HttpRequest {
            method: Method::Get,
            url: format!("{}?select=*", self.config.table_url(table)),
            headers: self.headers(),
            body: None,
        };
        let response = self.execute(table, request).await?;

        let body: Value = serde_json::from_slice(&response.body)?;
        let Value::Array(items) = body else {
            return Err(SyncError::Encoding(format!(
                "expected a JSON array from {table}"
            )));
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                _ => Err(SyncError::Encoding(format!(
                    "expected JSON objects in {table}"
                ))),
            })
            .collect()
    }

    async fn upsert(&self, table: &str, rows: Vec<Row>) -> SyncResult<()> {
        let body = serde_json::to_vec(&rows)?;
        let mut headers = self.headers();
        headers.push((
            "Prefer".into(),
            "resolution=merge-duplicates,return=minimal".into(),
        ));
        let request = HttpRequest {
            method: Method::Post,
            url: format!("{}?on_conflict={}", self.config.table_url(table), PRIMARY_KEY),
            headers,
            body: Some(body),
        };
        self.execute(table, request).await?;
        Ok(())
    }
}

/// An HTTP client that routes requests directly into another backend.
///
/// Useful for exercising [`RestBackend`] without a network.
pub struct LoopbackClient<B: Backend> {
    backend: B,
    schema_path: String,
}

impl<B: Backend> LoopbackClient<B> {
    /// Creates a loopback client serving the default `/rest/v1` prefix.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            schema_path: "/rest/v1".to_string(),
        }
    }

    /// Returns the backend requests are routed to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn table_of<'u>(&self, url: &'u str) -> Option<&'u str> {
        let start = url.find(&self.schema_path)? + self.schema_path.len();
        let rest = url[start..].trim_start_matches('/');
        let table = rest.split('?').next()?;
        (!table.is_empty()).then_some(table)
    }

    fn error_response(err: SyncError) -> HttpResponse {
        let status = match &err {
            SyncError::Backend { status, .. } => *status,
            SyncError::Encoding(_) => 400,
            _ => 500,
        };
        HttpResponse {
            status,
            body: err.to_string().into_bytes(),
        }
    }
}

#[async_trait]
impl<B: Backend> HttpClient for LoopbackClient<B> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        let Some(table) = self.table_of(&request.url) else {
            return Ok(HttpResponse {
                status: 404,
                body: b"unknown endpoint".to_vec(),
            });
        };

        match request.method {
            Method::Get => match self.backend.select(table).await {
                Ok(rows) => {
                    let body = serde_json::to_vec(&rows).map_err(|e| e.to_string())?;
                    Ok(HttpResponse { status: 200, body })
                }
                Err(e) => Ok(Self::error_response(e)),
            },
            Method::Post => {
                let body = request.body.unwrap_or_default();
                let rows: Vec<Row> = match serde_json::from_slice(&body) {
                    Ok(rows) => rows,
                    Err(e) => return Ok(Self::error_response(e.into())),
                };
                match self.backend.upsert(table, rows).await {
                    Ok(()) => Ok(HttpResponse {
                        status: 201,
                        body: Vec::new(),
                    }),
                    Err(e) => Ok(Self::error_response(e)),
                }
            }
        }
    }
}
