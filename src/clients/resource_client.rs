use crate::clients::connection::{Connection, Method, Request};
use crate::clients::http::HttpConnection;
use crate::framework::record::Attributes;
use crate::framework::ResourceError;
use crate::runtime::SiteConfig;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A decoded response. `body` is `None` for an empty payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<Value>,
}

/// How a response body maps onto records.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    One(Attributes),
    Many(Vec<Attributes>),
    Empty,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Object → one record, array → many (non-object items skipped), anything else → empty.
    pub fn shape(&self) -> Fetched {
        match &self.body {
            Some(Value::Object(fields)) => Fetched::One(fields.clone()),
            Some(Value::Array(items)) => Fetched::Many(
                items
                    .iter()
                    .filter_map(|item| item.as_object().cloned())
                    .collect(),
            ),
            _ => Fetched::Empty,
        }
    }
}

/// Handle to one remote site. Cheap to clone; pass it to every model operation.
#[derive(Clone)]
pub struct ResourceClient {
    connection: Arc<dyn Connection>,
    site: Arc<SiteConfig>,
}

impl ResourceClient {
    pub fn new(site: SiteConfig, connection: impl Connection + 'static) -> Self {
        Self {
            connection: Arc::new(connection),
            site: Arc::new(site),
        }
    }

    /// A client using [`HttpConnection`].
    pub fn http(site: SiteConfig) -> Self {
        Self::new(site, HttpConnection::new())
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub async fn get(&self, uri: &str, params: Option<Value>) -> Result<Response, ResourceError> {
        self.send(Method::Get, uri, params).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<Response, ResourceError> {
        self.send(Method::Post, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<Response, ResourceError> {
        self.send(Method::Put, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<Response, ResourceError> {
        self.send(Method::Delete, uri, None).await
    }

    /// Sends one request and decodes the answer.
    ///
    /// Fails with [`ResourceError::Authentication`] when the body matches the site's
    /// auth-exception signature. Any other status is returned for the caller to judge.
    #[instrument(skip(self, params))]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        params: Option<Value>,
    ) -> Result<Response, ResourceError> {
        let request = Request {
            method,
            url: self.site.url(uri),
            params,
            credentials: self.site.credentials(),
        };
        debug!("Sending request");
        let raw = self.connection.request(request).await?;
        let status = raw.status;

        let body = match decode_body(&raw.body) {
            Ok(body) => body,
            Err(_) if !(200..300).contains(&status) => None,
            Err(e) => return Err(e.into()),
        };

        if let (Some(signature), Some(body)) = (self.site.auth_exception(), &body) {
            if matches_signature(signature, body) {
                warn!(status, "Authentication rejected");
                return Err(ResourceError::Authentication { status });
            }
        }

        let body = match body {
            Some(body) if self.site.strip_root() => Some(strip_root(body)),
            body => body,
        };
        debug!(status, "Response");
        Ok(Response { status, body })
    }
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

fn decode_body(raw: &str) -> Result<Option<Value>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw).map(Some)
}

/// True when every field of `signature` is present in `body` with an equal value.
fn matches_signature(signature: &Value, body: &Value) -> bool {
    match (signature, body) {
        (Value::Object(expected), Value::Object(actual)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|found| matches_signature(value, found))
        }),
        (expected, actual) => expected == actual,
    }
}

/// Unwraps `{"car": {...}}` to `{...}`, also inside arrays. Error payloads are left alone.
fn strip_root(body: Value) -> Value {
    match body {
        Value::Object(fields) if is_root_wrapper(&fields) => match fields.into_iter().next() {
            Some((_, Value::Array(items))) => strip_items(items),
            Some((_, inner)) => inner,
            None => Value::Null,
        },
        Value::Array(items) => strip_items(items),
        other => other,
    }
}

fn strip_items(items: Vec<Value>) -> Value {
    Value::Array(items.into_iter().map(strip_item).collect())
}

fn strip_item(item: Value) -> Value {
    match item {
        Value::Object(fields) if is_root_wrapper(&fields) && fields.values().all(Value::is_object) => {
            fields
                .into_iter()
                .next()
                .map(|(_, inner)| inner)
                .unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn is_root_wrapper(fields: &Attributes) -> bool {
    fields.len() == 1
        && !fields.contains_key("errors")
        && fields.values().all(|v| v.is_object() || v.is_array())
}
