use crate::clients::connection::{Connection, Method, RawResponse, Request};
use crate::framework::record::value_to_segment;
use crate::framework::ResourceError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// [`Connection`] over a pooled `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpConnection {
    http: reqwest::Client,
}

impl HttpConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ResourceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Connection for HttpConnection {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn request(&self, request: Request) -> Result<RawResponse, ResourceError> {
        let mut builder = self
            .http
            .request(request.method.into(), &request.url)
            .header(ACCEPT, "application/json");

        if let Some(params) = &request.params {
            builder = match request.method {
                Method::Get | Method::Delete => builder.query(&query_pairs(params)),
                Method::Post | Method::Put => builder.json(params),
            };
        }
        if let Some(auth) = &request.credentials {
            builder = builder.basic_auth(&auth.username, auth.password.as_ref());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Received response");
        Ok(RawResponse { status, body })
    }
}

/// Flattens a JSON object into query pairs; `null` values are dropped.
fn query_pairs(params: &Value) -> Vec<(String, String)> {
    match params {
        Value::Object(fields) => fields
            .iter()
            .filter_map(|(key, value)| value_to_segment(value).map(|v| (key.clone(), v)))
            .collect(),
        _ => Vec::new(),
    }
}
