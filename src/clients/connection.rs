use crate::framework::ResourceError;
use crate::runtime::BasicAuth;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP verbs used by the persistence and resolver layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// One outgoing request, fully resolved against the site.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Query parameters for GET/DELETE, JSON body otherwise.
    pub params: Option<Value>,
    pub credentials: Option<BasicAuth>,
}

/// Status and undecoded body as received from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Transport seam between [`ResourceClient`](super::ResourceClient) and the network.
///
/// [`HttpConnection`](super::HttpConnection) is the production implementation;
/// [`MockConnection`](crate::framework::mock::MockConnection) serves canned responses in tests.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn request(&self, request: Request) -> Result<RawResponse, ResourceError>;
}
