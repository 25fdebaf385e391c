//! # Mock Framework
//!
//! A scripted [`Connection`] for testing models without a server.
//!
//! Queue expectations in the order requests will be made, hand a clone of the mock to a
//! [`ResourceClient`](crate::clients::ResourceClient), run the code under test and call
//! [`MockConnection::verify`] to assert every expectation was consumed.
//!
//! ```ignore
//! let mock = MockConnection::new();
//! mock.expect_get("/cars/7").respond(200, json!({"id": 7, "name": "Mini"}));
//! mock.expect_get("/cars/7/wheels").respond(200, json!([{"id": 1}]));
//!
//! let client = ResourceClient::new(SiteConfig::new("http://api.test"), mock.clone());
//! let mut car = Car::find(&client, 7).await?.unwrap();
//! car.wheels(&client, false).await?;
//! mock.verify();
//! ```
//!
//! Requests are matched on method and path only; the query string and body are
//! recorded and available through [`MockConnection::requests`].

use crate::clients::{Connection, Method, RawResponse, Request};
use crate::framework::ResourceError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct Expectation {
    method: Method,
    path: String,
    response: Result<RawResponse, ResourceError>,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    requests: Vec<Request>,
}

/// A connection answering from a queue of expectations.
///
/// Clones share the same queue, so keep one clone for assertions.
#[derive(Clone, Default)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_get(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Get, path)
    }

    pub fn expect_post(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Post, path)
    }

    pub fn expect_put(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Put, path)
    }

    pub fn expect_delete(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Delete, path)
    }

    fn expect(&self, method: Method, path: &str) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            path: path.to_string(),
            state: self.state.clone(),
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Panics if any expectation is still queued.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn request(&self, request: Request) -> Result<RawResponse, ResourceError> {
        let mut state = self.state.lock().unwrap();
        let path = path_of(&request.url).to_string();
        let method = request.method;
        state.requests.push(request);

        match state.expectations.pop_front() {
            Some(expectation) if expectation.method == method && expectation.path == path => {
                expectation.response
            }
            Some(expectation) => panic!(
                "Unexpected request or expectation mismatch: got {method} {path}, expected {} {}",
                expectation.method, expectation.path
            ),
            None => panic!("Unexpected request or expectation mismatch: got {method} {path}, nothing queued"),
        }
    }
}

/// Path portion of an absolute URL (`http://host/a/b?x=1` → `/a/b`).
fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let path = without_scheme
        .find('/')
        .map(|i| &without_scheme[i..])
        .unwrap_or("/");
    path.split('?').next().unwrap_or(path)
}

/// Builder for a single queued expectation.
pub struct ExpectationBuilder {
    method: Method,
    path: String,
    state: Arc<Mutex<MockState>>,
}

impl ExpectationBuilder {
    /// Answers with `status` and `body` serialized as JSON.
    pub fn respond(self, status: u16, body: Value) {
        let body = body.to_string();
        self.respond_raw(status, &body);
    }

    /// Answers with `status` and an empty body.
    pub fn respond_empty(self, status: u16) {
        self.respond_raw(status, "");
    }

    /// Answers with `status` and `body` verbatim.
    pub fn respond_raw(self, status: u16, body: &str) {
        let response = Ok(RawResponse {
            status,
            body: body.to_string(),
        });
        self.push(response);
    }

    /// Fails the request at the transport level.
    pub fn return_err(self, error: ResourceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<RawResponse, ResourceError>) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation {
            method: self.method,
            path: self.path,
            response,
        });
    }
}
