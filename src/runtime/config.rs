//! Site configuration for a [`ResourceClient`](crate::clients::ResourceClient).
//!
//! A site is one remote service: its base URL, credentials, the signature of its
//! "not authenticated" response and whether it wraps payloads in a root key.
//!
//! # Environment Variables
//!
//! [`SiteConfig::from_env`] reads:
//! - `REMOTE_MODEL_URL` (required) - base URL, e.g. `https://api.example.com`
//! - `REMOTE_MODEL_USER` / `REMOTE_MODEL_PASSWORD` - basic auth credentials
//! - `REMOTE_MODEL_STRIP_ROOT` - `1` or `true` to unwrap `{"car": {...}}` payloads

use crate::framework::ResourceError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const ENV_URL: &str = "REMOTE_MODEL_URL";
pub const ENV_USER: &str = "REMOTE_MODEL_USER";
pub const ENV_PASSWORD: &str = "REMOTE_MODEL_PASSWORD";
pub const ENV_STRIP_ROOT: &str = "REMOTE_MODEL_STRIP_ROOT";

/// HTTP basic auth credentials.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

type CredentialProvider = Arc<dyn Fn() -> Option<BasicAuth> + Send + Sync>;

/// Connection settings for one remote service.
#[derive(Clone, Deserialize)]
pub struct SiteConfig {
    base_url: String,
    #[serde(default)]
    basic_auth: Option<BasicAuth>,
    /// JSON fragment identifying an authentication failure body.
    #[serde(default)]
    auth_exception: Option<Value>,
    #[serde(default)]
    strip_root: bool,
    #[serde(skip)]
    credential_provider: Option<CredentialProvider>,
}

impl SiteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            basic_auth: None,
            auth_exception: None,
            strip_root: false,
            credential_provider: None,
        }
    }

    /// Reads the site from `REMOTE_MODEL_*` environment variables.
    pub fn from_env() -> Result<Self, ResourceError> {
        let base_url = std::env::var(ENV_URL)
            .map_err(|_| ResourceError::Config(format!("{ENV_URL} is not set")))?;
        let mut site = Self::new(base_url);

        if let Ok(username) = std::env::var(ENV_USER) {
            site = site.with_basic_auth(username, std::env::var(ENV_PASSWORD).ok());
        }
        let strip_root = std::env::var(ENV_STRIP_ROOT)
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        site.with_strip_root(strip_root).validated()
    }

    /// Parses a JSON site document such as
    /// `{"base_url": "https://api.example.com", "strip_root": true}`.
    pub fn from_json(json: &str) -> Result<Self, ResourceError> {
        let site: SiteConfig = serde_json::from_str(json)?;
        site.validated()
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.basic_auth = Some(BasicAuth::new(username, password));
        self
    }

    /// Credentials computed per request; takes precedence over static basic auth.
    pub fn with_credential_provider(
        mut self,
        provider: impl Fn() -> Option<BasicAuth> + Send + Sync + 'static,
    ) -> Self {
        self.credential_provider = Some(Arc::new(provider));
        self
    }

    pub fn with_auth_exception(mut self, signature: Value) -> Self {
        self.auth_exception = Some(signature);
        self
    }

    pub fn with_strip_root(mut self, strip_root: bool) -> Self {
        self.strip_root = strip_root;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credentials for the next request.
    pub fn credentials(&self) -> Option<BasicAuth> {
        match &self.credential_provider {
            Some(provider) => provider(),
            None => self.basic_auth.clone(),
        }
    }

    pub fn auth_exception(&self) -> Option<&Value> {
        self.auth_exception.as_ref()
    }

    pub fn strip_root(&self) -> bool {
        self.strip_root
    }

    /// Absolute URL for a resource path.
    pub fn url(&self, uri: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if uri.starts_with('/') {
            format!("{base}{uri}")
        } else {
            format!("{base}/{uri}")
        }
    }

    fn validated(self) -> Result<Self, ResourceError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ResourceError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        Ok(self)
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("base_url", &self.base_url)
            .field("basic_auth", &self.basic_auth)
            .field("auth_exception", &self.auth_exception)
            .field("strip_root", &self.strip_root)
            .field("credential_provider", &self.credential_provider.is_some())
            .finish()
    }
}
