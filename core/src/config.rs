//! Client construction options.
//!
//! `ClientOptions` is what callers fill in; every field is optional.
//! `ClientOptions::into_config` layers it over `ClientOptions::defaults()` and
//! produces the immutable `ClientConfig` a client is bound to.

use crate::merge::{pick, Merge};

pub const DEFAULT_HOST: &str = "cr-api.in.ft.com";
pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_PRODUCT: &str = "ft-change-request";

/// Caller-supplied client options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub host: Option<String>,
    /// `https` in production; `http` is accepted for local servers.
    pub scheme: Option<String>,
    /// Product name used in the `User-Agent` header.
    pub product: Option<String>,
}

impl ClientOptions {
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            host: Some(DEFAULT_HOST.to_string()),
            scheme: Some(DEFAULT_SCHEME.to_string()),
            product: Some(DEFAULT_PRODUCT.to_string()),
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn into_config(self) -> ClientConfig {
        let merged = Self::defaults().merge(&self);
        let product = merged.product.unwrap_or_else(|| DEFAULT_PRODUCT.to_string());
        ClientConfig {
            api_key: merged.api_key,
            host: merged.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            scheme: merged.scheme.unwrap_or_else(|| DEFAULT_SCHEME.to_string()),
            user_agent: format!("{product}/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Merge for ClientOptions {
    fn merge(&self, overrides: &Self) -> Self {
        Self {
            api_key: pick(&self.api_key, &overrides.api_key),
            host: pick(&self.host, &overrides.host),
            scheme: pick(&self.scheme, &overrides.scheme),
            product: pick(&self.product, &overrides.product),
        }
    }
}

/// Settings a client is bound to for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: Option<String>,
    host: String,
    scheme: String,
    user_agent: String,
}

impl ClientConfig {
    /// `None` when no key was supplied; the `X-Api-Key` header is then omitted.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}://{}{endpoint}", self.scheme, self.host)
    }
}
