//! HTTP request and response values passed between the client and a
//! `Transport`.
//!
//! # Design
//! The client assembles an `HttpRequest` as plain data and hands it to the
//! transport, which returns an `HttpResponse` as plain data. Nothing here
//! touches the network, so request assembly and response classification can
//! be tested without a server.
//!
//! `RequestOptions` is the caller-facing, partially filled form of a request.
//! Options are layered with `Merge`: later layers win field by field, and
//! headers from every layer are combined.

use std::collections::BTreeMap;

use crate::merge::{pick, Merge};

/// Header name to value. Ordered so assembled requests are deterministic.
pub type Headers = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Per-call overrides for a request. Every field is optional; unset fields
/// fall through to whatever layer sits underneath.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub headers: Headers,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl Merge for RequestOptions {
    /// Headers are combined, with `overrides` replacing values for names that
    /// appear on both sides, ignoring case. `method` and `body` take the
    /// override when set.
    fn merge(&self, overrides: &Self) -> Self {
        let mut headers = Headers::new();
        for (name, value) in self.headers.iter().chain(&overrides.headers) {
            set_header(&mut headers, name.clone(), value.clone());
        }
        Self {
            method: pick(&self.method, &overrides.method),
            headers,
            body: pick(&self.body, &overrides.body),
        }
    }
}

/// Insert a header, dropping any existing entry whose name differs only in
/// case. The new spelling is kept.
fn set_header(headers: &mut Headers, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// A fully assembled HTTP request, ready for a `Transport` to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response as returned by a `Transport`. The body is kept as raw
/// text; JSON parsing happens during classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
