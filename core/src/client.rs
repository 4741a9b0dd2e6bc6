//! HTTP client for the change request API.
//!
//! # Design
//! `ChangeRequestClient` is bound to an immutable `ClientConfig` and a
//! `Transport`. Every call goes through three steps:
//! 1. `build_*` assembles an `HttpRequest` from layered `RequestOptions`
//!    (auth and user agent first, then method and body, then caller options).
//! 2. The transport sends it exactly once.
//! 3. `classify` parses the body as JSON and turns the response into an
//!    `ApiResult` or an `ApiError`.
//!
//! Steps 1 and 3 are pure, so they are tested without a network.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, ClientOptions};
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::merge::Merge;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ChangeRequestList, CloseRecordInput, OpenRecordInput};

pub const OPEN_ENDPOINT: &str = "/v2/releaselog";
pub const CLOSE_ENDPOINT: &str = "/v2/close";

/// A successful response: the raw response plus its parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub response: HttpResponse,
    pub body: Value,
}

impl ApiResult {
    /// Id of the first entry in `changeRequests`, if there is one.
    pub fn first_record_id(&self) -> Option<String> {
        match self.body.pointer("/changeRequests/0/id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    pub fn records(&self) -> Result<ChangeRequestList, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

#[derive(Debug)]
pub struct ChangeRequestClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl ChangeRequestClient<ReqwestTransport> {
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        Ok(Self::with_transport(options, ReqwestTransport::new()?))
    }
}

impl<T: Transport> ChangeRequestClient<T> {
    pub fn with_transport(options: ClientOptions, transport: T) -> Self {
        Self {
            config: options.into_config(),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn base_options(&self) -> RequestOptions {
        let mut options = RequestOptions::new().header("User-Agent", self.config.user_agent());
        if let Some(api_key) = self.config.api_key() {
            options = options.header("X-Api-Key", api_key);
        }
        options
    }

    /// Assemble the request `fetch` would send. A missing method means GET.
    pub fn build_request(&self, endpoint: &str, options: &RequestOptions) -> HttpRequest {
        let merged = self.base_options().merge(options);
        HttpRequest {
            method: merged.method.unwrap_or(HttpMethod::Get),
            url: self.config.url(endpoint),
            headers: merged.headers.into_iter().collect(),
            body: merged.body,
        }
    }

    pub fn build_get(&self, endpoint: &str, options: &RequestOptions) -> HttpRequest {
        self.build_request(endpoint, &get_options(options))
    }

    pub fn build_post<D: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &D,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        Ok(self.build_request(endpoint, &post_options(data, options)?))
    }

    pub fn build_open(&self, input: &OpenRecordInput) -> Result<HttpRequest, ApiError> {
        self.build_post(OPEN_ENDPOINT, &input.with_defaults(), &RequestOptions::new())
    }

    pub fn build_close(&self, input: &CloseRecordInput) -> Result<HttpRequest, ApiError> {
        self.build_post(CLOSE_ENDPOINT, &input.with_defaults(), &RequestOptions::new())
    }

    /// Send one request to `endpoint` and classify the response.
    pub async fn fetch(&self, endpoint: &str, options: &RequestOptions) -> Result<ApiResult, ApiError> {
        self.send(endpoint, self.build_request(endpoint, options)).await
    }

    pub async fn get(&self, endpoint: &str, options: &RequestOptions) -> Result<ApiResult, ApiError> {
        self.fetch(endpoint, &get_options(options)).await
    }

    pub async fn post<D: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &D,
        options: &RequestOptions,
    ) -> Result<ApiResult, ApiError> {
        let options = post_options(data, options)?;
        self.fetch(endpoint, &options).await
    }

    /// Open a new change request, filling in open defaults.
    pub async fn open(&self, input: &OpenRecordInput) -> Result<ApiResult, ApiError> {
        self.post(OPEN_ENDPOINT, &input.with_defaults(), &RequestOptions::new())
            .await
    }

    /// Close the change request named by `input.id`, filling in close
    /// defaults. The id is passed through unchecked.
    pub async fn close(&self, input: &CloseRecordInput) -> Result<ApiResult, ApiError> {
        self.post(CLOSE_ENDPOINT, &input.with_defaults(), &RequestOptions::new())
            .await
    }

    async fn send(&self, endpoint: &str, request: HttpRequest) -> Result<ApiResult, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        debug!(endpoint, status = response.status, "received response");
        classify(endpoint, response)
    }
}

/// Caller options with the method forced to GET.
pub fn get_options(options: &RequestOptions) -> RequestOptions {
    let mut merged = RequestOptions::new().merge(options);
    merged.method = Some(HttpMethod::Get);
    merged
}

/// A JSON POST of `data`, with caller options layered on top. The method is
/// always POST; caller headers are added alongside `Content-Type`.
pub fn post_options<D: Serialize + ?Sized>(
    data: &D,
    options: &RequestOptions,
) -> Result<RequestOptions, ApiError> {
    let body = serde_json::to_string(data).map_err(ApiError::Serialization)?;
    let mut merged = RequestOptions::new()
        .body(body)
        .header("Content-Type", "application/json")
        .merge(options);
    merged.method = Some(HttpMethod::Post);
    Ok(merged)
}

/// Turn a raw response into a result. The body is parsed before the status
/// is looked at, because error detail lives in the body.
pub fn classify(endpoint: &str, response: HttpResponse) -> Result<ApiResult, ApiError> {
    let body: Value = serde_json::from_str(&response.body).map_err(TransportError::from)?;

    if !response.is_success() {
        let detail = match body.get("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(message)) => Some(message.clone()),
            Some(other) => Some(other.to_string()),
        };
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: response.status,
            detail,
        });
    }

    if let Some(message) = body.pointer("/cause/errorMessage").and_then(Value::as_str) {
        return Err(ApiError::Logical {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        });
    }

    Ok(ApiResult { response, body })
}
