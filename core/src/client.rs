//! Request builder, response parser and round-trip driver for the cloud API.
//!
//! # Design
//! `CloudClient` holds credentials, a base URL and a `Transport`, none of
//! which change after construction. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`; the one-call method in between sends the request through
//! the transport exactly once. No retries, no caching.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Credentials;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{ApiResponse, ServiceCommand, ServiceDetails, ServiceScaling, ServiceStateCommand};

#[cfg(feature = "ureq")]
use crate::{error::ConfigError, http::UreqTransport};

/// Production API endpoint used when no base URL is given.
pub const DEFAULT_BASE_URL: &str = "https://api.clickhouse.cloud";

pub const ENV_KEY_ID: &str = "CLICKHOUSE_CLOUD_KEY_ID";
pub const ENV_KEY_SECRET: &str = "CLICKHOUSE_CLOUD_KEY_SECRET";
pub const ENV_API_URL: &str = "CLICKHOUSE_CLOUD_API_URL";

/// Client for the service-management endpoints of the cloud API.
///
/// Organization and service identifiers are inserted into the URL verbatim;
/// callers must pass URL-safe values.
#[derive(Debug, Clone)]
pub struct CloudClient<T> {
    credentials: Credentials,
    base_url: String,
    transport: T,
}

#[cfg(feature = "ureq")]
impl CloudClient<UreqTransport> {
    /// Client against the production endpoint.
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self::with_base_url(key_id, key_secret, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        base_url: &str,
    ) -> Self {
        Self::with_transport(key_id, key_secret, base_url, UreqTransport::new())
    }

    /// Build a client from `CLICKHOUSE_CLOUD_KEY_ID`,
    /// `CLICKHOUSE_CLOUD_KEY_SECRET` and the optional `CLICKHOUSE_CLOUD_API_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name))
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, std::env::VarError>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &'static str| match lookup(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidVar(name)),
        };

        let key_id = var(ENV_KEY_ID)?.ok_or(ConfigError::MissingVar(ENV_KEY_ID))?;
        let key_secret = var(ENV_KEY_SECRET)?.ok_or(ConfigError::MissingVar(ENV_KEY_SECRET))?;
        let base_url = var(ENV_API_URL)?.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self::with_base_url(key_id, key_secret, &base_url))
    }
}

impl<T> CloudClient<T> {
    /// Client that sends requests through a caller-supplied transport.
    pub fn with_transport(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        base_url: &str,
        transport: T,
    ) -> Self {
        Self {
            credentials: Credentials::new(key_id, key_secret),
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_get_service_details(&self, organization_id: &str, service_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.service_url(organization_id, service_id, ""),
            headers: self.headers(),
            body: None,
        }
    }

    pub fn build_update_service_scaling(
        &self,
        organization_id: &str,
        service_id: &str,
        scaling: &ServiceScaling,
    ) -> Result<HttpRequest, ApiError> {
        self.build_patch(self.service_url(organization_id, service_id, "/scaling"), scaling)
    }

    pub fn build_set_service_state(
        &self,
        organization_id: &str,
        service_id: &str,
        command: ServiceCommand,
    ) -> Result<HttpRequest, ApiError> {
        self.build_patch(
            self.service_url(organization_id, service_id, "/state"),
            &ServiceStateCommand { command },
        )
    }

    pub fn parse_get_service_details(
        &self,
        response: HttpResponse,
    ) -> Result<ApiResponse<ServiceDetails>, ApiError> {
        parse_response(response)
    }

    pub fn parse_update_service_scaling(
        &self,
        response: HttpResponse,
    ) -> Result<ApiResponse<ServiceDetails>, ApiError> {
        parse_response(response)
    }

    pub fn parse_set_service_state(
        &self,
        response: HttpResponse,
    ) -> Result<ApiResponse<ServiceDetails>, ApiError> {
        parse_response(response)
    }

    fn build_patch<B: Serialize>(&self, url: String, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(ApiError::Encode)?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url,
            headers: self.headers(),
            body: Some(body),
        })
    }

    fn service_url(&self, organization_id: &str, service_id: &str, suffix: &str) -> String {
        format!(
            "{}/v1/organizations/{organization_id}/services/{service_id}{suffix}",
            self.base_url
        )
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("authorization".to_string(), self.credentials.basic_auth_header()),
            ("content-type".to_string(), "application/json".to_string()),
        ]
    }
}

impl<T: Transport> CloudClient<T> {
    /// `GET /v1/organizations/{org}/services/{svc}`
    pub fn get_service_details(
        &self,
        organization_id: &str,
        service_id: &str,
    ) -> Result<ApiResponse<ServiceDetails>, ApiError> {
        let request = self.build_get_service_details(organization_id, service_id);
        self.parse_get_service_details(self.send(request)?)
    }

    /// `PATCH /v1/organizations/{org}/services/{svc}/scaling`
    pub fn update_service_scaling(
        &self,
        organization_id: &str,
        service_id: &str,
        scaling: &ServiceScaling,
    ) -> Result<ApiResponse<ServiceDetails>, ApiError> {
        let request = self.build_update_service_scaling(organization_id, service_id, scaling)?;
        self.parse_update_service_scaling(self.send(request)?)
    }

    /// `PATCH /v1/organizations/{org}/services/{svc}/state`
    pub fn set_service_state(
        &self,
        organization_id: &str,
        service_id: &str,
        command: ServiceCommand,
    ) -> Result<ApiResponse<ServiceDetails>, ApiError> {
        let request = self.build_set_service_state(organization_id, service_id, command)?;
        self.parse_set_service_state(self.send(request)?)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending cloud API request");
        let response = self
            .transport
            .send(request)
            .map_err(|e| ApiError::Transport(Box::new(e)))?;
        tracing::debug!(status = response.status, "received cloud API response");
        tracing::trace!(body_len = response.body.len());
        Ok(response)
    }
}

/// Check the status and decode the body as an `ApiResponse<R>`.
///
/// A non-2xx response fails with `ApiError::Http` before the body is looked at.
pub fn parse_response<R: DeserializeOwned>(response: HttpResponse) -> Result<ApiResponse<R>, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(ApiError::Decode)
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
    })
}
