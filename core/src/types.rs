//! Wire DTOs for the cloud service-management API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any drift between the two crates.
//!
//! `ServiceDetails` trusts the server: every field defaults when absent or
//! `null` and unknown fields are ignored, so a syntactically valid but
//! incomplete body still decodes. Only a field of the wrong JSON type is
//! rejected.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope wrapping every API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub result: T,
    pub request_id: String,
    /// HTTP status code as reported by the server inside the body.
    pub status: u16,
}

/// A managed service as returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub endpoints: Vec<ServiceEndpoint>,
    #[serde(deserialize_with = "null_as_default")]
    pub tier: String,
    #[serde(deserialize_with = "null_as_default")]
    pub idle_scaling: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub idle_timeout_minutes: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub min_total_memory_gb: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub max_total_memory_gb: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub min_replica_memory_gb: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub max_replica_memory_gb: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_access_list: Vec<IpAccessEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub iam_role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub private_endpoint_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub data_warehouse_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceEndpoint {
    #[serde(deserialize_with = "null_as_default")]
    pub protocol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub host: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpAccessEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// Request payload for `PATCH .../scaling`. Only the fields present are sent;
/// omitted fields are left unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceScaling {
    pub min_total_memory_gb: u32,
    pub max_total_memory_gb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_replicas: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_scaling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_minutes: Option<u32>,
}

impl ServiceScaling {
    pub fn new(min_total_memory_gb: u32, max_total_memory_gb: u32) -> Self {
        Self {
            min_total_memory_gb,
            max_total_memory_gb,
            ..Self::default()
        }
    }

    pub fn num_replicas(mut self, replicas: u32) -> Self {
        self.num_replicas = Some(replicas);
        self
    }

    pub fn idle_scaling(mut self, enabled: bool) -> Self {
        self.idle_scaling = Some(enabled);
        self
    }

    pub fn idle_timeout_minutes(mut self, minutes: u32) -> Self {
        self.idle_timeout_minutes = Some(minutes);
        self
    }
}

/// Lifecycle command accepted by `PATCH .../state`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCommand {
    Start,
    Stop,
}

/// Request payload for `PATCH .../state`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceStateCommand {
    pub command: ServiceCommand,
}
