use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub region: String,
    pub state: String,
    pub endpoints: Vec<Endpoint>,
    pub tier: String,
    pub idle_scaling: bool,
    pub idle_timeout_minutes: u32,
    pub min_total_memory_gb: u32,
    pub max_total_memory_gb: u32,
    pub min_replica_memory_gb: u32,
    pub max_replica_memory_gb: u32,
    pub ip_access_list: Vec<IpAccess>,
    pub created_at: String,
    pub iam_role: String,
    pub private_endpoint_ids: Vec<String>,
    pub data_warehouse_id: String,
    pub is_primary: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpAccess {
    pub source: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScaling {
    pub min_total_memory_gb: u32,
    pub max_total_memory_gb: u32,
    pub num_replicas: Option<u32>,
    pub idle_scaling: Option<bool>,
    pub idle_timeout_minutes: Option<u32>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
}

#[derive(Debug, Deserialize)]
pub struct UpdateState {
    pub command: Command,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub result: T,
    pub request_id: String,
    pub status: u16,
}

impl<T> Envelope<T> {
    fn ok(result: T) -> Json<Self> {
        Json(Self {
            result,
            request_id: Uuid::new_v4().to_string(),
            status: StatusCode::OK.as_u16(),
        })
    }
}

type ServiceKey = (String, String);

pub type Db = Arc<RwLock<HashMap<ServiceKey, Service>>>;

#[derive(Clone)]
struct AppState {
    expected_auth: Arc<str>,
    db: Db,
}

/// Configuration for the simulated cloud: the one accepted key pair and the
/// services that exist at startup.
#[derive(Debug, Clone)]
pub struct MockCloud {
    key_id: String,
    key_secret: String,
    services: HashMap<ServiceKey, Service>,
}

impl MockCloud {
    pub fn new(key_id: &str, key_secret: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            services: HashMap::new(),
        }
    }

    /// Seed a running production service with default capacity settings.
    pub fn with_service(self, org_id: &str, service_id: &str, name: &str) -> Self {
        let host = format!("{service_id}.us-east-1.aws.clickhouse.cloud");
        let service = Service {
            id: service_id.to_string(),
            name: name.to_string(),
            provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            state: "running".to_string(),
            endpoints: vec![Endpoint {
                protocol: "https".to_string(),
                host,
                port: 8443,
            }],
            tier: "production".to_string(),
            idle_scaling: true,
            idle_timeout_minutes: 15,
            min_total_memory_gb: 24,
            max_total_memory_gb: 48,
            min_replica_memory_gb: 8,
            max_replica_memory_gb: 16,
            ip_access_list: vec![IpAccess {
                source: "0.0.0.0/0".to_string(),
                description: "anywhere".to_string(),
            }],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            iam_role: format!("arn:aws:iam::000000000000:role/CH-{service_id}"),
            private_endpoint_ids: Vec::new(),
            data_warehouse_id: service_id.to_string(),
            is_primary: true,
        };
        self.with_service_details(org_id, service)
    }

    pub fn with_service_details(mut self, org_id: &str, service: Service) -> Self {
        self.services
            .insert((org_id.to_string(), service.id.clone()), service);
        self
    }

    fn expected_auth(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.key_id, self.key_secret));
        format!("Basic {token}")
    }
}

pub fn app(cloud: MockCloud) -> Router {
    let state = AppState {
        expected_auth: cloud.expected_auth().into(),
        db: Arc::new(RwLock::new(cloud.services)),
    };
    Router::new()
        .route(
            "/v1/organizations/{org_id}/services/{service_id}",
            get(get_service),
        )
        .route(
            "/v1/organizations/{org_id}/services/{service_id}/scaling",
            patch(update_scaling),
        )
        .route(
            "/v1/organizations/{org_id}/services/{service_id}/state",
            patch(update_state),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener, cloud: MockCloud) -> Result<(), std::io::Error> {
    axum::serve(listener, app(cloud)).await
}

/// Runs before any body extractor, so bad credentials win over a bad body.
async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if provided != Some(&*state.expected_auth) {
        tracing::warn!(present = provided.is_some(), "rejecting request with bad credentials");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

async fn get_service(
    State(state): State<AppState>,
    Path(key): Path<ServiceKey>,
) -> Result<Json<Envelope<Service>>, StatusCode> {
    tracing::debug!(org_id = %key.0, service_id = %key.1, "get service");
    let services = state.db.read().await;
    services
        .get(&key)
        .cloned()
        .map(Envelope::ok)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_scaling(
    State(state): State<AppState>,
    Path(key): Path<ServiceKey>,
    Json(input): Json<UpdateScaling>,
) -> Result<Json<Envelope<Service>>, StatusCode> {
    tracing::debug!(org_id = %key.0, service_id = %key.1, ?input, "update scaling");
    if input.min_total_memory_gb > input.max_total_memory_gb || input.num_replicas == Some(0) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut services = state.db.write().await;
    let service = services.get_mut(&key).ok_or(StatusCode::NOT_FOUND)?;
    service.min_total_memory_gb = input.min_total_memory_gb;
    service.max_total_memory_gb = input.max_total_memory_gb;
    if let Some(replicas) = input.num_replicas {
        service.min_replica_memory_gb = input.min_total_memory_gb / replicas;
        service.max_replica_memory_gb = input.max_total_memory_gb / replicas;
    }
    if let Some(idle_scaling) = input.idle_scaling {
        service.idle_scaling = idle_scaling;
    }
    if let Some(minutes) = input.idle_timeout_minutes {
        service.idle_timeout_minutes = minutes;
    }
    Ok(Envelope::ok(service.clone()))
}

async fn update_state(
    State(state): State<AppState>,
    Path(key): Path<ServiceKey>,
    Json(input): Json<UpdateState>,
) -> Result<Json<Envelope<Service>>, StatusCode> {
    tracing::debug!(org_id = %key.0, service_id = %key.1, command = ?input.command, "update state");
    let mut services = state.db.write().await;
    let service = services.get_mut(&key).ok_or(StatusCode::NOT_FOUND)?;
    service.state = match input.command {
        Command::Start => "running",
        Command::Stop => "stopped",
    }
    .to_string();
    Ok(Envelope::ok(service.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_serializes_camel_case() {
        let cloud = MockCloud::new("k", "s").with_service("org", "svc", "analytics");
        let service = &cloud.services[&("org".to_string(), "svc".to_string())];
        let json = serde_json::to_value(service).unwrap();
        assert_eq!(json["id"], "svc");
        assert_eq!(json["minTotalMemoryGb"], 24);
        assert_eq!(json["endpoints"][0]["port"], 8443);
        assert_eq!(json["isPrimary"], true);
    }

    #[test]
    fn expected_auth_is_basic_base64() {
        let cloud = MockCloud::new("abc", "def");
        assert_eq!(cloud.expected_auth(), "Basic YWJjOmRlZg==");
    }

    #[test]
    fn update_scaling_optionals_may_be_absent() {
        let input: UpdateScaling =
            serde_json::from_str(r#"{"minTotalMemoryGb":8,"maxTotalMemoryGb":32}"#).unwrap();
        assert_eq!(input.min_total_memory_gb, 8);
        assert!(input.num_replicas.is_none());
        assert!(input.idle_scaling.is_none());
    }

    #[test]
    fn update_scaling_rejects_missing_bounds() {
        let result: Result<UpdateScaling, _> = serde_json::from_str(r#"{"minTotalMemoryGb":8}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_state_accepts_only_known_commands() {
        let input: UpdateState = serde_json::from_str(r#"{"command":"stop"}"#).unwrap();
        assert_eq!(input.command, Command::Stop);
        let result: Result<UpdateState, _> = serde_json::from_str(r#"{"command":"restart"}"#);
        assert!(result.is_err());
    }
}
