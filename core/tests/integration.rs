//! Service lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through the default ureq transport. Validates
//! that request building, Basic auth and envelope decoding work end-to-end
//! with the actual server.

use clickhouse_cloud_core::{ApiError, CloudClient, ServiceCommand, ServiceScaling};
use mock_server::MockCloud;

/// Serve `cloud` on a background runtime and return its base URL.
fn spawn_server(cloud: MockCloud) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, cloud).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn service_lifecycle() {
    // Step 1: start mock server with one service.
    let base_url = spawn_server(MockCloud::new("key-id", "key-secret").with_service("org-1", "svc-1", "analytics"));
    let client = CloudClient::with_base_url("key-id", "key-secret", &base_url);

    // Step 2: fetch details.
    let envelope = client.get_service_details("org-1", "svc-1").unwrap();
    assert_eq!(envelope.status, 200);
    assert!(!envelope.request_id.is_empty());
    assert_eq!(envelope.result.id, "svc-1");
    assert_eq!(envelope.result.name, "analytics");
    assert_eq!(envelope.result.state, "running");
    assert_eq!(envelope.result.endpoints[0].port, 8443);

    // Step 3: scale with required fields only; other settings are untouched.
    let updated = client
        .update_service_scaling("org-1", "svc-1", &ServiceScaling::new(8, 32))
        .unwrap();
    assert_eq!(updated.result.min_total_memory_gb, 8);
    assert_eq!(updated.result.max_total_memory_gb, 32);
    assert!(updated.result.idle_scaling);
    assert_eq!(updated.result.idle_timeout_minutes, 15);

    // Step 4: scale with optionals.
    let scaling = ServiceScaling::new(16, 64)
        .num_replicas(2)
        .idle_scaling(false)
        .idle_timeout_minutes(30);
    let updated = client.update_service_scaling("org-1", "svc-1", &scaling).unwrap();
    assert_eq!(updated.result.max_replica_memory_gb, 32);
    assert!(!updated.result.idle_scaling);
    assert_eq!(updated.result.idle_timeout_minutes, 30);

    // Step 5: stop.
    let stopped = client
        .set_service_state("org-1", "svc-1", ServiceCommand::Stop)
        .unwrap();
    assert_eq!(stopped.result.state, "stopped");

    // Step 6: the new state is visible on a fresh fetch.
    let fetched = client.get_service_details("org-1", "svc-1").unwrap();
    assert_eq!(fetched.result, stopped.result);
    assert_ne!(fetched.request_id, stopped.request_id);

    // Step 7: start again.
    let started = client
        .set_service_state("org-1", "svc-1", ServiceCommand::Start)
        .unwrap();
    assert_eq!(started.result.state, "running");

    // Step 8: unknown service is a 404 on every operation.
    let err = client.get_service_details("org-1", "missing").unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404 }));
    let err = client
        .update_service_scaling("org-1", "missing", &ServiceScaling::new(8, 32))
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404 }));
    let err = client
        .set_service_state("org-1", "missing", ServiceCommand::Stop)
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404 }));

    // Step 9: server-side validation surfaces as a plain status.
    let err = client
        .update_service_scaling("org-1", "svc-1", &ServiceScaling::new(64, 32))
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[test]
fn wrong_credentials_are_rejected() {
    let base_url = spawn_server(MockCloud::new("key-id", "key-secret").with_service("org-1", "svc-1", "analytics"));
    let client = CloudClient::with_base_url("key-id", "not-the-secret", &base_url);

    let err = client.get_service_details("org-1", "svc-1").unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401 }));
}

#[test]
fn concurrent_calls_share_one_client() {
    let base_url = spawn_server(MockCloud::new("k", "s").with_service("org", "svc", "shared"));
    let client = CloudClient::with_base_url("k", "s", &base_url);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| client.get_service_details("org", "svc")))
            .collect();
        for handle in handles {
            let envelope = handle.join().unwrap().unwrap();
            assert_eq!(envelope.result.name, "shared");
        }
    });
}

#[test]
fn unreachable_host_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let client = CloudClient::with_base_url("k", "s", &format!("http://{addr}"));

    let err = client.get_service_details("org", "svc").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
