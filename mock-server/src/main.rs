use mock_server::MockCloud;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let key_id = std::env::var("MOCK_KEY_ID").unwrap_or_else(|_| "mock-key".to_string());
    let key_secret = std::env::var("MOCK_KEY_SECRET").unwrap_or_else(|_| "mock-secret".to_string());

    let cloud = MockCloud::new(&key_id, &key_secret).with_service("demo-org", "demo-service", "demo");
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %key_id, "mock cloud API listening");
    mock_server::run(listener, cloud).await
}
