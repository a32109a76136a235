use gridfire::{GridfireError, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), GridfireError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let http_addr =
        std::env::var("GRIDFIRE_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let ws_addr =
        std::env::var("GRIDFIRE_WS_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".to_string());

    let server = Server::builder()
        .http_addr(&http_addr)
        .ws_addr(&ws_addr)
        .build()
        .await?;
    server.run().await
}
