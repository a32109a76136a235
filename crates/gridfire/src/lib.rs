//! # Gridfire
//!
//! Realtime multiplayer arena-shooter session server.
//!
//! The gateway ties the layers together: an axum HTTP API for lobby
//! lifecycle and game launch, and a WebSocket duplex channel for the
//! per-tick input/snapshot exchange. All game state lives behind the
//! lobby registry and session manager; this crate only maps transport
//! requests onto them.
//!
//! ```rust,no_run
//! use gridfire::Server;
//!
//! # async fn run() -> Result<(), gridfire::GridfireError> {
//! let server = Server::builder()
//!     .http_addr("0.0.0.0:8080")
//!     .ws_addr("0.0.0.0:8081")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
pub mod http;
mod server;
pub mod ws;

pub use error::GridfireError;
pub use http::AppState;
pub use server::{Server, ServerBuilder};
