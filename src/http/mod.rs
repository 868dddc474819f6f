//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request-id / trace / timeout layers)
//!     → request.rs (request id generation)
//!     → proxy handlers
//!     → response.rs (JSON bodies, X-Cache, Cache-Control)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{CacheStatus, X_CACHE};
pub use server::HttpServer;
