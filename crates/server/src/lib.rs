//! HTTP API for the department classifier and the keyword knowledge base.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (profile and knowledge base status)
//! - `POST /classify` - Multipart `texts_file` (+ optional `keywords_file`), returns labelled rows
//! - `GET /find-department/?keyword=` - Department of a keyword, 404 when unknown
//! - `POST /add-keyword/` - JSON `{keyword, department_id}`
//! - `GET /list-keywords/` - Whole knowledge base
//! - `GET /list-departments/` - Fixed department registry
//!
//! Errors come back as `{"error": {"code": "...", "message": "..."}}`.
//!
//! Configuration is read from an optional `server.{toml,yaml,json}` file and
//! `DEPTCLASS_SERVER__*` environment variables.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
