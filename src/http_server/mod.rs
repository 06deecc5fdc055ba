//! # HTTP Server Module
//!
//! Admin API for custom tables.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET|POST /tables` - List or create tables
//! - `POST /tables/validate` - Dry-run validation
//! - `GET /tables/orphans` - Physical tables with no metadata
//! - `GET|DELETE /tables/:id`, `GET /tables/by-name/:name`
//! - `POST /tables/:id/fields` - Add a field

pub mod config;
mod errors;
pub mod server;
pub mod table_routes;

pub use config::HttpServerConfig;
pub use errors::ErrorResponse;
pub use server::HttpServer;
pub use table_routes::{table_routes, TablesState};
