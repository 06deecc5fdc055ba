//! Physical database access
//!
//! `DdlExecutor` is the seam between orchestration and the engine. The
//! PostgreSQL implementation runs on a `sqlx` pool; `MemoryDatabase` backs
//! tests and offline commands.

mod errors;
mod executor;
mod memory;
mod postgres;

pub use errors::{DatabaseError, DatabaseResult};
pub use executor::{DdlExecutor, DdlSession};
pub use memory::MemoryDatabase;
pub use postgres::{connect, PgDdlExecutor};
