//! Schema orchestrator
//!
//! Turns a table definition into physical PostgreSQL objects plus catalog
//! rows, in a fixed order:
//!
//! 1. Validate (no side effects on failure)
//! 2. Reject names already in the metadata store
//! 3. Run the creation plan on one connection
//! 4. Insert table and field metadata
//!
//! Steps 3 and 4 are not one transaction. A failure in either drops the
//! objects this call created and reports a `CreationOutcome`.

mod errors;
mod orchestrator;
mod rollback;

pub use errors::{CreationOutcome, TableError, TableResult};
pub use orchestrator::SchemaOrchestrator;
pub use rollback::{roll_back, CreatedObjects, RollbackReport};
