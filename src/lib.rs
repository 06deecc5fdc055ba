//! tableforge - runtime schema management for audited PostgreSQL tables
//!
//! Turns declarative table definitions into a main table, a history table, a
//! change-capture trigger and indexes, and records them in a metadata catalog.

pub mod catalog;
pub mod cli;
pub mod database;
pub mod ddl;
pub mod geometry;
pub mod http_server;
pub mod metadata;
pub mod observability;
pub mod orchestrator;
pub mod schema;
