//! Lifecycle events for tableforge
//!
//! Every log line carries one of these as its `event` key.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Table creation
    /// Validated definition accepted, DDL about to run
    TableCreateBegin,
    /// Physical objects and metadata in place
    TableCreated,
    /// Invalid definition or duplicate name; nothing touched
    TableCreateRejected,
    /// DDL or metadata insert failed mid-creation
    TableCreateFailed,

    // Compensation
    /// Every object created by the failed call was dropped
    RollbackComplete,
    /// At least one drop failed; orphans may remain
    RollbackPartial,

    /// One DDL statement executed
    DdlExecuted,

    // Mutation
    FieldAdded,
    TableDeleted,

    /// Physical tables found with no metadata row
    OrphansDetected,

    // Service lifecycle
    ConfigLoaded,
    MetadataSchemaReady,
    /// HTTP listener bound
    Serving,
}

impl Event {
    pub const ALL: [Event; 13] = [
        Event::TableCreateBegin,
        Event::TableCreated,
        Event::TableCreateRejected,
        Event::TableCreateFailed,
        Event::RollbackComplete,
        Event::RollbackPartial,
        Event::DdlExecuted,
        Event::FieldAdded,
        Event::TableDeleted,
        Event::OrphansDetected,
        Event::ConfigLoaded,
        Event::MetadataSchemaReady,
        Event::Serving,
    ];

    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::TableCreateBegin => "TABLE_CREATE_BEGIN",
            Event::TableCreated => "TABLE_CREATED",
            Event::TableCreateRejected => "TABLE_CREATE_REJECTED",
            Event::TableCreateFailed => "TABLE_CREATE_FAILED",
            Event::RollbackComplete => "ROLLBACK_COMPLETE",
            Event::RollbackPartial => "ROLLBACK_PARTIAL",
            Event::DdlExecuted => "DDL_EXECUTED",
            Event::FieldAdded => "FIELD_ADDED",
            Event::TableDeleted => "TABLE_DELETED",
            Event::OrphansDetected => "ORPHANS_DETECTED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::MetadataSchemaReady => "METADATA_SCHEMA_READY",
            Event::Serving => "TABLEFORGE_SERVING",
        }
    }

    /// Severity this event is normally logged at
    pub fn default_severity(&self) -> Severity {
        match self {
            Event::TableCreateFailed | Event::RollbackPartial => Severity::Error,
            Event::TableCreateRejected | Event::OrphansDetected => Severity::Warn,
            Event::DdlExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        for event in Event::ALL {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failures_log_at_error() {
        assert_eq!(Event::TableCreateFailed.default_severity(), Severity::Error);
        assert_eq!(Event::RollbackPartial.default_severity(), Severity::Error);
        assert_eq!(Event::TableCreateRejected.default_severity(), Severity::Warn);
        assert_eq!(Event::TableCreated.default_severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::TableCreated), "TABLE_CREATED");
        assert_eq!(format!("{}", Event::Serving), "TABLEFORGE_SERVING");
    }
}
