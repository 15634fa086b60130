//! Observable events
//!
//! Events are explicit and typed. Each maps to a stable upper-snake name
//! and a fixed severity.

use std::fmt;

/// Severity an event is logged at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine detail
    Debug,
    /// Normal lifecycle milestones
    Info,
    /// A declaration or clause was refused
    Warn,
}

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Declaration
    /// Row type validated into a descriptor
    RowTypeDeclared,
    /// Row type declaration refused
    RowTypeRejected,

    // Registry
    /// Descriptor added to a registry
    RowTypeRegistered,
    /// Batch of JSON declarations registered
    DeclarationsLoaded,

    // Query building
    /// Raw clause refused during normalization
    ClauseRejected,
    /// Placeholders in a query replaced by bound values
    PlaceholdersResolved,
}

impl Event {
    /// Returns the stable event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RowTypeDeclared => "ROW_TYPE_DECLARED",
            Event::RowTypeRejected => "ROW_TYPE_REJECTED",
            Event::RowTypeRegistered => "ROW_TYPE_REGISTERED",
            Event::DeclarationsLoaded => "DECLARATIONS_LOADED",
            Event::ClauseRejected => "CLAUSE_REJECTED",
            Event::PlaceholdersResolved => "PLACEHOLDERS_RESOLVED",
        }
    }

    /// Returns true if this event reports a refusal
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::RowTypeRejected | Event::ClauseRejected)
    }

    pub fn severity(&self) -> Severity {
        if self.is_failure() {
            return Severity::Warn;
        }
        match self {
            Event::RowTypeRegistered | Event::DeclarationsLoaded => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
