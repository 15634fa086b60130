//! Structured lifecycle logging
//!
//! One `tracing` event per call. The event name and every well-known key
//! (`FIELD_KEYS`) are recorded as separate structured fields; keys outside
//! that set are collected into a single `extra` field rendered in sorted key
//! order, so identical events produce identical output. Logging never
//! affects results.

mod events;

pub use events::{Event, Severity};

use std::fmt;

/// Keys recorded as their own `tracing` fields
pub const FIELD_KEYS: [&str; 5] = ["clause", "code", "count", "primary_key", "row_type"];

/// Key/value pairs rendered as `k=v` in sorted key order
pub struct SortedFields<'a>(Vec<(&'a str, &'a str)>);

impl<'a> SortedFields<'a> {
    pub fn new(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut sorted: Vec<_> = fields.into_iter().collect();
        sorted.sort_by_key(|(k, _)| *k);
        Self(sorted)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SortedFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

struct EventFields<'a>(&'a [(&'a str, &'a str)]);

impl<'a> EventFields<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    fn extra(&self) -> Option<SortedFields<'a>> {
        let extra = SortedFields::new(
            self.0
                .iter()
                .copied()
                .filter(|(k, _)| !FIELD_KEYS.contains(k)),
        );
        (!extra.is_empty()).then_some(extra)
    }
}

macro_rules! emit {
    ($level:ident, $event:expr, $fields:expr) => {
        tracing::$level!(
            event = $event.as_str(),
            row_type = $fields.get("row_type"),
            primary_key = $fields.get("primary_key"),
            clause = $fields.get("clause"),
            code = $fields.get("code"),
            count = $fields.get("count"),
            extra = $fields.extra().map(tracing::field::display)
        )
    };
}

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let fields = EventFields(fields);
    match event.severity() {
        Severity::Debug => emit!(debug, event, fields),
        Severity::Info => emit!(info, event, fields),
        Severity::Warn => emit!(warn, event, fields),
    }
}
