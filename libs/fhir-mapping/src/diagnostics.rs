//! Diagnostics sink threaded through every builder and orchestrator
//!
//! Each recorded entry is mirrored as a `tracing` event so process logs and the
//! caller-visible report never diverge. The sink is owned by one export or
//! import call and handed down by `&mut`.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Where a diagnostic was raised: module plus method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub module: &'static str,
    pub method: &'static str,
}

impl Location {
    pub const fn new(module: &'static str, method: &'static str) -> Self {
        Self { module, method }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.method)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "Debug"),
            Self::Info => write!(f, "Info"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Individual diagnostic entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Error chain for entries raised from a caught failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    fn to_issue(&self) -> Value {
        let severity = match self.severity {
            Severity::Debug | Severity::Info => "information",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        let mut diagnostics = self.message.clone();
        if let Some(ref detail) = self.detail {
            diagnostics = format!("{}: {}", diagnostics, detail);
        }
        let mut issue = serde_json::json!({
            "severity": severity,
            "code": if self.detail.is_some() { "exception" } else { "processing" },
            "diagnostics": diagnostics,
        });
        if let Some(ref loc) = self.location {
            issue["location"] = serde_json::json!([loc.to_string()]);
        }
        issue
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(ref loc) = self.location {
            write!(f, " ({})", loc)?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics for one call
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        tracing::debug!(module = location.module, method = location.method, "{}", message);
        self.push(Severity::Debug, message, Some(location), None);
    }

    pub fn info(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        tracing::info!(module = location.module, method = location.method, "{}", message);
        self.push(Severity::Info, message, Some(location), None);
    }

    pub fn warning(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        tracing::warn!(module = location.module, method = location.method, "{}", message);
        self.push(Severity::Warning, message, Some(location), None);
    }

    pub fn error(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        tracing::error!(module = location.module, method = location.method, "{}", message);
        self.push(Severity::Error, message, Some(location), None);
    }

    /// Record a caught failure together with its full error chain
    pub fn exception(
        &mut self,
        message: impl Into<String>,
        location: Location,
        err: &dyn std::error::Error,
    ) {
        let message = message.into();
        let detail = error_chain(err);
        tracing::error!(
            module = location.module,
            method = location.method,
            error = %detail,
            "{}",
            message
        );
        self.push(Severity::Error, message, Some(location), Some(detail));
    }

    fn push(
        &mut self,
        severity: Severity,
        message: String,
        location: Option<Location>,
        detail: Option<String>,
    ) {
        self.entries.push(Diagnostic {
            severity,
            message,
            location,
            detail,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries at `severity` or above
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity >= severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// True when any entry's message contains `text`
    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(text))
    }

    /// Append another sink's entries, keeping order
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Entries at `severity` or above, one per line
    pub fn dump(&self, severity: Severity) -> String {
        self.entries
            .iter()
            .filter(|e| e.severity >= severity)
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_operation_outcome(&self) -> Value {
        serde_json::json!({
            "resourceType": "OperationOutcome",
            "issue": self.entries.iter().map(|e| e.to_issue()).collect::<Vec<_>>()
        })
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    const HERE: Location = Location::new("diagnostics", "tests");

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn test_counts_by_severity() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.debug("d", HERE);
        diagnostics.info("i", HERE);
        diagnostics.warning("w", HERE);
        diagnostics.error("e", HERE);

        assert_eq!(diagnostics.len(), 4);
        assert_eq!(diagnostics.count(Severity::Warning), 2);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_exception_keeps_chain() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.exception("Failed", HERE, &Outer(Inner));
        let entry = &diagnostics.entries()[0];
        assert_eq!(entry.severity, Severity::Error);
        assert_eq!(entry.detail.as_deref(), Some("outer: inner"));
        assert_eq!(entry.to_string(), "[Error] Failed (diagnostics.tests): outer: inner");
    }

    #[test]
    fn test_operation_outcome() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning("Missing phase", HERE);
        let outcome = diagnostics.to_operation_outcome();
        assert_eq!(outcome["resourceType"], "OperationOutcome");
        assert_eq!(outcome["issue"][0]["severity"], "warning");
        assert_eq!(outcome["issue"][0]["location"][0], "diagnostics.tests");
    }

    #[test]
    fn test_dump_filters() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info("quiet", HERE);
        diagnostics.error("loud", HERE);
        let dump = diagnostics.dump(Severity::Warning);
        assert!(dump.contains("loud"));
        assert!(!dump.contains("quiet"));
    }
}
