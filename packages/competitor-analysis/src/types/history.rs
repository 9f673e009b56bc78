//! Ledger entries describing completed invocations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::content::SourceKind;
use super::text::ellipsize;

/// Cap on the request summary, in characters.
pub const REQUEST_SUMMARY_CHARS: usize = 100;

/// Cap on the response summary, in characters.
pub const RESPONSE_SUMMARY_CHARS: usize = 200;

/// One completed invocation, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    id: Uuid,
    timestamp: DateTime<Utc>,
    request_type: SourceKind,
    request_summary: String,
    response_summary: String,
}

impl HistoryEntry {
    /// Create an entry stamped now, truncating both summaries to their caps.
    pub fn new(kind: SourceKind, request: &str, response: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            request_type: kind,
            request_summary: ellipsize(request, REQUEST_SUMMARY_CHARS),
            response_summary: ellipsize(response, RESPONSE_SUMMARY_CHARS),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> SourceKind {
        self.request_type
    }

    pub fn request_summary(&self) -> &str {
        &self.request_summary
    }

    pub fn response_summary(&self) -> &str {
        &self.response_summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries_are_capped() {
        let entry = HistoryEntry::new(SourceKind::Text, &"r".repeat(300), &"s".repeat(300));
        assert_eq!(entry.request_summary().chars().count(), REQUEST_SUMMARY_CHARS);
        assert_eq!(entry.response_summary().chars().count(), RESPONSE_SUMMARY_CHARS);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = HistoryEntry::new(SourceKind::Pdf, "PDF: a.pdf", "summary");
        let b = HistoryEntry::new(SourceKind::Pdf, "PDF: a.pdf", "summary");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_serialized_shape() {
        let entry = HistoryEntry::new(SourceKind::Webpage, "URL: https://a.example", "ok");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["request_type"], "webpage");
        assert_eq!(json["request_summary"], "URL: https://a.example");
        assert!(json["id"].is_string());
        assert!(json["timestamp"].is_string());
    }
}
