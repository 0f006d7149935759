//! Retainer domain types for clients and ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger entry kind: logged work or a balance top-up.
///
/// The stored `hours` magnitude is always positive; the direction of the
/// balance effect is derived solely from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Hours consumed by work performed for the client.
    Work,
    /// Hours purchased, adding to the contracted total.
    Refill,
}

/// Client lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    /// Work may be logged against the retainer.
    Active,
    /// Temporarily suspended; refills are still allowed.
    Paused,
    /// Retired; kept for history, refills still allowed.
    Archived,
}

impl ClientStatus {
    /// Returns true if WORK entries may be appended in this status.
    ///
    /// Refills are permitted in any status - they are how a paused
    /// client later resumes.
    #[must_use]
    pub fn allows_work_logging(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Input for creating a retainer client.
#[derive(Debug, Clone)]
pub struct NewClient {
    /// Display name; also the basis for the public slug.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Initial block of purchased hours. Must be strictly positive.
    pub initial_hours: Decimal,
    /// Informational hourly rate; never affects balance math.
    pub hourly_rate: Option<Decimal>,
    /// Display currency for the rate.
    pub currency: Option<String>,
    /// Link where the client can purchase more hours.
    pub refill_link: Option<String>,
}

/// Input for appending a WORK entry.
#[derive(Debug, Clone)]
pub struct NewWorkEntry {
    /// What the hours were spent on. Must be non-empty.
    pub description: String,
    /// Positive magnitude of hours consumed.
    pub hours: Decimal,
    /// When the work happened; defaults to now when omitted.
    pub date: Option<DateTime<Utc>>,
}

/// Input for a balance top-up.
#[derive(Debug, Clone)]
pub struct RefillRequest {
    /// Positive magnitude of hours purchased.
    pub hours: Decimal,
    /// Optionally replace the hourly rate going forward.
    pub new_rate: Option<Decimal>,
    /// Whether to insert a REFILL audit entry. Defaults to true.
    pub create_log: bool,
}

impl Default for RefillRequest {
    fn default() -> Self {
        Self {
            hours: Decimal::ZERO,
            new_rate: None,
            create_log: true,
        }
    }
}

/// Partial update of client metadata.
///
/// Accumulators and status are deliberately absent: balances move only
/// through ledger operations, status through its own operation.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    /// New display name.
    pub name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New display currency.
    pub currency: Option<String>,
    /// New informational hourly rate.
    pub hourly_rate: Option<Decimal>,
    /// New refill link. `Some(None)` clears the link.
    pub refill_link: Option<Option<String>>,
}

impl ClientPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.currency.is_none()
            && self.hourly_rate.is_none()
            && self.refill_link.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_allows_work_logging() {
        assert!(ClientStatus::Active.allows_work_logging());
        assert!(!ClientStatus::Paused.allows_work_logging());
        assert!(!ClientStatus::Archived.allows_work_logging());
    }

    #[test]
    fn test_entry_kind_serde_tags() {
        assert_eq!(
            serde_json::to_string(&EntryKind::Work).unwrap(),
            "\"WORK\""
        );
        assert_eq!(
            serde_json::to_string(&EntryKind::Refill).unwrap(),
            "\"REFILL\""
        );
    }

    #[test]
    fn test_empty_patch() {
        assert!(ClientPatch::default().is_empty());
        let patch = ClientPatch {
            refill_link: Some(None),
            ..ClientPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
