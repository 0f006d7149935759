//! Ownership capability check.
//!
//! The single authorization rule of the ledger: does this caller
//! administer the target client? The check is a plain comparison, but
//! it must be evaluated against a client row read inside the same
//! transaction as the subsequent write - a row from an earlier read may
//! describe an owner that has since changed or a client that no longer
//! exists.

use retainer_shared::types::OwnerId;

use crate::entities::clients;

/// Returns true if `caller` administers `client`.
///
/// `client` must be a transactionally-fresh row; callers lock the row
/// (`FOR UPDATE`) before any check that gates a write.
#[must_use]
pub fn is_owner(caller: OwnerId, client: &clients::Model) -> bool {
    client.owner_id == caller.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::ClientStatus;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn client_owned_by(owner_id: Uuid) -> clients::Model {
        clients::Model {
            id: Uuid::new_v4(),
            owner_id,
            slug: "acme-corp-x9z2k".into(),
            name: "Acme Corp".into(),
            email: None,
            currency: None,
            hourly_rate: None,
            total_hours: Decimal::TEN,
            hours_logged: Decimal::ZERO,
            refill_link: None,
            status: ClientStatus::Active,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_owner_matches() {
        let owner = OwnerId::new();
        let client = client_owned_by(owner.into_inner());
        assert!(is_owner(owner, &client));
    }

    #[test]
    fn test_stranger_rejected() {
        let client = client_owned_by(Uuid::new_v4());
        assert!(!is_owner(OwnerId::new(), &client));
    }
}
