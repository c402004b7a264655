//! Credit balance and ledger types.
//!
//! The balance is owned by the backend; clients hold a cached copy that is
//! refreshed on demand and after purchases. Ledger entries are created
//! server-side and read back in pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{PackageType, TransactionId};

/// How long a cached balance stays fresh before callers should refetch.
pub const BALANCE_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A cached snapshot of the user's credit balance.
///
/// Never authoritative: the server's returned balance always wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalance {
    /// Credits available. Never negative.
    pub credits: i64,

    /// When this snapshot was taken.
    pub last_updated: DateTime<Utc>,
}

impl CreditBalance {
    /// Snapshot a server-reported balance at the current instant.
    #[must_use]
    pub fn now(credits: i64) -> Self {
        Self {
            credits,
            last_updated: Utc::now(),
        }
    }

    /// The zero balance reported for unauthenticated users.
    #[must_use]
    pub fn zero() -> Self {
        Self::now(0)
    }

    /// Whether this snapshot is older than `max_age`.
    ///
    /// A future-dated snapshot (clock skew) counts as fresh.
    #[must_use]
    pub fn is_stale(&self, max_age: Duration) -> bool {
        (Utc::now() - self.last_updated)
            .to_std()
            .is_ok_and(|age| age > max_age)
    }

    /// Whether the snapshot covers `required` credits.
    #[must_use]
    pub fn covers(&self, required: i64) -> bool {
        self.credits >= required
    }
}

/// Type of credit-ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// User purchased credits.
    Purchase,

    /// Credits deducted for usage (profile unlock, essay revision).
    Usage,

    /// Refund issued.
    Refund,

    /// Promotional/bonus credits.
    Bonus,
}

impl TransactionType {
    /// Check if this transaction type adds credits.
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::Purchase | Self::Refund | Self::Bonus)
    }

    /// Check if this transaction type removes credits.
    #[must_use]
    pub const fn is_debit(&self) -> bool {
        matches!(self, Self::Usage)
    }
}

/// An append-only credit-ledger entry, created server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// Credits moved. Positive for credits, negative for debits.
    pub credits: i64,

    /// Type of transaction.
    pub transaction_type: TransactionType,

    /// Human-readable description.
    pub description: String,

    /// Package the transaction relates to, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<PackageType>,

    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_balance_is_not_stale() {
        let balance = CreditBalance::now(100);
        assert!(!balance.is_stale(BALANCE_REFRESH_INTERVAL));
    }

    #[test]
    fn old_balance_is_stale() {
        let balance = CreditBalance {
            credits: 100,
            last_updated: Utc::now() - chrono::Duration::minutes(6),
        };
        assert!(balance.is_stale(BALANCE_REFRESH_INTERVAL));
    }

    #[test]
    fn future_dated_balance_is_fresh() {
        let balance = CreditBalance {
            credits: 100,
            last_updated: Utc::now() + chrono::Duration::minutes(1),
        };
        assert!(!balance.is_stale(BALANCE_REFRESH_INTERVAL));
    }

    #[test]
    fn covers_compares_against_snapshot() {
        let balance = CreditBalance::now(50);
        assert!(balance.covers(50));
        assert!(balance.covers(0));
        assert!(!balance.covers(51));
    }

    #[test]
    fn zero_balance_for_unauthenticated_users() {
        assert_eq!(CreditBalance::zero().credits, 0);
    }

    #[test]
    fn transaction_type_credit_debit() {
        assert!(TransactionType::Purchase.is_credit());
        assert!(TransactionType::Refund.is_credit());
        assert!(TransactionType::Bonus.is_credit());
        assert!(!TransactionType::Usage.is_credit());

        assert!(TransactionType::Usage.is_debit());
        assert!(!TransactionType::Purchase.is_debit());
    }

    #[test]
    fn transaction_decodes_backend_wire_shape() {
        let id = TransactionId::generate();
        let json = serde_json::json!({
            "id": id.to_string(),
            "credits": -30,
            "transactionType": "usage",
            "description": "Unlocked profile",
            "packageType": "student_profiles",
            "createdAt": "2025-11-03T10:15:00Z",
        });

        let tx: CreditTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.id, id);
        assert_eq!(tx.credits, -30);
        assert_eq!(tx.transaction_type, TransactionType::Usage);
        assert_eq!(tx.package_type, Some(PackageType::StudentProfiles));
    }

    #[test]
    fn transaction_package_type_is_optional() {
        let json = serde_json::json!({
            "id": TransactionId::generate().to_string(),
            "credits": 100,
            "transactionType": "purchase",
            "description": "Combo Pack",
            "createdAt": "2025-11-03T10:15:00Z",
        });

        let tx: CreditTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.package_type, None);
        assert!(tx.transaction_type.is_credit());
    }
}
