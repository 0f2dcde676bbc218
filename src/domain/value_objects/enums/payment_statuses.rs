use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle of a payment row. PENDING is the only non-terminal status:
/// a payment moves out of it exactly once and never back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Authorized,
    Declined,
    PendingReconciliation,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Authorized => "AUTHORIZED",
            PaymentStatus::Declined => "DECLINED",
            PaymentStatus::PendingReconciliation => "PENDING_RECONCILIATION",
        };
        write!(f, "{}", status)
    }
}

impl PaymentStatus {
    pub fn from_str(status: &str) -> Option<Self> {
        match status {
            "PENDING" => Some(PaymentStatus::Pending),
            "AUTHORIZED" => Some(PaymentStatus::Authorized),
            "DECLINED" => Some(PaymentStatus::Declined),
            "PENDING_RECONCILIATION" => Some(PaymentStatus::PendingReconciliation),
            _ => None,
        }
    }
}
