use serde::{Deserialize, Serialize};

/// Subscription state mirrored into session claims from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    None,
    Trial,
    Active,
    Expired,
}

impl SubscriptionStatus {
    /// Whether this status grants access to subscriber-only routes, given
    /// the (nullable) expiry in epoch milliseconds. A missing expiry on an
    /// active/trial subscription counts as open-ended.
    pub fn entitles(self, expires_at: Option<i64>, now_ms: i64) -> bool {
        match self {
            SubscriptionStatus::Active | SubscriptionStatus::Trial => {
                expires_at.is_none_or(|at| at > now_ms)
            }
            SubscriptionStatus::None | SubscriptionStatus::Expired => false,
        }
    }
}
