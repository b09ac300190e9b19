use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::usage::{current_month_key, UsageStore};

/// Outcome of a quota check. `Denied` carries the limit and month so the
/// response can tell the client exactly which window filled up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Denied { limit: u32, month: String },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed)
    }
}

/// Monthly quota gate in front of the usage store.
///
/// Pro users always pass, but their requests are still counted; the flag only
/// bypasses the limit. Everyone else gets `free_limit` accepted requests per
/// UTC calendar month.
pub struct QuotaGate {
    store: UsageStore,
    free_limit: u32,
    // Serializes the load/mutate/persist cycle. The store has no row-level
    // locking, so two interleaved checks for the same user could otherwise
    // both observe "below limit" and admit limit+1 requests.
    write_lock: Mutex<()>,
}

impl QuotaGate {
    pub fn new(store: UsageStore, free_limit: u32) -> Self {
        Self {
            store,
            free_limit,
            write_lock: Mutex::new(()),
        }
    }

    pub fn free_limit(&self) -> u32 {
        self.free_limit
    }

    /// Checks the current month's count for `user_id` and, if the request is
    /// admitted, records it and persists the store before returning.
    pub async fn check_and_consume(&self, user_id: &str) -> Result<QuotaDecision, Error> {
        self.check_and_consume_in_month(user_id, &current_month_key())
            .await
    }

    pub(crate) async fn check_and_consume_in_month(
        &self,
        user_id: &str,
        month_key: &str,
    ) -> Result<QuotaDecision, Error> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.store.load().await?;

        if !snapshot.is_pro(user_id) && snapshot.count(user_id, month_key) >= self.free_limit {
            debug!("Quota denied for user {user_id} in {month_key}");
            return Ok(QuotaDecision::Denied {
                limit: self.free_limit,
                month: month_key.to_string(),
            });
        }

        snapshot.record(user_id, month_key);
        self.store.persist(&snapshot).await?;
        Ok(QuotaDecision::Allowed)
    }
}
