use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub mod gate;
pub mod store;

pub use gate::{QuotaDecision, QuotaGate};
pub use store::UsageStore;

/// The persisted usage document: per-user monthly request counters plus the
/// externally managed pro flags. The serialized layout is shared with the
/// billing side (`usage` / `proUsers`), so field names are part of the
/// contract.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    #[serde(default)]
    pub usage: HashMap<String, HashMap<String, u32>>,
    #[serde(default, rename = "proUsers")]
    pub pro_users: HashMap<String, bool>,
}

impl UsageSnapshot {
    /// Recorded request count for (user, month); 0 for unseen pairs.
    pub fn count(&self, user_id: &str, month_key: &str) -> u32 {
        self.usage
            .get(user_id)
            .and_then(|months| months.get(month_key))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_pro(&self, user_id: &str) -> bool {
        self.pro_users.get(user_id).copied().unwrap_or(false)
    }

    /// Counts one accepted request. Counters only ever move up.
    pub fn record(&mut self, user_id: &str, month_key: &str) {
        let count = self
            .usage
            .entry(user_id.to_string())
            .or_default()
            .entry(month_key.to_string())
            .or_insert(0);
        *count += 1;
    }
}

/// Current UTC year-month, e.g. "2026-08".
pub fn current_month_key() -> String {
    Utc::now().format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_defaults_to_zero() {
        let snapshot = UsageSnapshot::default();
        assert_eq!(snapshot.count("u1", "2026-08"), 0);
        assert!(!snapshot.is_pro("u1"));
    }

    #[test]
    fn test_record_increments_by_one() {
        let mut snapshot = UsageSnapshot::default();
        snapshot.record("u1", "2026-08");
        snapshot.record("u1", "2026-08");
        snapshot.record("u1", "2026-09");
        snapshot.record("u2", "2026-08");

        assert_eq!(snapshot.count("u1", "2026-08"), 2);
        assert_eq!(snapshot.count("u1", "2026-09"), 1);
        assert_eq!(snapshot.count("u2", "2026-08"), 1);
        assert_eq!(snapshot.count("u2", "2026-09"), 0);
    }

    #[test]
    fn test_serialized_layout_matches_billing_document() -> anyhow::Result<()> {
        let mut snapshot = UsageSnapshot::default();
        snapshot.record("u1", "2026-08");
        snapshot.pro_users.insert("u2".to_string(), true);

        let value = serde_json::to_value(&snapshot)?;
        assert_eq!(value["usage"]["u1"]["2026-08"], 1);
        assert_eq!(value["proUsers"]["u2"], true);

        let parsed: UsageSnapshot = serde_json::from_value(value)?;
        assert_eq!(parsed, snapshot);
        Ok(())
    }

    #[test]
    fn test_month_key_shape() {
        let key = current_month_key();
        assert_eq!(key.len(), 7);
        assert_eq!(&key[4..5], "-");
    }
}
