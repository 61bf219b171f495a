use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::registry::ContractKind;

/// Session-scoped record of every contract deployed through the harness.
///
/// Instances are kept per kind in deployment order; the most recent instance
/// is the last one appended. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct DeploymentHistory {
    inner: Arc<Mutex<HashMap<ContractKind, Vec<Address>>>>,
}

impl DeploymentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ContractKind, Vec<Address>>> {
        // The map is always left consistent, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a freshly deployed instance
    pub fn record(&self, kind: ContractKind, address: Address) {
        self.lock().entry(kind).or_default().push(address);
    }

    /// Most recently deployed instance of `kind`
    pub fn latest(&self, kind: ContractKind) -> Option<Address> {
        self.lock().get(&kind).and_then(|v| v.last().copied())
    }

    /// Number of deployed instances of `kind`
    pub fn count(&self, kind: ContractKind) -> usize {
        self.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Whether `kind` has been deployed this session
    pub fn contains(&self, kind: ContractKind) -> bool {
        self.count(kind) > 0
    }

    /// All instances of `kind`, oldest first
    pub fn instances(&self, kind: ContractKind) -> Vec<Address> {
        self.lock().get(&kind).cloned().unwrap_or_default()
    }

    /// Total number of deployments across all kinds
    pub fn total(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_is_last_appended() {
        let history = DeploymentHistory::new();
        let first = Address::repeat_byte(1);
        let second = Address::repeat_byte(2);

        assert_eq!(history.latest(ContractKind::MockDai), None);
        history.record(ContractKind::MockDai, first);
        history.record(ContractKind::MockDai, second);

        assert_eq!(history.latest(ContractKind::MockDai), Some(second));
        assert_eq!(history.instances(ContractKind::MockDai), vec![first, second]);
        assert_eq!(history.count(ContractKind::MockWeth), 0);
    }

    #[test]
    fn clones_share_the_record() {
        let history = DeploymentHistory::new();
        let view = history.clone();
        history.record(ContractKind::TokenFarm, Address::repeat_byte(7));
        assert!(view.contains(ContractKind::TokenFarm));
        assert_eq!(view.total(), 1);
    }
}
