//! Admission policy that admits everything.

use crate::traits::AdmissionPolicy;

/// Stateless admission policy: every candidate is admitted and every
/// replacement is approved. Pairs with eviction policies that do the real
/// ranking work.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAdmit;

impl<K, V> AdmissionPolicy<K, V> for AlwaysAdmit {
    fn should_add(&self, _candidate: &K) -> bool {
        true
    }

    fn should_replace(&self, _victim: &K, _candidate: &K) -> bool {
        true
    }
}
