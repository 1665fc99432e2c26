use std::collections::{BTreeSet, HashSet};

use super::domain::CriteriaId;

/// Resolves whether a criteria id names a known criteria document.
pub trait CriteriaLookup {
    fn contains(&self, criteria_id: &str) -> bool;
}

impl CriteriaLookup for BTreeSet<CriteriaId> {
    fn contains(&self, criteria_id: &str) -> bool {
        BTreeSet::contains(self, criteria_id)
    }
}

impl CriteriaLookup for HashSet<CriteriaId> {
    fn contains(&self, criteria_id: &str) -> bool {
        HashSet::contains(self, criteria_id)
    }
}

impl CriteriaLookup for [&str] {
    fn contains(&self, criteria_id: &str) -> bool {
        self.iter().any(|known| *known == criteria_id)
    }
}

impl<T: CriteriaLookup + ?Sized> CriteriaLookup for &T {
    fn contains(&self, criteria_id: &str) -> bool {
        (**self).contains(criteria_id)
    }
}
