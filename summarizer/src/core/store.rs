//! Concurrency-safe aggregate store keyed by region
//!
//! Every valid region is seeded with zeroed totals before processing starts,
//! so folds never have to distinguish a missing key from a zero count. Each
//! region guards its totals with its own lock: folds on the same region
//! serialize, folds on different regions run fully in parallel, and the
//! outer map never changes after seeding.

use crate::error::{EngineError, EngineResult};
use shared::RegionCode;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Running totals for one region.
///
/// All fields start at zero and only ever increase for the lifetime of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegionTotals {
    pub headcount: u64,
    pub overweight_headcount: u64,
    pub height_total: u64,
    pub weight_total: u64,
    pub bmi_total: f64,
}

impl RegionTotals {
    /// Fold one measured record into the totals, returning the new value
    pub fn with_measurement(self, height: u64, weight: u64, bmi: f64, overweight: bool) -> Self {
        Self {
            headcount: self.headcount + 1,
            overweight_headcount: self.overweight_headcount + u64::from(overweight),
            height_total: self.height_total + height,
            weight_total: self.weight_total + weight,
            bmi_total: self.bmi_total + bmi,
        }
    }
}

/// Shared aggregate keyed by region code
pub struct AggregateStore {
    regions: HashMap<RegionCode, Mutex<RegionTotals>>,
}

impl AggregateStore {
    /// Seed the store with every valid region, all totals zeroed.
    ///
    /// Constructing the store is the seeding step, so it necessarily runs
    /// exactly once and before any fold.
    pub fn seed<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RegionCode>,
    {
        let regions = regions
            .into_iter()
            .map(|region| (region.into(), Mutex::new(RegionTotals::default())))
            .collect();
        Self { regions }
    }

    /// Atomically apply `update` to one region's totals.
    ///
    /// The update function must be pure; it runs under the region's lock.
    pub fn fold<F>(&self, region: &str, update: F) -> EngineResult<()>
    where
        F: FnOnce(RegionTotals) -> RegionTotals,
    {
        let slot = self.regions.get(region).ok_or_else(|| EngineError::UnknownRegion {
            region: region.to_string(),
        })?;
        let mut totals = slot.lock().unwrap_or_else(PoisonError::into_inner);
        *totals = update(*totals);
        Ok(())
    }

    /// Read the whole aggregate, sorted by region code ascending.
    ///
    /// Only meaningful once all folds have completed; the pipeline driver's
    /// barrier enforces that, not the store.
    pub fn snapshot(&self) -> Vec<(RegionCode, RegionTotals)> {
        let mut entries: Vec<_> = self
            .regions
            .iter()
            .map(|(region, slot)| {
                let totals = slot.lock().unwrap_or_else(PoisonError::into_inner);
                (region.clone(), *totals)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn contains(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_seeded_regions_start_at_zero() {
        let store = AggregateStore::seed(["CA", "NY"]);
        assert_eq!(store.region_count(), 2);
        assert!(store.contains("CA"));
        assert!(!store.contains("TX"));

        for (_, totals) in store.snapshot() {
            assert_eq!(totals, RegionTotals::default());
        }
    }

    #[test]
    fn test_fold_accumulates() {
        let store = AggregateStore::seed(["CA"]);
        store
            .fold("CA", |t| t.with_measurement(70, 160, 22.9, false))
            .unwrap();
        store
            .fold("CA", |t| t.with_measurement(65, 200, 33.3, true))
            .unwrap();

        let snapshot = store.snapshot();
        let (_, totals) = &snapshot[0];
        assert_eq!(totals.headcount, 2);
        assert_eq!(totals.overweight_headcount, 1);
        assert_eq!(totals.height_total, 135);
        assert_eq!(totals.weight_total, 360);
        assert!((totals.bmi_total - 56.2).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_region_fails() {
        let store = AggregateStore::seed(["CA"]);
        let err = store.fold("ZZ", |t| t).unwrap_err();
        assert!(matches!(err, EngineError::UnknownRegion { region } if region == "ZZ"));
    }

    #[test]
    fn test_snapshot_sorted_regardless_of_fold_order() {
        let store = AggregateStore::seed(["NY", "AK", "TX", "CA"]);
        for region in ["TX", "AK", "NY", "CA"] {
            store
                .fold(region, |t| t.with_measurement(70, 160, 22.9, false))
                .unwrap();
        }

        let regions: Vec<_> = store.snapshot().into_iter().map(|(r, _)| r).collect();
        assert_eq!(regions, vec!["AK", "CA", "NY", "TX"]);
    }

    #[tokio::test]
    async fn test_concurrent_folds_never_lose_updates() {
        let store = Arc::new(AggregateStore::seed(["CA", "NY"]));

        let mut handles = Vec::new();
        for worker in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let region = if worker % 2 == 0 { "CA" } else { "NY" };
                for _ in 0..250 {
                    store
                        .fold(region, |t| t.with_measurement(70, 160, 23.0, worker == 0))
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = store.snapshot();
        let ca = &snapshot.iter().find(|(r, _)| r == "CA").unwrap().1;
        let ny = &snapshot.iter().find(|(r, _)| r == "NY").unwrap().1;
        assert_eq!(ca.headcount, 1000);
        assert_eq!(ny.headcount, 1000);
        assert_eq!(ca.overweight_headcount, 250);
        assert_eq!(ny.overweight_headcount, 0);
        assert_eq!(ca.height_total, 70_000);
    }
}
