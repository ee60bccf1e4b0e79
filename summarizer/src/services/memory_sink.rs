//! In-memory record sink

use crate::error::EngineResult;
use crate::traits::RecordSink;
use shared::RegionSummary;
use std::sync::{Arc, Mutex, PoisonError};

/// Record sink collecting summaries in memory.
///
/// Clones share the same backing store, so a caller can keep one handle,
/// hand the other to the pipeline, and read the collected summaries after
/// the run completes.
#[derive(Clone, Default)]
pub struct MemorySink {
    collected: Arc<Mutex<Vec<RegionSummary>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything accepted so far
    pub fn collected(&self) -> Vec<RegionSummary> {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl RecordSink for MemorySink {
    async fn accept_summaries(&mut self, summaries: Vec<RegionSummary>) -> EngineResult<()> {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(summaries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(region: &str) -> RegionSummary {
        RegionSummary {
            region: region.to_string(),
            total_headcount: 1,
            average_height_ft: 5,
            average_height_in: 10,
            average_weight: 160,
            average_bmi: 23.0,
            overweight_headcount: 0,
            overweight_percentage: 0,
        }
    }

    #[tokio::test]
    async fn test_clones_share_collected_summaries() {
        let handle = MemorySink::new();
        let mut sink = handle.clone();

        sink.accept_summaries(vec![summary("CA"), summary("NY")]).await.unwrap();

        let collected = handle.collected();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].region, "CA");
    }
}
