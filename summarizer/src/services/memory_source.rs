//! In-memory record source

use crate::error::EngineResult;
use crate::traits::RecordSource;
use shared::RawRecord;
use std::collections::VecDeque;

/// Record source backed by an in-memory queue, yielding records in order
pub struct MemorySource {
    records: VecDeque<RawRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

#[async_trait::async_trait]
impl RecordSource for MemorySource {
    async fn next_record(&mut self) -> EngineResult<Option<RawRecord>> {
        Ok(self.records.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_yields_records_in_order_then_depletes() {
        let mut source = MemorySource::new(vec![RawRecord::new(1), RawRecord::new(2)]);
        assert_eq!(source.remaining(), 2);

        assert_eq!(source.next_record().await.unwrap().unwrap().rec_no, 1);
        assert_eq!(source.next_record().await.unwrap().unwrap().rec_no, 2);
        assert!(source.next_record().await.unwrap().is_none());
    }
}
