//! Trait seams to the engine's external collaborators
//!
//! The record source and sink are injected into the pipeline. Mock
//! implementations are generated with mockall for testing.

use crate::error::EngineResult;
use shared::{RawRecord, RegionSummary};

/// Ordered stream of intake records
#[mockall::automock]
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Next record in intake order; `None` once the source is depleted.
    ///
    /// An error fails the whole run — there is no skip-and-continue.
    async fn next_record(&mut self) -> EngineResult<Option<RawRecord>>;
}

/// Destination for emitted region summaries
#[mockall::automock]
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Accept the summaries produced by the trailing summary unit,
    /// ordered by region code ascending.
    async fn accept_summaries(&mut self, summaries: Vec<RegionSummary>) -> EngineResult<()>;
}
