//! Pipeline driver
//!
//! Feeds units of work to the processor with bounded concurrency and
//! guarantees the trailing summary unit runs strictly after every regular
//! unit has completed and folded. The join on the worker pool is the
//! barrier that enforces the ordering; it is structural, not scheduled.

use crate::core::{AggregateStore, UnitProcessor, WorkUnit};
use crate::error::{EngineError, EngineResult};
use crate::traits::{RecordSink, RecordSource};
use chrono::{Local, NaiveDate};
use shared::{RawRecord, RegionCode, US_REGIONS};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Number of concurrent workers folding regular units
    pub concurrency: usize,
    /// Region codes seeded into the aggregate before processing starts
    pub regions: Vec<RegionCode>,
    /// Date ages are computed against; defaults to today
    pub as_of: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            regions: US_REGIONS.iter().map(|region| region.to_string()).collect(),
            as_of: None,
        }
    }
}

/// Lifecycle states of one pipeline run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Seeding,
    Running,
    Finalizing,
    Done,
    Faulted,
}

impl PipelineState {
    /// Whether `next` is a legal successor of this state.
    ///
    /// The happy path is strictly Seeding -> Running -> Finalizing -> Done;
    /// Faulted is reachable from every non-terminal state.
    pub fn can_transition(self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Seeding, Running) | (Running, Finalizing) | (Finalizing, Done) => true,
            (Done, _) | (Faulted, _) => false,
            (_, Faulted) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Seeding => "seeding",
            PipelineState::Running => "running",
            PipelineState::Finalizing => "finalizing",
            PipelineState::Done => "done",
            PipelineState::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Terminal status of one pipeline run
#[derive(Debug)]
pub enum RunStatus {
    /// Intake depleted and the summary records were forwarded downstream
    Completed,
    /// The run aborted; no summary records were emitted
    Faulted(EngineError),
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

/// Report produced at the end of a run
#[derive(Debug)]
pub struct RunReport {
    pub status: RunStatus,
    /// Regular units pulled from the record source
    pub units_read: u64,
    /// Regular units successfully folded into the aggregate
    pub units_folded: u64,
    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

/// Drives units of work through the processor with bounded concurrency
pub struct Pipeline<S, K>
where
    S: RecordSource,
    K: RecordSink,
{
    config: PipelineConfig,
    source: S,
    sink: K,
    state: PipelineState,
}

impl<S, K> Pipeline<S, K>
where
    S: RecordSource,
    K: RecordSink,
{
    /// Create a pipeline over injected source and sink collaborators
    pub fn new(config: PipelineConfig, source: S, sink: K) -> Self {
        Self {
            config,
            source,
            sink,
            state: PipelineState::Seeding,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the pipeline to completion and report the outcome.
    ///
    /// Every fault is terminal: remaining in-flight units are cancelled and
    /// the summary unit never runs.
    pub async fn run(mut self) -> RunReport {
        let started = Instant::now();
        let units_read = Arc::new(AtomicU64::new(0));
        let units_folded = Arc::new(AtomicU64::new(0));

        let status = match self.execute(&units_read, &units_folded).await {
            Ok(()) => RunStatus::Completed,
            Err(fault) => {
                self.state = PipelineState::Faulted;
                error!(%fault, "pipeline run faulted");
                RunStatus::Faulted(fault)
            }
        };

        let report = RunReport {
            status,
            units_read: units_read.load(Ordering::Relaxed),
            units_folded: units_folded.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
        };
        info!(
            units_read = report.units_read,
            units_folded = report.units_folded,
            elapsed_ms = report.elapsed.as_millis() as u64,
            completed = report.status.is_completed(),
            "pipeline run finished"
        );
        report
    }

    async fn execute(&mut self, units_read: &Arc<AtomicU64>, units_folded: &Arc<AtomicU64>) -> EngineResult<()> {
        debug!(regions = self.config.regions.len(), "seeding aggregate store");
        let store = Arc::new(AggregateStore::seed(self.config.regions.clone()));
        let as_of = self.config.as_of.unwrap_or_else(|| Local::now().date_naive());
        let processor = UnitProcessor::new(Arc::clone(&store), as_of);
        self.transition(PipelineState::Running)?;

        let concurrency = self.config.concurrency.max(1);
        let (tx, rx) = mpsc::channel::<RawRecord>(concurrency * 2);
        let rx = Arc::new(Mutex::new(rx));
        let abort = Arc::new(AtomicBool::new(false));
        let first_fault: Arc<Mutex<Option<EngineError>>> = Arc::new(Mutex::new(None));

        let mut workers = Vec::with_capacity(concurrency);
        for worker_id in 0..concurrency {
            let rx = Arc::clone(&rx);
            let abort = Arc::clone(&abort);
            let first_fault = Arc::clone(&first_fault);
            let units_folded = Arc::clone(units_folded);
            let processor = processor.clone();
            workers.push(tokio::spawn(async move {
                loop {
                    let record = { rx.lock().await.recv().await };
                    let Some(record) = record else { break };
                    // After a fault, keep draining so the intake never stalls
                    // on a full channel, but process nothing further.
                    if abort.load(Ordering::Relaxed) {
                        continue;
                    }
                    let rec_no = record.rec_no;
                    match processor.process(&WorkUnit::Regular(record)) {
                        Ok(_) => {
                            units_folded.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(fault) => {
                            error!(worker_id, rec_no, %fault, "regular unit failed, aborting run");
                            abort.store(true, Ordering::Relaxed);
                            let mut slot = first_fault.lock().await;
                            if slot.is_none() {
                                *slot = Some(fault);
                            }
                        }
                    }
                }
            }));
        }

        // Intake loop: dispatch regular units until the source is depleted
        // or the run aborts.
        let read_result = loop {
            if abort.load(Ordering::Relaxed) {
                break Ok(());
            }
            match self.source.next_record().await {
                Ok(Some(record)) => {
                    units_read.fetch_add(1, Ordering::Relaxed);
                    if tx.send(record).await.is_err() {
                        break Ok(());
                    }
                }
                Ok(None) => break Ok(()),
                Err(fault) => {
                    abort.store(true, Ordering::Relaxed);
                    break Err(fault);
                }
            }
        };
        drop(tx);

        // Barrier: the summary unit is dispatched only after every worker
        // has drained and joined.
        for worker in workers {
            if let Err(join_err) = worker.await {
                let mut slot = first_fault.lock().await;
                if slot.is_none() {
                    *slot = Some(EngineError::Worker {
                        message: join_err.to_string(),
                    });
                }
            }
        }

        read_result?;
        if let Some(fault) = first_fault.lock().await.take() {
            return Err(fault);
        }

        self.transition(PipelineState::Finalizing)?;
        debug!(
            units_folded = units_folded.load(Ordering::Relaxed),
            "all regular units folded, dispatching summary unit"
        );
        let summaries = processor.process(&WorkUnit::Summary)?;
        info!(regions = summaries.len(), "📊 summary unit emitted");
        self.sink.accept_summaries(summaries).await?;
        self.transition(PipelineState::Done)?;
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) -> EngineResult<()> {
        if !self.state.can_transition(next) {
            return Err(EngineError::OrderingViolation {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(from = %self.state, to = %next, "pipeline state transition");
        self.state = next;
        Ok(())
    }
}
