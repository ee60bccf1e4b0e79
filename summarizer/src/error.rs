//! Engine-specific error types
//!
//! Every fault is terminal for the run: the pipeline never skips a bad unit
//! and continues.

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("record {rec_no} could not be decoded")]
    RecordDecode {
        rec_no: u64,
        #[source]
        source: SharedError,
    },

    #[error("record references unseeded region: {region}")]
    UnknownRegion { region: String },

    #[error("computation failed on record {rec_no}: {message}")]
    Computation { rec_no: u64, message: String },

    #[error("illegal pipeline state transition: {from} -> {to}")]
    OrderingViolation { from: String, to: String },

    #[error("record source failed: {message}")]
    SourceFailed { message: String },

    #[error("record sink failed: {message}")]
    SinkFailed { message: String },

    #[error("worker task failed: {message}")]
    Worker { message: String },

    #[error("shared component error")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
