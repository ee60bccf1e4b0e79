//! Service implementations
//!
//! In-memory implementations of the record source and sink traits, used
//! when embedding the engine and throughout the test suites.

pub mod memory_sink;
pub mod memory_source;

pub use memory_sink::MemorySink;
pub use memory_source::MemorySource;
