//! Schema-free log records and their normalization

mod normalizer;
mod record;

pub use normalizer::{flatten_record, normalize, NormalizedLogs};
pub use record::{InputFormat, NormalizedLogEntry, RawLogRecord};
