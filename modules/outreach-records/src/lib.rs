//! Append-only, user-tagged record log for the outreach pipeline.
//!
//! Every scrape result, ads fetch, log line and pitch is appended as a tagged
//! `Record`. Readers pull everything for a user and pick the kinds they care
//! about; nothing is ever updated in place.

pub mod session;
pub mod store;
pub mod types;

pub use session::PipelineRun;
pub use store::{MemoryRecordStore, RecordStore};
pub use types::{AppendRecord, Record, StoredRecord};
