//! Record kinds held by the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use outreach_common::{
    AdBatch, AdRecord, PageProfile, PipelineLogEntry, PipelineSession, PitchRecord,
};

/// Everything the pipeline writes, discriminated when it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Page(PageProfile),
    Ad(AdRecord),
    AdBatch(AdBatch),
    Session(PipelineSession),
    Log(PipelineLogEntry),
    Pitch(PitchRecord),
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Page(_) => "page",
            Record::Ad(_) => "ad",
            Record::AdBatch(_) => "ad_batch",
            Record::Session(_) => "session",
            Record::Log(_) => "log",
            Record::Pitch(_) => "pitch",
        }
    }
}

/// A record as held by the store. Returned by all read methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub seq: u64,
    pub ts: DateTime<Utc>,
    pub user_id: String,
    pub run_id: Option<String>,
    pub record: Record,
}

/// A record to be appended. The caller builds this; the store assigns seq/ts.
#[derive(Debug, Clone)]
pub struct AppendRecord {
    pub record: Record,
    pub user_id: String,
    pub run_id: Option<String>,
}

impl AppendRecord {
    pub fn new(user_id: impl Into<String>, record: Record) -> Self {
        Self {
            record,
            user_id: user_id.into(),
            run_id: None,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
}
