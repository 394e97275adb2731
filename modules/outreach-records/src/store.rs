//! RecordStore — the read/append seam every pipeline stage depends on.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use outreach_common::PipelineSession;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{AppendRecord, Record, StoredRecord};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append one record. The store assigns `seq` and `ts`.
    async fn append(&self, record: AppendRecord) -> Result<StoredRecord>;

    /// All records appended for `user_id` up to this call, in append order.
    async fn records_for(&self, user_id: &str) -> Result<Vec<StoredRecord>>;

    /// Records for one pipeline run of `user_id`, in append order.
    async fn records_for_run(&self, user_id: &str, run_id: &str) -> Result<Vec<StoredRecord>> {
        Ok(self
            .records_for(user_id)
            .await?
            .into_iter()
            .filter(|r| r.run_id.as_deref() == Some(run_id))
            .collect())
    }

    /// Latest snapshot of each session for `user_id`, in first-seen order.
    async fn sessions_for(&self, user_id: &str) -> Result<Vec<PipelineSession>> {
        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, PipelineSession> = HashMap::new();

        for stored in self.records_for(user_id).await? {
            if let Record::Session(session) = stored.record {
                if !latest.contains_key(&session.id) {
                    order.push(session.id.clone());
                }
                latest.insert(session.id.clone(), session);
            }
        }

        Ok(order
            .into_iter()
            .filter_map(|id| latest.remove(&id))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryRecordStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Log {
    next_seq: u64,
    records: Vec<StoredRecord>,
}

/// In-process record log. Clones share the same underlying log.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Log>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn append(&self, record: AppendRecord) -> Result<StoredRecord> {
        let mut log = self.inner.write().await;
        log.next_seq += 1;

        let stored = StoredRecord {
            seq: log.next_seq,
            ts: Utc::now(),
            user_id: record.user_id,
            run_id: record.run_id,
            record: record.record,
        };
        debug!(
            seq = stored.seq,
            user_id = stored.user_id.as_str(),
            kind = stored.record.kind(),
            "Record appended"
        );

        log.records.push(stored.clone());
        Ok(stored)
    }

    async fn records_for(&self, user_id: &str) -> Result<Vec<StoredRecord>> {
        let log = self.inner.read().await;
        Ok(log
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outreach_common::{PageProfile, PipelineStatus};

    fn page(id: &str) -> Record {
        Record::Page(PageProfile {
            page_id: id.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn append_assigns_increasing_seq() {
        let store = MemoryRecordStore::new();
        let a = store.append(AppendRecord::new("u1", page("p1"))).await.unwrap();
        let b = store.append(AppendRecord::new("u1", page("p2"))).await.unwrap();
        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn records_for_filters_by_user_in_append_order() {
        let store = MemoryRecordStore::new();
        store.append(AppendRecord::new("u1", page("p1"))).await.unwrap();
        store.append(AppendRecord::new("u2", page("p2"))).await.unwrap();
        store.append(AppendRecord::new("u1", page("p3"))).await.unwrap();

        let records = store.records_for("u1").await.unwrap();
        let ids: Vec<_> = records
            .iter()
            .map(|r| match &r.record {
                Record::Page(p) => p.page_id.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        assert!(store.records_for("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_for_run_filters_by_run_id() {
        let store = MemoryRecordStore::new();
        store
            .append(AppendRecord::new("u1", page("p1")).with_run_id("r1"))
            .await
            .unwrap();
        store
            .append(AppendRecord::new("u1", page("p2")).with_run_id("r2"))
            .await
            .unwrap();
        store.append(AppendRecord::new("u1", page("p3"))).await.unwrap();

        let run = store.records_for_run("u1", "r1").await.unwrap();
        assert_eq!(run.len(), 1);
        assert_eq!(run[0].run_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn sessions_for_returns_latest_snapshot() {
        let store = MemoryRecordStore::new();
        let mut session = PipelineSession::start();
        store
            .append(AppendRecord::new("u1", Record::Session(session.clone())))
            .await
            .unwrap();

        session.status = PipelineStatus::Completed;
        session.success_count = 3;
        store
            .append(AppendRecord::new("u1", Record::Session(session.clone())))
            .await
            .unwrap();

        let sessions = store.sessions_for("u1").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].status, PipelineStatus::Completed);
        assert_eq!(sessions[0].success_count, 3);
    }

    #[tokio::test]
    async fn clones_share_the_log() {
        let store = MemoryRecordStore::new();
        let other = store.clone();
        other.append(AppendRecord::new("u1", page("p1"))).await.unwrap();
        assert!(!store.is_empty().await);
    }

    #[test]
    fn record_serializes_with_kind_tag() {
        let value = serde_json::to_value(page("p1")).unwrap();
        assert_eq!(value["kind"], "page");
        assert_eq!(value["page_id"], "p1");

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, page("p1"));
    }
}
