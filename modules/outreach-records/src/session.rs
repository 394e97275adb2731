//! PipelineRun — one tagged execution of the outreach pipeline.
//!
//! Every record written through a run carries its `run_id`. Step logs are
//! appended as `PipelineLogEntry` records and mirrored to tracing. The session
//! itself is append-only: `finish` writes a final snapshot rather than
//! mutating the first one.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use outreach_common::ingest::{ad_batch_from_response, ad_from_archive_item, pages_from_dataset};
use outreach_common::{
    AdBatch, PipelineLogEntry, PipelineSession, PipelineStatus, PitchRecord,
};

use crate::store::RecordStore;
use crate::types::{AppendRecord, Record};

pub struct PipelineRun {
    store: Arc<dyn RecordStore>,
    user_id: String,
    session: PipelineSession,
}

impl PipelineRun {
    /// Open a session for `user_id` and record its start.
    pub async fn start(store: Arc<dyn RecordStore>, user_id: impl Into<String>) -> Result<Self> {
        let run = Self {
            store,
            user_id: user_id.into(),
            session: PipelineSession::start(),
        };

        run.append(Record::Session(run.session.clone())).await?;
        run.log_step("pipeline_init", "started", "Pipeline session started", None)
            .await?;
        Ok(run)
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session(&self) -> &PipelineSession {
        &self.session
    }

    async fn append(&self, record: Record) -> Result<()> {
        self.store
            .append(AppendRecord::new(&self.user_id, record).with_run_id(&self.session.id))
            .await?;
        Ok(())
    }

    pub async fn log_step(
        &self,
        step_name: &str,
        status: &str,
        message: &str,
        details: Option<Value>,
    ) -> Result<()> {
        info!(
            session_id = self.session.id.as_str(),
            step = step_name,
            status,
            "{message}"
        );

        self.append(Record::Log(PipelineLogEntry {
            session_id: self.session.id.clone(),
            step_name: step_name.to_string(),
            status: status.to_string(),
            message: (!message.is_empty()).then(|| message.to_string()),
            details,
            timestamp: Utc::now(),
        }))
        .await
    }

    /// Store one ads-archive ad object as a single-ad batch.
    pub async fn save_ad(&self, ad: Value) -> Result<()> {
        let ad = ad_from_archive_item(ad, &self.session.id)?;
        self.append(Record::AdBatch(AdBatch::single(ad))).await
    }

    /// Store a full ads-archive response as one batch. Returns the number of ads.
    pub async fn save_ads_response(&self, response: Value) -> Result<usize> {
        let batch = ad_batch_from_response(response, &self.session.id)?;
        let count = batch.ads.len();
        self.append(Record::AdBatch(batch)).await?;
        Ok(count)
    }

    /// Store scraped page data (one item or an array). Returns the number of pages.
    pub async fn save_pages(&self, data: Value) -> Result<usize> {
        let pages = pages_from_dataset(data)?;
        let count = pages.len();
        for page in pages {
            if page.page_id.is_empty() {
                warn!(
                    session_id = self.session.id.as_str(),
                    page_name = page.page_name.as_deref().unwrap_or(""),
                    "Scraped page has no pageId"
                );
            }
            self.append(Record::Page(page)).await?;
        }
        Ok(count)
    }

    pub async fn save_pitch(&self, page_id: &str, email: Option<&str>, content: &str) -> Result<()> {
        self.append(Record::Pitch(PitchRecord {
            session_id: self.session.id.clone(),
            page_id: page_id.to_string(),
            email: email.map(str::to_string),
            pitch_content: content.to_string(),
            status: "generated".to_string(),
            created_at: Utc::now(),
        }))
        .await
    }

    pub fn record_success(&mut self) {
        self.session.total_processed += 1;
        self.session.success_count += 1;
    }

    pub fn record_failure(&mut self) {
        self.session.total_processed += 1;
        self.session.failed_count += 1;
    }

    pub fn record_skip(&mut self) {
        self.session.total_processed += 1;
        self.session.skipped_count += 1;
    }

    /// Close the session. `error` marks the run as failed.
    pub async fn finish(mut self, error: Option<&str>) -> Result<PipelineSession> {
        match error {
            Some(message) => {
                self.log_step(
                    "pipeline_error",
                    "failed",
                    &format!("Unhandled error: {message}"),
                    None,
                )
                .await?;
                self.session.status = PipelineStatus::Failed;
                self.session.error_details = Some(message.to_string());
            }
            None => {
                self.log_step(
                    "pipeline_complete",
                    "success",
                    "Pipeline finished successfully",
                    None,
                )
                .await?;
                self.session.status = PipelineStatus::Completed;
            }
        }
        self.session.end_time = Some(Utc::now());

        self.append(Record::Session(self.session.clone())).await?;
        Ok(self.session)
    }
}
