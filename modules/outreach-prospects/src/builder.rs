//! Prospect Builder — joins deduplicated pages with their correlated ads.
//!
//! `assemble_prospects` is the pure core: no I/O, no locking, single pass.
//! `ProspectBuilder` wraps it with the record-store fetch.

use std::sync::Arc;

use anyhow::Result;
use outreach_common::{AdRecord, Config, DedupKey, PageProfile, ProspectContext};
use outreach_records::{Record, RecordStore, StoredRecord};
use serde::Serialize;
use tracing::{debug, info};

use crate::correlate::correlate;
use crate::dedupe::dedupe;
use crate::transform::to_prospect_context;

#[derive(Debug, Clone, Default)]
pub struct ProspectOptions {
    pub dedup_key: DedupKey,
    pub fallback_email: Option<String>,
}

impl From<&Config> for ProspectOptions {
    fn from(config: &Config) -> Self {
        Self {
            dedup_key: config.dedup_key,
            fallback_email: config.fallback_email.clone(),
        }
    }
}

/// Counters from one assembly pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProspectStats {
    pub pages_seen: usize,
    pub unique_pages: usize,
    pub ads_seen: usize,
    pub ads_correlated: usize,
    pub pages_without_ads: usize,
    pub rejected_invalid: usize,
}

#[derive(Debug, Clone)]
pub struct ProspectBuild {
    pub prospects: Vec<ProspectContext>,
    pub stats: ProspectStats,
}

/// Split stored records into pages and a flat list of ads.
/// Batches are flattened; sessions, logs and pitches are ignored.
pub fn partition_records(records: &[StoredRecord]) -> (Vec<&PageProfile>, Vec<&AdRecord>) {
    let mut pages = Vec::new();
    let mut ads = Vec::new();

    for stored in records {
        match &stored.record {
            Record::Page(page) => pages.push(page),
            Record::Ad(ad) => ads.push(ad),
            Record::AdBatch(batch) => ads.extend(batch.ads.iter()),
            Record::Session(_) | Record::Log(_) | Record::Pitch(_) => {}
        }
    }

    (pages, ads)
}

/// One prospect per (page, matched ad) that passes the outreach gate.
/// Pages come out in first-seen order, ads in correlation order.
pub fn assemble_prospects(records: &[StoredRecord], options: &ProspectOptions) -> ProspectBuild {
    let (pages, ads) = partition_records(records);
    let ad_map = correlate(ads.iter().copied());
    let unique_pages = dedupe(pages.iter().copied(), options.dedup_key);

    let mut stats = ProspectStats {
        pages_seen: pages.len(),
        unique_pages: unique_pages.len(),
        ads_seen: ads.len(),
        ads_correlated: ad_map.values().map(Vec::len).sum(),
        ..Default::default()
    };
    let mut prospects = Vec::new();

    for (page_id, page) in unique_pages.iter() {
        let matched_ads = match ad_map.get(page_id) {
            Some(matched) if !matched.is_empty() => matched,
            _ => {
                debug!(page_id, "No ads found for page");
                stats.pages_without_ads += 1;
                continue;
            }
        };

        for ad in matched_ads {
            let prospect = to_prospect_context(page, Some(ad), options.fallback_email.as_deref());
            if prospect.is_valid_for_outreach() {
                prospects.push(prospect);
            } else {
                debug!(page_id, ad_id = ad.ad_id.as_str(), "Prospect lacks outreach data, dropping");
                stats.rejected_invalid += 1;
            }
        }
    }

    ProspectBuild { prospects, stats }
}

/// Builds prospects for a user from whatever the record store holds.
#[derive(Clone)]
pub struct ProspectBuilder {
    store: Arc<dyn RecordStore>,
    options: ProspectOptions,
}

impl ProspectBuilder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            options: ProspectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProspectOptions) -> Self {
        self.options = options;
        self
    }

    /// Only a record-store failure is an error; bad records are filtered out.
    pub async fn build_prospects(&self, user_id: &str) -> Result<Vec<ProspectContext>> {
        Ok(self.build_with_stats(user_id).await?.prospects)
    }

    pub async fn build_with_stats(&self, user_id: &str) -> Result<ProspectBuild> {
        let records = self.store.records_for(user_id).await?;
        let build = assemble_prospects(&records, &self.options);

        info!(
            user_id,
            records = records.len(),
            pages = build.stats.pages_seen,
            unique_pages = build.stats.unique_pages,
            ads = build.stats.ads_seen,
            pages_without_ads = build.stats.pages_without_ads,
            rejected = build.stats.rejected_invalid,
            prospects = build.prospects.len(),
            "Prospects built"
        );

        Ok(build)
    }
}
