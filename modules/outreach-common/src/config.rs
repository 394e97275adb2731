use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{OutreachError, Result};

/// Which identifier collapses repeated page scrapes into one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupKey {
    /// The page's own `page_id`.
    #[default]
    PageId,
    /// `raw_data.pageAdLibrary.id`. Pages without it are dropped.
    AdLibraryId,
}

impl FromStr for DedupKey {
    type Err = OutreachError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "page_id" => Ok(DedupKey::PageId),
            "ad_library_id" => Ok(DedupKey::AdLibraryId),
            other => Err(OutreachError::Config(format!(
                "PAGE_DEDUP_KEY must be `page_id` or `ad_library_id`, got `{other}`"
            ))),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::PageId => write!(f, "page_id"),
            DedupKey::AdLibraryId => write!(f, "ad_library_id"),
        }
    }
}

/// Prospect-building configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub user_id: String,
    pub dedup_key: DedupKey,
    /// Used when a scraped page carries no contact email.
    pub fallback_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            dedup_key: DedupKey::default(),
            fallback_email: None,
        }
    }
}

pub const DEFAULT_USER_ID: &str = "default_user";

impl Config {
    pub fn from_env() -> Result<Self> {
        let dedup_key = match env::var("PAGE_DEDUP_KEY") {
            Ok(raw) => raw.parse()?,
            Err(_) => DedupKey::default(),
        };

        Ok(Self {
            user_id: env::var("OUTREACH_USER_ID").unwrap_or_else(|_| DEFAULT_USER_ID.to_string()),
            dedup_key,
            fallback_email: optional_env("FALLBACK_EMAIL"),
        })
    }

    /// Log the effective configuration with the fallback address masked.
    pub fn log_redacted(&self) {
        let fallback_email = self
            .fallback_email
            .as_deref()
            .map(redact_email)
            .unwrap_or_else(|| "(none)".to_string());

        tracing::info!(
            user_id = self.user_id.as_str(),
            dedup_key = %self.dedup_key,
            fallback_email = fallback_email.as_str(),
            "Config loaded"
        );
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}
