use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Scraped page profiles ---

/// Rating block of a scraped page. Apify returns either a structured object
/// or a bare display string; both land here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRating {
    pub text: Option<String>,
    pub overall: Option<String>,
    pub count: u64,
}

/// One Facebook page as scraped by the Apify pages actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageProfile {
    /// Correlation key. Empty when the scrape did not carry one.
    pub page_id: String,
    pub facebook_id: Option<String>,
    pub page_name: Option<String>,
    pub title: Option<String>,

    pub facebook_url: Option<String>,
    pub page_url: Option<String>,
    pub profile_picture_url: Option<String>,
    pub cover_photo_url: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address_url: Option<String>,
    #[serde(default)]
    pub websites: Vec<String>,

    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub followings: u64,

    pub category: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub intro: Option<String>,
    #[serde(default)]
    pub info: Vec<String>,
    pub creation_date: Option<String>,

    #[serde(default)]
    pub rating: PageRating,

    pub ad_status: Option<String>,
    pub is_business_page_active: Option<bool>,

    /// The full scraped item, untouched.
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

impl PageProfile {
    /// The ad-library id nested at `raw_data.pageAdLibrary.id`, if the scrape had one.
    pub fn ad_library_id(&self) -> Option<&str> {
        self.raw_data
            .get("pageAdLibrary")?
            .get("id")?
            .as_str()
            .filter(|id| !id.is_empty())
    }
}

// --- Ads archive ---

/// One advertisement from the Graph API ads archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    /// Pipeline run that fetched this ad.
    pub session_id: String,
    pub ad_id: String,
    pub page_id: Option<String>,
    pub page_name: Option<String>,

    #[serde(default)]
    pub creative_bodies: Vec<String>,
    #[serde(default)]
    pub link_titles: Vec<String>,
    #[serde(default)]
    pub link_descriptions: Vec<String>,
    #[serde(default)]
    pub link_captions: Vec<String>,

    pub ad_snapshot_url: Option<String>,

    #[serde(default)]
    pub raw_data: serde_json::Value,
}

impl AdRecord {
    /// The promoted page id, treating an empty string as absent.
    pub fn correlation_key(&self) -> Option<&str> {
        self.page_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdsPaging {
    pub after_cursor: Option<String>,
    pub next_url: Option<String>,
}

/// Result of one ads-archive fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdBatch {
    #[serde(default)]
    pub ads: Vec<AdRecord>,
    pub paging: Option<AdsPaging>,
}

impl AdBatch {
    pub fn single(ad: AdRecord) -> Self {
        Self {
            ads: vec![ad],
            paging: None,
        }
    }
}

// --- Prospects ---

/// Originals a prospect was merged from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProspectRawData {
    pub page: serde_json::Value,
    pub ad: serde_json::Value,
}

/// Merged view of one page and at most one of its ads, ready for pitch generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProspectContext {
    pub page_name: String,
    pub email: String,

    pub company: String,
    pub category: String,

    pub business_description: String,
    pub intro: String,

    pub followers: u64,
    pub likes: u64,

    pub website: String,
    pub address: String,
    pub phone: String,

    pub ad_creative_text: String,
    pub ad_title: String,
    pub ad_url: String,
    pub ad_snapshot_url: String,

    pub page_id: String,
    pub page_url: String,
    pub creation_date: String,
    #[serde(default)]
    pub tags: Vec<String>,

    pub raw_data: ProspectRawData,
    pub scraped_at: DateTime<Utc>,
}

impl ProspectContext {
    /// Named, reachable by email, and has something to personalize against.
    pub fn is_valid_for_outreach(&self) -> bool {
        !self.page_name.is_empty()
            && !self.email.is_empty()
            && self.email.contains('@')
            && (!self.business_description.is_empty() || !self.intro.is_empty())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({}) - {} followers - {}",
            self.page_name, self.category, self.followers, self.email
        )
    }
}

// --- Pipeline bookkeeping ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

/// One execution of the outreach pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSession {
    pub id: String,
    pub status: PipelineStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_processed: u32,
    pub success_count: u32,
    pub failed_count: u32,
    pub skipped_count: u32,
    pub error_details: Option<String>,
}

impl PipelineSession {
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: PipelineStatus::Started,
            start_time: Utc::now(),
            end_time: None,
            total_processed: 0,
            success_count: 0,
            failed_count: 0,
            skipped_count: 0,
            error_details: None,
        }
    }
}

/// Structured log line for a single pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineLogEntry {
    pub session_id: String,
    pub step_name: String,
    pub status: String,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// A generated pitch, as handed back by the pitch stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRecord {
    pub session_id: String,
    pub page_id: String,
    pub email: Option<String>,
    pub pitch_content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
