//! Normalizes already-fetched scrape payloads into typed records.
//!
//! Two sources: Apify `facebook-pages-scraper` dataset items, and Graph API
//! `ads_archive` responses. Missing fields are never errors; a field with the
//! wrong JSON type fails that one item, and the batch-level functions skip it.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{OutreachError, Result};
use crate::types::{AdBatch, AdRecord, AdsPaging, PageProfile, PageRating};

// --- Apify facebook-pages-scraper ---

/// A single page item from the Apify dataset.
#[derive(Debug, Clone, Default, Deserialize)]
struct ApifyPageItem {
    #[serde(rename = "pageId")]
    page_id: Option<String>,
    #[serde(rename = "facebookId")]
    facebook_id: Option<String>,
    #[serde(rename = "pageName")]
    page_name: Option<String>,
    title: Option<String>,
    #[serde(rename = "facebookUrl")]
    facebook_url: Option<String>,
    #[serde(rename = "pageUrl")]
    page_url: Option<String>,
    #[serde(rename = "profilePictureUrl")]
    profile_picture_url: Option<String>,
    #[serde(rename = "coverPhotoUrl")]
    cover_photo_url: Option<String>,
    contact: Option<ApifyContact>,
    media: Option<ApifyMedia>,
    #[serde(rename = "pageAdLibrary")]
    page_ad_library: Option<ApifyAdLibrary>,
    websites: Option<Vec<String>>,
    likes: Option<u64>,
    followers: Option<u64>,
    followings: Option<u64>,
    category: Option<String>,
    categories: Option<Vec<String>>,
    intro: Option<String>,
    info: Option<Vec<String>>,
    creation_date: Option<String>,
    #[serde(rename = "creationDate")]
    creation_date_camel: Option<String>,
    rating: Option<ApifyRating>,
    ad_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApifyContact {
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    #[serde(rename = "addressUrl")]
    address_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApifyMedia {
    #[serde(rename = "profilePictureUrl")]
    profile_picture_url: Option<String>,
    #[serde(rename = "coverPhotoUrl")]
    cover_photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApifyAdLibrary {
    is_business_page_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ApifyRating {
    Text(String),
    Score(serde_json::Number),
    Detailed {
        overall: Option<Value>,
        count: Option<u64>,
        text: Option<String>,
    },
}

impl From<ApifyRating> for PageRating {
    fn from(rating: ApifyRating) -> Self {
        match rating {
            ApifyRating::Text(text) => PageRating {
                text: Some(text),
                overall: None,
                count: 0,
            },
            ApifyRating::Score(score) => PageRating {
                text: None,
                overall: Some(score.to_string()),
                count: 0,
            },
            ApifyRating::Detailed {
                overall,
                count,
                text,
            } => PageRating {
                text,
                // Apify emits the overall score as either a number or a string.
                overall: overall.and_then(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                }),
                count: count.unwrap_or(0),
            },
        }
    }
}

/// Normalize one Apify page item. The original JSON is kept as `raw_data`.
pub fn page_from_item(value: Value) -> Result<PageProfile> {
    let item: ApifyPageItem = serde_json::from_value(value.clone())?;
    let contact = item.contact.unwrap_or_default();
    let media = item.media.unwrap_or_default();

    Ok(PageProfile {
        page_id: item.page_id.unwrap_or_default(),
        facebook_id: item.facebook_id,
        page_name: item.page_name,
        title: item.title,
        facebook_url: item.facebook_url,
        page_url: item.page_url,
        profile_picture_url: media.profile_picture_url.or(item.profile_picture_url),
        cover_photo_url: media.cover_photo_url.or(item.cover_photo_url),
        email: contact.email,
        phone: contact.phone,
        address: contact.address,
        address_url: contact.address_url,
        websites: item.websites.unwrap_or_default(),
        likes: item.likes.unwrap_or(0),
        followers: item.followers.unwrap_or(0),
        followings: item.followings.unwrap_or(0),
        category: item.category,
        categories: item.categories.unwrap_or_default(),
        intro: item.intro,
        info: item.info.unwrap_or_default(),
        creation_date: item.creation_date.or(item.creation_date_camel),
        rating: item.rating.map(PageRating::from).unwrap_or_default(),
        ad_status: item.ad_status,
        is_business_page_active: item
            .page_ad_library
            .and_then(|lib| lib.is_business_page_active),
        raw_data: value,
    })
}

/// Normalize an Apify dataset payload: a single item object or an array of them.
///
/// An item that fails to normalize is skipped with a warning; the rest are kept.
pub fn pages_from_dataset(value: Value) -> Result<Vec<PageProfile>> {
    let items = match value {
        Value::Object(_) => vec![value],
        Value::Array(items) => items,
        other => {
            return Err(OutreachError::InvalidInput(format!(
                "expected page item object or array, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match page_from_item(item) {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed page item");
                None
            }
        })
        .collect())
}

// --- Graph API ads_archive ---

/// Graph API list fields occasionally arrive as a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringList::One(s) => vec![s],
            StringList::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ArchiveAd {
    id: Option<String>,
    page_id: Option<String>,
    page_name: Option<String>,
    ad_creative_bodies: Option<StringList>,
    ad_creative_link_titles: Option<StringList>,
    ad_creative_link_descriptions: Option<StringList>,
    ad_creative_link_captions: Option<StringList>,
    ad_snapshot_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    data: Vec<Value>,
    paging: Option<ArchivePaging>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ArchivePaging {
    cursors: Option<ArchiveCursors>,
    next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ArchiveCursors {
    after: Option<String>,
}

fn list(field: Option<StringList>) -> Vec<String> {
    field.map(StringList::into_vec).unwrap_or_default()
}

/// Normalize one ads-archive ad object fetched during `session_id`.
pub fn ad_from_archive_item(value: Value, session_id: &str) -> Result<AdRecord> {
    let ad: ArchiveAd = serde_json::from_value(value.clone())?;

    Ok(AdRecord {
        session_id: session_id.to_string(),
        ad_id: ad.id.unwrap_or_default(),
        page_id: ad.page_id,
        page_name: ad.page_name,
        creative_bodies: list(ad.ad_creative_bodies),
        link_titles: list(ad.ad_creative_link_titles),
        link_descriptions: list(ad.ad_creative_link_descriptions),
        link_captions: list(ad.ad_creative_link_captions),
        ad_snapshot_url: ad.ad_snapshot_url,
        raw_data: value,
    })
}

/// Normalize a full `ads_archive` response into one batch.
/// Malformed ads are skipped with a warning.
pub fn ad_batch_from_response(value: Value, session_id: &str) -> Result<AdBatch> {
    let response: ArchiveResponse = serde_json::from_value(value)?;

    let ads = response
        .data
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match ad_from_archive_item(item, session_id) {
            Ok(ad) => Some(ad),
            Err(e) => {
                warn!(index, session_id, error = %e, "Skipping malformed ad");
                None
            }
        })
        .collect();

    let paging = response.paging.map(|p| AdsPaging {
        after_cursor: p.cursors.and_then(|c| c.after),
        next_url: p.next,
    });

    Ok(AdBatch { ads, paging })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
