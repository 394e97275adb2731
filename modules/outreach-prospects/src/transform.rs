use chrono::Utc;
use outreach_common::{AdRecord, PageProfile, ProspectContext, ProspectRawData};

fn first(values: &[String]) -> String {
    values.first().cloned().unwrap_or_default()
}

/// Merge a page with at most one of its ads.
///
/// Nothing is invented: a page missing its name or email produces a context
/// that fails `is_valid_for_outreach`. `ad_url` is taken from the ad's link
/// captions, which is where the archive puts the display domain.
pub fn to_prospect_context(
    page: &PageProfile,
    ad: Option<&AdRecord>,
    fallback_email: Option<&str>,
) -> ProspectContext {
    let intro = page.intro.clone().unwrap_or_default();

    ProspectContext {
        page_name: page
            .page_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(page.title.as_deref())
            .unwrap_or_default()
            .to_string(),
        email: page
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(fallback_email)
            .unwrap_or_default()
            .to_string(),
        company: String::new(),
        category: page.category.clone().unwrap_or_default(),
        business_description: intro.clone(),
        intro,
        followers: page.followers,
        likes: page.likes,
        website: first(&page.websites),
        address: page.address.clone().unwrap_or_default(),
        phone: page.phone.clone().unwrap_or_default(),
        ad_creative_text: ad.map(|a| first(&a.creative_bodies)).unwrap_or_default(),
        ad_title: ad.map(|a| first(&a.link_titles)).unwrap_or_default(),
        ad_url: ad.map(|a| first(&a.link_captions)).unwrap_or_default(),
        ad_snapshot_url: ad
            .and_then(|a| a.ad_snapshot_url.clone())
            .unwrap_or_default(),
        page_id: page.page_id.clone(),
        page_url: page.page_url.clone().unwrap_or_default(),
        creation_date: page.creation_date.clone().unwrap_or_default(),
        tags: Vec::new(),
        raw_data: ProspectRawData {
            page: page.raw_data.clone(),
            ad: ad
                .map(|a| a.raw_data.clone())
                .unwrap_or_else(|| serde_json::json!({})),
        },
        scraped_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acme() -> PageProfile {
        PageProfile {
            page_id: "p1".to_string(),
            page_name: Some("Acme".to_string()),
            email: Some("a@acme.com".to_string()),
            intro: Some("We sell widgets".to_string()),
            websites: vec!["https://acme.com".to_string(), "https://b.acme.com".to_string()],
            page_url: Some("https://facebook.com/acme".to_string()),
            followers: 120,
            raw_data: json!({"pageId": "p1"}),
            ..Default::default()
        }
    }

    fn buy_now() -> AdRecord {
        AdRecord {
            ad_id: "ad-1".to_string(),
            page_id: Some("p1".to_string()),
            creative_bodies: vec!["Buy now".to_string(), "Second".to_string()],
            link_titles: vec!["Widgets".to_string()],
            link_captions: vec!["acme.com".to_string()],
            link_descriptions: vec!["Best widgets".to_string()],
            ad_snapshot_url: Some("https://fb/snap/1".to_string()),
            raw_data: json!({"id": "ad-1"}),
            ..Default::default()
        }
    }

    #[test]
    fn merges_page_and_first_ad_values() {
        let p = to_prospect_context(&acme(), Some(&buy_now()), None);

        assert_eq!(p.page_name, "Acme");
        assert_eq!(p.email, "a@acme.com");
        assert_eq!(p.business_description, "We sell widgets");
        assert_eq!(p.intro, "We sell widgets");
        assert_eq!(p.website, "https://acme.com");
        assert_eq!(p.ad_creative_text, "Buy now");
        assert_eq!(p.ad_title, "Widgets");
        assert_eq!(p.ad_url, "acme.com");
        assert_eq!(p.ad_snapshot_url, "https://fb/snap/1");
        assert_eq!(p.page_url, "https://facebook.com/acme");
        assert_eq!(p.raw_data.page["pageId"], "p1");
        assert_eq!(p.raw_data.ad["id"], "ad-1");
        assert!(p.tags.is_empty());
        assert!(p.is_valid_for_outreach());
    }

    #[test]
    fn missing_ad_leaves_ad_fields_empty() {
        let p = to_prospect_context(&acme(), None, None);
        assert!(p.ad_creative_text.is_empty());
        assert!(p.ad_url.is_empty());
        assert_eq!(p.raw_data.ad, json!({}));
    }

    #[test]
    fn title_stands_in_for_missing_page_name() {
        let mut page = acme();
        page.page_name = None;
        page.title = Some("Acme Widgets".to_string());
        assert_eq!(to_prospect_context(&page, None, None).page_name, "Acme Widgets");
    }

    #[test]
    fn nameless_page_fails_closed() {
        let mut page = acme();
        page.page_name = None;
        let p = to_prospect_context(&page, Some(&buy_now()), None);
        assert!(p.page_name.is_empty());
        assert!(!p.is_valid_for_outreach());
    }

    #[test]
    fn fallback_email_fills_missing_contact() {
        let mut page = acme();
        page.email = None;
        let p = to_prospect_context(&page, None, Some("leads@agency.com"));
        assert_eq!(p.email, "leads@agency.com");

        let without = to_prospect_context(&page, None, None);
        assert!(without.email.is_empty());
    }
}
