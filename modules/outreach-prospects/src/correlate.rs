use std::collections::HashMap;

use outreach_common::AdRecord;
use tracing::debug;

/// Group ads by the page they promote.
///
/// Order within each group follows input order. Ads without a page id are
/// skipped; duplicate ads are kept.
pub fn correlate<'a, I>(ads: I) -> HashMap<String, Vec<AdRecord>>
where
    I: IntoIterator<Item = &'a AdRecord>,
{
    let mut ad_map: HashMap<String, Vec<AdRecord>> = HashMap::new();

    for ad in ads {
        let Some(page_id) = ad.correlation_key() else {
            debug!(ad_id = ad.ad_id.as_str(), "Ad has no page_id, skipping");
            continue;
        };
        ad_map.entry(page_id.to_string()).or_default().push(ad.clone());
    }

    ad_map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(ad_id: &str, page_id: Option<&str>) -> AdRecord {
        AdRecord {
            ad_id: ad_id.to_string(),
            page_id: page_id.map(str::to_string),
            ..Default::default()
        }
    }

    fn ids(ads: &[AdRecord]) -> Vec<&str> {
        ads.iter().map(|a| a.ad_id.as_str()).collect()
    }

    #[test]
    fn groups_by_page_preserving_order() {
        let ads = vec![
            ad("a1", Some("p1")),
            ad("a2", Some("p2")),
            ad("a3", Some("p1")),
            ad("a4", Some("p1")),
        ];
        let map = correlate(&ads);

        assert_eq!(map.len(), 2);
        assert_eq!(ids(&map["p1"]), vec!["a1", "a3", "a4"]);
        assert_eq!(ids(&map["p2"]), vec!["a2"]);
    }

    #[test]
    fn skips_missing_and_empty_page_ids() {
        let ads = vec![ad("a1", None), ad("a2", Some("")), ad("a3", Some("p1"))];
        let map = correlate(&ads);

        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(""));
        let all: Vec<&str> = map.values().flat_map(|v| ids(v)).collect();
        assert_eq!(all, vec!["a3"]);
    }

    #[test]
    fn keeps_duplicate_ads() {
        let ads = vec![ad("a1", Some("p1")), ad("a1", Some("p1"))];
        assert_eq!(correlate(&ads)["p1"].len(), 2);
    }

    #[test]
    fn every_keyed_ad_appears_exactly_once() {
        let ads: Vec<AdRecord> = (0..20)
            .map(|i| {
                let page = match i % 4 {
                    0 => None,
                    n => Some(format!("p{n}")),
                };
                ad(&format!("a{i}"), page.as_deref())
            })
            .collect();
        let map = correlate(&ads);

        for a in ads.iter().filter(|a| a.correlation_key().is_some()) {
            let group = &map[a.correlation_key().unwrap()];
            assert_eq!(group.iter().filter(|g| g.ad_id == a.ad_id).count(), 1);
        }
        let keyed = ads.iter().filter(|a| a.correlation_key().is_some()).count();
        assert_eq!(map.values().map(Vec::len).sum::<usize>(), keyed);
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(correlate(&Vec::<AdRecord>::new()).is_empty());
    }
}
