use std::collections::HashMap;

use outreach_common::{DedupKey, PageProfile};
use tracing::{debug, warn};

/// Pages collapsed by key. Iterates in first-seen key order; a later page
/// with the same key replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniquePages {
    order: Vec<String>,
    pages: HashMap<String, PageProfile>,
}

impl UniquePages {
    pub fn get(&self, key: &str) -> Option<&PageProfile> {
        self.pages.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PageProfile)> {
        self.order
            .iter()
            .filter_map(|key| self.pages.get(key).map(|page| (key.as_str(), page)))
    }

    pub fn values(&self) -> impl Iterator<Item = &PageProfile> {
        self.iter().map(|(_, page)| page)
    }

    fn insert(&mut self, key: String, page: PageProfile) {
        if self.pages.insert(key.clone(), page).is_none() {
            self.order.push(key);
        }
    }
}

fn key_for<'a>(page: &'a PageProfile, dedup_key: DedupKey) -> Option<&'a str> {
    match dedup_key {
        DedupKey::PageId => Some(page.page_id.as_str()).filter(|id| !id.is_empty()),
        DedupKey::AdLibraryId => page.ad_library_id(),
    }
}

/// Collapse repeated scrapes of the same page, last write wins.
pub fn dedupe<'a, I>(pages: I, dedup_key: DedupKey) -> UniquePages
where
    I: IntoIterator<Item = &'a PageProfile>,
{
    let mut unique = UniquePages::default();

    for page in pages {
        match key_for(page, dedup_key) {
            Some(key) => unique.insert(key.to_string(), page.clone()),
            None if dedup_key == DedupKey::AdLibraryId => {
                warn!(
                    page_id = page.page_id.as_str(),
                    "Page has no pageAdLibrary.id, dropping"
                );
            }
            None => {
                debug!(
                    page_name = page.page_name.as_deref().unwrap_or(""),
                    "Page has no page_id, dropping"
                );
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(page_id: &str, name: &str) -> PageProfile {
        PageProfile {
            page_id: page_id.to_string(),
            page_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn last_write_wins_keeps_first_position() {
        let pages = vec![page("p1", "Old"), page("p2", "Other"), page("p1", "New")];
        let unique = dedupe(&pages, DedupKey::PageId);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique.get("p1").unwrap().page_name.as_deref(), Some("New"));
        let keys: Vec<&str> = unique.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["p1", "p2"]);
    }

    #[test]
    fn dedupe_twice_is_a_no_op() {
        let pages = vec![
            page("p1", "A"),
            page("p2", "B"),
            page("p1", "C"),
            page("", "D"),
            page("p3", "E"),
        ];
        let once = dedupe(&pages, DedupKey::PageId);
        let twice = dedupe(once.values(), DedupKey::PageId);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_page_id_is_dropped() {
        let unique = dedupe(&[page("", "Nameless")], DedupKey::PageId);
        assert!(unique.is_empty());
    }

    #[test]
    fn ad_library_key_uses_nested_id_and_drops_pages_without_it() {
        let mut with_lib = page("p1", "Acme");
        with_lib.raw_data = json!({"pageAdLibrary": {"id": "lib-1"}});
        let without_lib = page("p2", "Bare");

        let unique = dedupe(&[with_lib, without_lib], DedupKey::AdLibraryId);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique.get("lib-1").unwrap().page_id, "p1");
        assert!(unique.get("p2").is_none());
    }
}
