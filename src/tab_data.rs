/// Data structures for archived tabs and groups
use crate::settings::{PLACEHOLDER_URL, UNTITLED_TAB};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// One archived browser tab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabRecord {
    pub title: String,
    pub url: String,
    pub fav_icon_url: String,
}

impl TabRecord {
    /// Builds a record, substituting fallbacks for a missing title or url
    pub fn new(title: &str, url: &str, fav_icon_url: &str) -> TabRecord {
        let mut tab = TabRecord {
            title: title.to_string(),
            url: url.to_string(),
            fav_icon_url: fav_icon_url.to_string(),
        };
        tab.fill_fallbacks();
        tab
    }

    pub fn fill_fallbacks(&mut self) {
        if self.title.trim().is_empty() {
            self.title = UNTITLED_TAB.to_string();
        }
        if self.url.trim().is_empty() {
            self.url = PLACEHOLDER_URL.to_string();
        }
    }

    /// False for the placeholder url, which has nothing to open
    pub fn is_openable(&self) -> bool {
        !self.url.is_empty() && self.url != PLACEHOLDER_URL
    }
}

/// A named, ordered collection of archived tabs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub id: String,
    pub create_time: String,
    pub custom_name: String,
    pub tabs: Vec<TabRecord>,
}

impl Group {
    /// A new group with a fresh id, named after its creation time.
    /// The caller decides where it goes in the cache.
    pub fn capture(tabs: Vec<TabRecord>, create_time: String) -> Group {
        Group {
            id: Uuid::new_v4().to_string(),
            custom_name: create_time.clone(),
            create_time,
            tabs: tabs
                .into_iter()
                .map(|mut tab| {
                    tab.fill_fallbacks();
                    tab
                })
                .collect(),
        }
    }

    pub fn display_name(&self) -> String {
        if !self.custom_name.trim().is_empty() {
            self.custom_name.clone()
        } else if !self.create_time.trim().is_empty() {
            self.create_time.clone()
        } else {
            format!("Group {}", self.id)
        }
    }
}

/// Local wall-clock time in the display format used for `createTime`
pub fn now_display() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Fills every missing field with a deterministic fallback and re-ids
/// duplicates so that ids stay unique. Empty groups are kept.
pub fn normalize_groups(groups: Vec<Group>, now: &str) -> Vec<Group> {
    let mut taken: HashSet<String> = groups
        .iter()
        .filter(|g| !g.id.trim().is_empty())
        .map(|g| g.id.clone())
        .collect();
    let mut seen = HashSet::new();
    let mut next_fallback = 0usize;

    groups
        .into_iter()
        .map(|mut group| {
            if group.id.trim().is_empty() || !seen.insert(group.id.clone()) {
                group.id = loop {
                    let candidate = format!("group-{}", next_fallback);
                    next_fallback += 1;
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                };
                seen.insert(group.id.clone());
            }
            if group.create_time.trim().is_empty() {
                group.create_time = now.to_string();
            }
            group.custom_name = match group.custom_name.trim() {
                "" => group.create_time.clone(),
                name => name.to_string(),
            };
            for tab in &mut group.tabs {
                tab.fill_fallbacks();
            }
            group
        })
        .collect()
}

/// Drops groups whose tab list is empty
pub fn prune_empty(groups: Vec<Group>) -> Vec<Group> {
    groups.into_iter().filter(|g| !g.tabs.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(title: &str, url: &str) -> TabRecord {
        TabRecord::new(title, url, "")
    }

    #[test]
    fn test_tab_fallbacks() {
        let tab = TabRecord::new("", "", "");

        assert_eq!(tab.title, UNTITLED_TAB);
        assert_eq!(tab.url, PLACEHOLDER_URL);
        assert_eq!(tab.fav_icon_url, "");
        assert!(!tab.is_openable());
    }

    #[test]
    fn test_capture_names_group_after_create_time() {
        let group = Group::capture(
            vec![tab("Rust", "https://rust-lang.org"), tab("Docs", "https://docs.rs")],
            "2026-10-19 09:30:00".to_string(),
        );

        assert_eq!(group.tabs.len(), 2);
        assert_eq!(group.custom_name, group.create_time);
        assert!(Uuid::parse_str(&group.id).is_ok());
    }

    #[test]
    fn test_capture_ids_are_fresh() {
        let a = Group::capture(vec![tab("a", "https://a.io")], "t".to_string());
        let b = Group::capture(vec![tab("a", "https://a.io")], "t".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut group = Group {
            id: "g1".to_string(),
            ..Group::default()
        };
        assert_eq!(group.display_name(), "Group g1");

        group.create_time = "2026-01-01 00:00:00".to_string();
        assert_eq!(group.display_name(), "2026-01-01 00:00:00");

        group.custom_name = "Reading".to_string();
        assert_eq!(group.display_name(), "Reading");
    }

    #[test]
    fn test_normalize_fills_missing_fields() {
        let groups = vec![Group {
            custom_name: "   ".to_string(),
            tabs: vec![TabRecord::default()],
            ..Group::default()
        }];

        let normalized = normalize_groups(groups, "2026-10-19 10:00:00");

        assert_eq!(normalized[0].id, "group-0");
        assert_eq!(normalized[0].create_time, "2026-10-19 10:00:00");
        assert_eq!(normalized[0].custom_name, "2026-10-19 10:00:00");
        assert_eq!(normalized[0].tabs[0].title, UNTITLED_TAB);
    }

    #[test]
    fn test_normalize_trims_custom_name() {
        let groups = vec![Group {
            id: "x".to_string(),
            create_time: "t".to_string(),
            custom_name: "  Work  ".to_string(),
            tabs: vec![],
        }];

        assert_eq!(normalize_groups(groups, "now")[0].custom_name, "Work");
    }

    #[test]
    fn test_normalize_makes_ids_unique() {
        let groups = vec![
            Group { id: "group-0".to_string(), ..Group::default() },
            Group { id: "dup".to_string(), ..Group::default() },
            Group { id: "dup".to_string(), ..Group::default() },
            Group::default(),
        ];

        let normalized = normalize_groups(groups, "now");
        let ids: HashSet<&str> = normalized.iter().map(|g| g.id.as_str()).collect();

        assert_eq!(ids.len(), 4);
        assert_eq!(normalized[0].id, "group-0");
        assert_eq!(normalized[1].id, "dup");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let groups = vec![Group::default(), Group::default()];
        assert_eq!(
            normalize_groups(groups.clone(), "now"),
            normalize_groups(groups, "now")
        );
    }

    #[test]
    fn test_prune_empty() {
        let groups = vec![
            Group { id: "a".to_string(), tabs: vec![tab("t", "u")], ..Group::default() },
            Group { id: "b".to_string(), ..Group::default() },
        ];

        let pruned = prune_empty(groups);

        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].id, "a");
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{"id":"g","createTime":"t","customName":"n","tabs":[{"title":"T","url":"https://x.io","favIconUrl":"https://x.io/f.ico"}]}"#;
        let group: Group = serde_json::from_str(json).unwrap();

        assert_eq!(group.tabs[0].fav_icon_url, "https://x.io/f.ico");
        assert_eq!(serde_json::to_string(&group).unwrap(), json);
    }

    #[test]
    fn test_missing_wire_fields_default() {
        let group: Group = serde_json::from_str(r#"{"tabs":[{"url":"https://x.io"}]}"#).unwrap();

        assert_eq!(group.id, "");
        assert_eq!(group.tabs[0].title, "");
    }
}
