/// Markdown documents: `### name` headings and `- [title](url)` items
use super::ParsedGroup;
use crate::settings::{PLACEHOLDER_URL, UNTITLED_TAB};
use crate::tab_data::{Group, TabRecord};
use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^###\s*(.*)$").unwrap());

// the title ends at the first "](" so brackets inside it survive; the url
// runs to the last ')' on the line so parentheses inside it survive
static LINK_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s*\[(.*?)\]\((\S*)\)\s*$").unwrap());

pub fn export(groups: &[Group]) -> String {
    groups
        .iter()
        .map(|group| {
            let mut section = format!("### {}", group.display_name());
            for tab in &group.tabs {
                let title = if tab.title.is_empty() { UNTITLED_TAB } else { &tab.title };
                let url = if tab.url.is_empty() { PLACEHOLDER_URL } else { &tab.url };
                section.push_str(&format!("\n- [{}]({})", title, url));
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Lines before the first heading and lines that are not link items are ignored
pub fn parse(text: &str) -> Vec<ParsedGroup> {
    let mut groups = Vec::new();
    let mut current: Option<ParsedGroup> = None;

    for line in text.lines().map(str::trim) {
        if let Some(caps) = HEADING.captures(line) {
            groups.extend(current.take());
            current = Some(ParsedGroup {
                name: Some(caps[1].trim().to_string()),
                ..ParsedGroup::default()
            });
        } else if let (Some(group), Some(caps)) = (current.as_mut(), LINK_ITEM.captures(line)) {
            group.tabs.push(TabRecord {
                title: caps[1].trim().to_string(),
                url: caps[2].trim().to_string(),
                fav_icon_url: String::new(),
            });
        }
    }
    groups.extend(current);
    groups
}
