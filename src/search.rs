/// Search filtering and match highlighting for the group list
use crate::settings::SearchScope;
use crate::tab_data::{Group, TabRecord};
use regex::RegexBuilder;

/// One group as it should appear for the current query.
/// Indices point back into the unfiltered cache.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredGroup<'a> {
    pub index: usize,
    pub group: &'a Group,
    pub tabs: Vec<(usize, &'a TabRecord)>,
    /// Render every tab regardless of the query
    pub force_visible: bool,
}

fn all_tabs(group: &Group) -> Vec<(usize, &TabRecord)> {
    group.tabs.iter().enumerate().collect()
}

/// Case-insensitive substring filter. Never reorders and never mutates.
///
/// A group whose name matches (with group-title search on) comes back whole
/// and force-visible; otherwise only its matching tabs come back; a group
/// with neither is left out unless it is the group being dragged.
pub fn filter_groups<'a>(
    groups: &'a [Group],
    query: &str,
    scope: SearchScope,
    dragging: Option<&str>,
) -> Vec<FilteredGroup<'a>> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return groups
            .iter()
            .enumerate()
            .map(|(index, group)| FilteredGroup {
                index,
                group,
                tabs: all_tabs(group),
                force_visible: false,
            })
            .collect();
    }

    groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| {
            let name_matches =
                scope.group_titles && group.display_name().to_lowercase().contains(&query);
            if name_matches {
                return Some(FilteredGroup {
                    index,
                    group,
                    tabs: all_tabs(group),
                    force_visible: true,
                });
            }

            let matching: Vec<(usize, &TabRecord)> = group
                .tabs
                .iter()
                .enumerate()
                .filter(|(_, tab)| tab_matches(tab, &query, scope))
                .collect();
            if !matching.is_empty() {
                return Some(FilteredGroup {
                    index,
                    group,
                    tabs: matching,
                    force_visible: false,
                });
            }

            (dragging == Some(group.id.as_str())).then(|| FilteredGroup {
                index,
                group,
                tabs: all_tabs(group),
                force_visible: true,
            })
        })
        .collect()
}

/// `query` must already be lowercase
fn tab_matches(tab: &TabRecord, query: &str, scope: SearchScope) -> bool {
    tab.title.to_lowercase().contains(query)
        || (scope.tab_urls && tab.url.to_lowercase().contains(query))
}

/// A run of text, marked when it matches the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn plain(text: &str) -> Segment {
        Segment {
            text: text.to_string(),
            highlighted: false,
        }
    }
}

/// Splits `text` around every case-insensitive occurrence of `query`
pub fn highlight(text: &str, query: &str) -> Vec<Segment> {
    if query.is_empty() || text.is_empty() {
        return vec![Segment::plain(text)];
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return vec![Segment::plain(text)];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            segments.push(Segment::plain(&text[last..found.start()]));
        }
        segments.push(Segment {
            text: found.as_str().to_string(),
            highlighted: true,
        });
        last = found.end();
    }
    if last < text.len() {
        segments.push(Segment::plain(&text[last..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str, tabs: &[(&str, &str)]) -> Group {
        Group {
            id: id.to_string(),
            create_time: "2026-10-19 08:00:00".to_string(),
            custom_name: name.to_string(),
            tabs: tabs.iter().map(|(t, u)| TabRecord::new(t, u, "")).collect(),
        }
    }

    fn work_and_play() -> Vec<Group> {
        vec![
            group("w", "Work", &[("Inbox", "mail.co")]),
            group("p", "Play", &[("Game", "play.co")]),
        ]
    }

    #[test]
    fn test_url_match_returns_only_that_group() {
        let groups = work_and_play();

        let result = filter_groups(&groups, "mail", SearchScope::default(), None);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].group.custom_name, "Work");
        assert_eq!(result[0].tabs.len(), 1);
        assert!(!result[0].force_visible);
    }

    #[test]
    fn test_name_match_returns_whole_group() {
        let groups = vec![group(
            "w",
            "Work",
            &[("Inbox", "mail.co"), ("Calendar", "cal.co")],
        )];

        let result = filter_groups(&groups, "work", SearchScope::default(), None);

        assert_eq!(result.len(), 1);
        assert!(result[0].force_visible);
        assert_eq!(result[0].tabs.len(), 2);
    }

    #[test]
    fn test_name_match_ignored_when_title_search_off() {
        let groups = work_and_play();
        let scope = SearchScope {
            group_titles: false,
            tab_urls: true,
        };

        assert!(filter_groups(&groups, "Work", scope, None).is_empty());
    }

    #[test]
    fn test_url_match_ignored_when_url_search_off() {
        let groups = work_and_play();
        let scope = SearchScope {
            group_titles: true,
            tab_urls: false,
        };

        assert!(filter_groups(&groups, "mail", scope, None).is_empty());
        assert_eq!(filter_groups(&groups, "INBOX", scope, None).len(), 1);
    }

    #[test]
    fn test_partial_tab_match_keeps_original_indices() {
        let groups = vec![
            group("a", "A", &[("x", "x.io")]),
            group("b", "B", &[("Rust book", "r.io"), ("Go", "g.io"), ("Rust std", "s.io")]),
        ];

        let result = filter_groups(&groups, "rust", SearchScope::default(), None);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].index, 1);
        let tab_indices: Vec<usize> = result[0].tabs.iter().map(|(i, _)| *i).collect();
        assert_eq!(tab_indices, vec![0, 2]);
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let groups = work_and_play();

        let result = filter_groups(&groups, "", SearchScope::default(), None);

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|g| !g.force_visible));
    }

    #[test]
    fn test_query_whitespace_is_matched_literally() {
        let groups = work_and_play();

        assert!(filter_groups(&groups, "mail ", SearchScope::default(), None).is_empty());
        assert!(filter_groups(&groups, " ", SearchScope::default(), None).is_empty());
        assert_eq!(highlight("mail.co", "mail "), vec![Segment::plain("mail.co")]);
    }

    #[test]
    fn test_dragged_group_stays_visible() {
        let groups = work_and_play();

        let result = filter_groups(&groups, "mail", SearchScope::default(), Some("p"));

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].group.id, "p");
        assert!(result[1].force_visible);
    }

    #[test]
    fn test_filter_preserves_source_order() {
        let groups = vec![
            group("1", "one", &[("match", "a")]),
            group("2", "two", &[("nope", "b")]),
            group("3", "three", &[("match", "c")]),
        ];

        let order: Vec<usize> = filter_groups(&groups, "match", SearchScope::default(), None)
            .iter()
            .map(|g| g.index)
            .collect();

        assert_eq!(order, vec![0, 2]);
    }

    #[test]
    fn test_highlight_segments() {
        let segments = highlight("Rust and rust", "RUST");

        assert_eq!(
            segments,
            vec![
                Segment { text: "Rust".to_string(), highlighted: true },
                Segment { text: " and ".to_string(), highlighted: false },
                Segment { text: "rust".to_string(), highlighted: true },
            ]
        );
    }

    #[test]
    fn test_highlight_escapes_pattern() {
        let segments = highlight("a.b (c)", "(c)");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "(c)");
        assert!(segments[1].highlighted);
    }

    #[test]
    fn test_highlight_without_query() {
        assert_eq!(highlight("text", ""), vec![Segment::plain("text")]);
    }
}
