/// Pure projection of the filtered cache into a page description.
///
/// The Yew components in `ui` turn a `PageView` into markup one-to-one; all
/// decisions about what appears live here so they can be tested without a DOM.
use crate::search::{FilteredGroup, Segment, highlight};
use crate::settings::{DEFAULT_FAVICON, GroupButtons, HeaderVisibility, Settings};

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub header: HeaderVisibility,
    pub total_tabs: usize,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Nothing archived yet
    Empty,
    /// Archive is not empty but the query matched nothing
    NoMatches,
    Groups(Vec<GroupView>),
}

impl Body {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Body::Empty => Some(
                "No archived tabs yet. Click the toolbar icon or use the context menu to archive this window's tabs.",
            ),
            Body::NoMatches => Some("No groups or tabs match your search."),
            Body::Groups(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupView {
    /// Group id, stable across re-renders
    pub key: String,
    pub group_index: usize,
    pub name: String,
    pub name_segments: Vec<Segment>,
    pub tab_count: usize,
    pub created_tooltip: String,
    pub buttons: GroupButtons,
    pub draggable: bool,
    pub tabs: TabsView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TabsView {
    Rows(Vec<TabView>),
    Hint(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabView {
    pub group_index: usize,
    pub tab_index: usize,
    pub title: Vec<Segment>,
    pub url: Vec<Segment>,
    pub favicon: String,
    pub tooltip: String,
    pub draggable: bool,
}

pub struct RenderInput<'a> {
    pub filtered: &'a [FilteredGroup<'a>],
    pub total_tabs: usize,
    pub settings: &'a Settings,
    /// Effective query; empty when the search box is hidden
    pub query: &'a str,
}

pub fn render_page(input: &RenderInput<'_>) -> PageView {
    let query = input.query;
    let body = if input.filtered.is_empty() {
        if query.is_empty() {
            Body::Empty
        } else {
            Body::NoMatches
        }
    } else {
        Body::Groups(
            input
                .filtered
                .iter()
                .map(|group| render_group(group, input.settings, query))
                .collect(),
        )
    };

    PageView {
        header: input.settings.header(),
        total_tabs: input.total_tabs,
        body,
    }
}

fn render_group(filtered: &FilteredGroup<'_>, settings: &Settings, query: &str) -> GroupView {
    let group = filtered.group;
    let draggable = settings.enable_drag_and_drop;
    let name = group.display_name();
    let name_segments = if settings.search_group_titles {
        highlight(&name, query)
    } else {
        highlight(&name, "")
    };
    let url_query = if settings.search_tab_urls { query } else { "" };

    let tabs = if !filtered.tabs.is_empty() {
        TabsView::Rows(
            filtered
                .tabs
                .iter()
                .map(|(tab_index, tab)| TabView {
                    group_index: filtered.index,
                    tab_index: *tab_index,
                    title: highlight(&tab.title, query),
                    url: highlight(&tab.url, url_query),
                    favicon: if tab.fav_icon_url.is_empty() {
                        DEFAULT_FAVICON.to_string()
                    } else {
                        tab.fav_icon_url.clone()
                    },
                    tooltip: format!("{}\n{}", tab.title, tab.url),
                    draggable,
                })
                .collect(),
        )
    } else if group.tabs.is_empty() {
        TabsView::Hint("This group is empty")
    } else if !query.is_empty() {
        TabsView::Hint("No tabs in this group match your search")
    } else {
        TabsView::Hint("Drop tabs here")
    };

    GroupView {
        key: group.id.clone(),
        group_index: filtered.index,
        name,
        name_segments,
        tab_count: group.tabs.len(),
        created_tooltip: format!("Created: {}", group.create_time),
        buttons: settings.group_buttons(),
        draggable,
        tabs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filter_groups;
    use crate::tab_data::{Group, TabRecord};

    fn groups() -> Vec<Group> {
        vec![
            Group {
                id: "w".to_string(),
                create_time: "2026-10-19 08:00:00".to_string(),
                custom_name: "Work".to_string(),
                tabs: vec![
                    TabRecord::new("Inbox", "https://mail.co", "https://mail.co/icon.png"),
                    TabRecord::new("Docs", "https://docs.co", ""),
                ],
            },
            Group {
                id: "p".to_string(),
                create_time: "2026-10-18 20:00:00".to_string(),
                custom_name: "Play".to_string(),
                tabs: vec![TabRecord::new("Game", "https://play.co", "")],
            },
        ]
    }

    fn render(groups: &[Group], settings: &Settings, query: &str) -> PageView {
        let filtered = filter_groups(groups, query, settings.search_scope(), None);
        render_page(&RenderInput {
            filtered: &filtered,
            total_tabs: groups.iter().map(|g| g.tabs.len()).sum(),
            settings,
            query,
        })
    }

    fn group_views(view: &PageView) -> &[GroupView] {
        match &view.body {
            Body::Groups(groups) => groups,
            other => panic!("expected groups, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_archive() {
        let view = render(&[], &Settings::default(), "");

        assert_eq!(view.body, Body::Empty);
        assert_eq!(view.total_tabs, 0);
        assert!(view.body.message().is_some());
    }

    #[test]
    fn test_no_matches() {
        let view = render(&groups(), &Settings::default(), "zzz");

        assert_eq!(view.body, Body::NoMatches);
        assert_eq!(view.total_tabs, 3);
    }

    #[test]
    fn test_rows_carry_cache_addresses() {
        let view = render(&groups(), &Settings::default(), "docs");
        let views = group_views(&view);

        assert_eq!(views.len(), 1);
        match &views[0].tabs {
            TabsView::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!((rows[0].group_index, rows[0].tab_index), (0, 1));
            }
            other => panic!("expected rows, got {:?}", other),
        }
        assert_eq!(views[0].tab_count, 2);
    }

    #[test]
    fn test_favicon_fallback() {
        let view = render(&groups(), &Settings::default(), "");
        let TabsView::Rows(rows) = &group_views(&view)[0].tabs else {
            panic!("expected rows");
        };

        assert_eq!(rows[0].favicon, "https://mail.co/icon.png");
        assert_eq!(rows[1].favicon, DEFAULT_FAVICON);
    }

    #[test]
    fn test_url_highlight_follows_setting() {
        let settings = Settings {
            search_tab_urls: false,
            ..Settings::default()
        };
        let view = render(&groups(), &settings, "in");
        let TabsView::Rows(rows) = &group_views(&view)[0].tabs else {
            panic!("expected rows");
        };

        assert!(rows[0].title.iter().any(|s| s.highlighted));
        assert!(rows[0].url.iter().all(|s| !s.highlighted));
    }

    #[test]
    fn test_settings_drive_buttons_and_dragging() {
        let settings = Settings {
            show_group_delete_button: false,
            enable_drag_and_drop: false,
            show_header_import: false,
            ..Settings::default()
        };
        let view = render(&groups(), &settings, "");

        assert!(!view.header.import);
        let first = &group_views(&view)[0];
        assert!(!first.buttons.delete);
        assert!(first.buttons.open);
        assert!(!first.draggable);
    }

    #[test]
    fn test_empty_group_hint() {
        let mut data = groups();
        data[1].tabs.clear();
        let view = render(&data, &Settings::default(), "");

        assert_eq!(group_views(&view)[1].tabs, TabsView::Hint("This group is empty"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let data = groups();
        assert_eq!(
            render(&data, &Settings::default(), "o"),
            render(&data, &Settings::default(), "o")
        );
    }
}
