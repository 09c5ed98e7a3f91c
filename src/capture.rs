/// Deciding which browser tabs get archived, and the extension's menu entries
use crate::settings::IconAction;
use crate::tab_data::TabRecord;
use serde::{Deserialize, Serialize};
use url::Url;

/// Schemes the browser will not let an extension reopen
const PROTECTED_SCHEMES: [&str; 3] = ["chrome", "chrome-extension", "edge"];

/// The fields of a `chrome.tabs.Tab` the crate reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserTab {
    pub id: Option<i32>,
    pub window_id: Option<i32>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub fav_icon_url: Option<String>,
    pub pinned: bool,
}

impl BrowserTab {
    pub fn to_record(&self) -> TabRecord {
        TabRecord::new(
            self.title.as_deref().unwrap_or_default(),
            self.url.as_deref().unwrap_or_default(),
            self.fav_icon_url.as_deref().unwrap_or_default(),
        )
    }
}

pub fn is_capturable_url(url: &str, manage_url: &str) -> bool {
    if url.is_empty() || url == manage_url {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => !PROTECTED_SCHEMES.contains(&parsed.scheme()),
        Err(_) => true,
    }
}

/// Keeps tabs that have an id and a url that can be archived and reopened
pub fn capturable(tabs: Vec<BrowserTab>, manage_url: &str) -> Vec<BrowserTab> {
    tabs.into_iter()
        .filter(|tab| {
            tab.id.is_some()
                && tab
                    .url
                    .as_deref()
                    .is_some_and(|url| is_capturable_url(url, manage_url))
        })
        .collect()
}

/// What a toolbar click or menu entry asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Only the given tab; the manager page stays in the background
    CurrentTab,
    /// Every tab in the window, then focus the manager page
    Window,
}

impl Capture {
    pub fn for_icon(action: IconAction) -> Capture {
        match action {
            IconAction::SaveCurrentTab => Capture::CurrentTab,
            IconAction::SaveAllInWindow => Capture::Window,
        }
    }

    pub fn activates_manager(self) -> bool {
        self == Capture::Window
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    SaveCurrentTab,
    SaveAllTabs,
    OpenManager,
    OpenOptions,
}

impl MenuCommand {
    pub fn id(self) -> &'static str {
        match self {
            MenuCommand::SaveCurrentTab => "save-current-tab",
            MenuCommand::SaveAllTabs => "save-all-tabs",
            MenuCommand::OpenManager => "open-just-onetab",
            MenuCommand::OpenOptions => "open-options-page",
        }
    }

    pub fn from_id(id: &str) -> Option<MenuCommand> {
        [
            MenuCommand::SaveCurrentTab,
            MenuCommand::SaveAllTabs,
            MenuCommand::OpenManager,
            MenuCommand::OpenOptions,
        ]
        .into_iter()
        .find(|command| command.id() == id)
    }
}

/// `chrome.contextMenus.create` properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub contexts: &'static [&'static str],
}

const PAGE_AND_ACTION: &[&str] = &["page", "frame", "action"];

/// Menu entries in display order
pub fn menu_items() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: MenuCommand::SaveCurrentTab.id(),
            title: Some("Archive only this tab"),
            kind: None,
            contexts: PAGE_AND_ACTION,
        },
        MenuItem {
            id: MenuCommand::SaveAllTabs.id(),
            title: Some("Archive all tabs"),
            kind: None,
            contexts: PAGE_AND_ACTION,
        },
        MenuItem {
            id: "sep1",
            title: None,
            kind: Some("separator"),
            contexts: PAGE_AND_ACTION,
        },
        MenuItem {
            id: MenuCommand::OpenManager.id(),
            title: Some("Open Tab Shelf"),
            kind: None,
            contexts: PAGE_AND_ACTION,
        },
        MenuItem {
            id: MenuCommand::OpenOptions.id(),
            title: Some("Settings"),
            kind: None,
            contexts: &["action"],
        },
    ]
}
