/// User settings and fixed configuration values
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key of the persisted group list in `chrome.storage.local`
pub const GROUPS_KEY: &str = "savedTabsGroups";

/// Quiet period before a scheduled write reaches storage
pub const SYNC_DEBOUNCE: Duration = Duration::from_millis(300);

/// Quiet period after the last keystroke before the list is re-filtered
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// How long a toast stays on screen
pub const TOAST_LIFETIME: Duration = Duration::from_millis(2800);

pub const UNTITLED_TAB: &str = "Untitled tab";

/// Stand-in url for tabs whose address is unknown; never opened
pub const PLACEHOLDER_URL: &str = "#";

pub const DEFAULT_FAVICON: &str = "../images/default-icon.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemePreference {
    /// Whether the dark palette applies, given the system's current preference
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemePreference::System => system_prefers_dark,
            ThemePreference::Light => false,
            ThemePreference::Dark => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::System => "system",
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }
}

/// What a click on the toolbar icon captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IconAction {
    #[default]
    SaveAllInWindow,
    SaveCurrentTab,
}

impl IconAction {
    pub fn as_str(self) -> &'static str {
        match self {
            IconAction::SaveAllInWindow => "saveAllInWindow",
            IconAction::SaveCurrentTab => "saveCurrentTab",
        }
    }
}

/// Persisted in `chrome.storage.sync`. Missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme_preference: ThemePreference,
    pub hover_to_show_settings_icon: bool,
    pub enable_drag_and_drop: bool,
    pub icon_action: IconAction,
    pub search_group_titles: bool,
    #[serde(rename = "searchTabURLs")]
    pub search_tab_urls: bool,
    pub show_header_search: bool,
    pub show_header_open_all: bool,
    pub show_header_delete_all: bool,
    pub show_header_export: bool,
    pub show_header_import: bool,
    pub show_group_open_button: bool,
    pub show_group_delete_button: bool,
    pub show_group_export_button: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme_preference: ThemePreference::System,
            hover_to_show_settings_icon: true,
            enable_drag_and_drop: true,
            icon_action: IconAction::SaveAllInWindow,
            search_group_titles: true,
            search_tab_urls: true,
            show_header_search: true,
            show_header_open_all: true,
            show_header_delete_all: true,
            show_header_export: true,
            show_header_import: true,
            show_group_open_button: true,
            show_group_delete_button: true,
            show_group_export_button: true,
        }
    }
}

/// Which fields a search query is matched against. Tab titles always are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchScope {
    pub group_titles: bool,
    pub tab_urls: bool,
}

impl Default for SearchScope {
    fn default() -> Self {
        SearchScope {
            group_titles: true,
            tab_urls: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderVisibility {
    pub search: bool,
    pub open_all: bool,
    pub delete_all: bool,
    pub export: bool,
    pub import: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupButtons {
    pub open: bool,
    pub delete: bool,
    pub export: bool,
}

impl Settings {
    pub fn search_scope(&self) -> SearchScope {
        SearchScope {
            group_titles: self.search_group_titles,
            tab_urls: self.search_tab_urls,
        }
    }

    pub fn header(&self) -> HeaderVisibility {
        HeaderVisibility {
            search: self.show_header_search,
            open_all: self.show_header_open_all,
            delete_all: self.show_header_delete_all,
            export: self.show_header_export,
            import: self.show_header_import,
        }
    }

    pub fn group_buttons(&self) -> GroupButtons {
        GroupButtons {
            open: self.show_group_open_button,
            delete: self.show_group_delete_button,
            export: self.show_group_export_button,
        }
    }
}

/// Every checkbox setting, in the order the settings form shows them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    HoverToShowSettingsIcon,
    EnableDragAndDrop,
    SearchGroupTitles,
    SearchTabUrls,
    ShowHeaderSearch,
    ShowHeaderOpenAll,
    ShowHeaderDeleteAll,
    ShowHeaderExport,
    ShowHeaderImport,
    ShowGroupOpenButton,
    ShowGroupDeleteButton,
    ShowGroupExportButton,
}

impl Toggle {
    pub const ALL: [Toggle; 12] = [
        Toggle::HoverToShowSettingsIcon,
        Toggle::EnableDragAndDrop,
        Toggle::SearchGroupTitles,
        Toggle::SearchTabUrls,
        Toggle::ShowHeaderSearch,
        Toggle::ShowHeaderOpenAll,
        Toggle::ShowHeaderDeleteAll,
        Toggle::ShowHeaderExport,
        Toggle::ShowHeaderImport,
        Toggle::ShowGroupOpenButton,
        Toggle::ShowGroupDeleteButton,
        Toggle::ShowGroupExportButton,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Toggle::HoverToShowSettingsIcon => "Show the settings icon only on hover",
            Toggle::EnableDragAndDrop => "Enable drag and drop",
            Toggle::SearchGroupTitles => "Search matches group names",
            Toggle::SearchTabUrls => "Search matches tab URLs",
            Toggle::ShowHeaderSearch => "Header: search box",
            Toggle::ShowHeaderOpenAll => "Header: open all",
            Toggle::ShowHeaderDeleteAll => "Header: delete all",
            Toggle::ShowHeaderExport => "Header: export",
            Toggle::ShowHeaderImport => "Header: import",
            Toggle::ShowGroupOpenButton => "Group: open button",
            Toggle::ShowGroupDeleteButton => "Group: delete button",
            Toggle::ShowGroupExportButton => "Group: export menu",
        }
    }

    fn slot(self, settings: &mut Settings) -> &mut bool {
        match self {
            Toggle::HoverToShowSettingsIcon => &mut settings.hover_to_show_settings_icon,
            Toggle::EnableDragAndDrop => &mut settings.enable_drag_and_drop,
            Toggle::SearchGroupTitles => &mut settings.search_group_titles,
            Toggle::SearchTabUrls => &mut settings.search_tab_urls,
            Toggle::ShowHeaderSearch => &mut settings.show_header_search,
            Toggle::ShowHeaderOpenAll => &mut settings.show_header_open_all,
            Toggle::ShowHeaderDeleteAll => &mut settings.show_header_delete_all,
            Toggle::ShowHeaderExport => &mut settings.show_header_export,
            Toggle::ShowHeaderImport => &mut settings.show_header_import,
            Toggle::ShowGroupOpenButton => &mut settings.show_group_open_button,
            Toggle::ShowGroupDeleteButton => &mut settings.show_group_delete_button,
            Toggle::ShowGroupExportButton => &mut settings.show_group_export_button,
        }
    }

    pub fn get(self, settings: &Settings) -> bool {
        match self {
            Toggle::HoverToShowSettingsIcon => settings.hover_to_show_settings_icon,
            Toggle::EnableDragAndDrop => settings.enable_drag_and_drop,
            Toggle::SearchGroupTitles => settings.search_group_titles,
            Toggle::SearchTabUrls => settings.search_tab_urls,
            Toggle::ShowHeaderSearch => settings.show_header_search,
            Toggle::ShowHeaderOpenAll => settings.show_header_open_all,
            Toggle::ShowHeaderDeleteAll => settings.show_header_delete_all,
            Toggle::ShowHeaderExport => settings.show_header_export,
            Toggle::ShowHeaderImport => settings.show_header_import,
            Toggle::ShowGroupOpenButton => settings.show_group_open_button,
            Toggle::ShowGroupDeleteButton => settings.show_group_delete_button,
            Toggle::ShowGroupExportButton => settings.show_group_export_button,
        }
    }

    pub fn set(self, settings: &mut Settings, value: bool) {
        *self.slot(settings) = value;
    }
}
