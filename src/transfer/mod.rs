/// Import and export of groups as JSON, Markdown and HTML bookmarks.
///
/// Export never touches the cache. Import returns fresh groups (new ids,
/// tab fallbacks applied) for the caller to prepend; a failed import returns
/// an error and produces nothing.

use crate::error::ImportError;
use crate::tab_data::{Group, TabRecord};
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

pub mod bookmarks;
pub mod json;
pub mod markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
    Html,
}

impl Format {
    pub fn label(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Markdown => "Markdown",
            Format::Html => "HTML",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Markdown => "md",
            Format::Html => "html",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Markdown => "text/markdown",
            Format::Html => "text/html",
        }
    }

    /// `accept` attribute for the file picker
    pub fn accept(self) -> &'static str {
        match self {
            Format::Json => ".json",
            Format::Markdown => ".md,.markdown,.txt",
            Format::Html => ".html,.htm",
        }
    }
}

pub fn export(format: Format, groups: &[Group]) -> String {
    match format {
        Format::Json => json::export(groups),
        Format::Markdown => markdown::export(groups),
        Format::Html => bookmarks::export(groups, Local::now().timestamp()),
    }
}

/// Parses `text`; `now` is the display time stamped on the new groups
pub fn import(format: Format, text: &str, now: &str) -> Result<Vec<Group>, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::Empty(format.label()));
    }
    let parsed = match format {
        Format::Json => json::parse(text)?,
        Format::Markdown => markdown::parse(text),
        Format::Html => bookmarks::parse(text),
    };

    let groups: Vec<Group> = parsed
        .into_iter()
        .filter(|g| !g.tabs.is_empty())
        .map(|g| g.into_group(format, now))
        .collect();
    if groups.is_empty() {
        return Err(ImportError::NoGroups(format.label()));
    }
    Ok(groups)
}

/// A group as read from a document, before ids and fallbacks are assigned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGroup {
    pub name: Option<String>,
    pub create_time: Option<String>,
    pub tabs: Vec<TabRecord>,
}

impl ParsedGroup {
    fn into_group(self, format: Format, now: &str) -> Group {
        let create_time = self
            .create_time
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| now.to_string());
        let custom_name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Imported from {} {}", format.label(), date_part(now)));

        Group {
            id: Uuid::new_v4().to_string(),
            create_time,
            custom_name,
            tabs: self
                .tabs
                .into_iter()
                .map(|mut tab| {
                    tab.fill_fallbacks();
                    tab
                })
                .collect(),
        }
    }
}

fn date_part(display_time: &str) -> &str {
    display_time.split(' ').next().unwrap_or(display_time)
}

/// Seconds since the epoch for a `createTime`, if it is in display format
pub fn parse_display_time(create_time: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(create_time.trim(), "%Y-%m-%d %H:%M:%S")
        .ok()
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.timestamp())
}

static UNSAFE_FILENAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s:/\\]+").unwrap());

/// File name for exporting the whole archive
pub fn export_all_filename(format: Format, stamp: &str) -> String {
    format!("tab-shelf-all-{}.{}", stamp, format.extension())
}

/// File name for exporting one group
pub fn export_group_filename(format: Format, group: &Group) -> String {
    let name = group.display_name();
    let name = name.trim();
    let name = if name.is_empty() { "group" } else { name };
    format!(
        "tab-shelf-group-{}.{}",
        UNSAFE_FILENAME.replace_all(name, "_"),
        format.extension()
    )
}

/// `YYYYMMDD_HHMMSS` for file names
pub fn file_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}
