/// User actions on the archive: open, delete, drag, rename, import, export.
///
/// `apply` mutates the cache synchronously and reports what the caller must do
/// next (sync, open urls, show a notice). Opening happens afterwards through a
/// `TabHost`; a failed open is reported but the cache change stands.
use crate::cache::GroupCache;
use crate::error::CacheError;
use crate::platform::TabHost;
use crate::transfer::{self, Format};
use crate::tab_data::TabRecord;
use log::{error, warn};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Notice {
        Notice { tone: Tone::Success, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Notice {
        Notice { tone: Tone::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Notice {
        Notice { tone: Tone::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Notice {
        Notice { tone: Tone::Error, text: text.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Indices are cache positions captured when the page was rendered
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    OpenTab { group: usize, tab: usize },
    DeleteTab { group: usize, tab: usize },
    DeleteGroup { group: usize },
    OpenGroup { group: usize },
    OpenAll,
    DeleteAll,
    /// Group dragged onto another group
    MergeGroup { source: usize, target: usize },
    /// Tab dragged onto another group
    MoveTab { group: usize, tab: usize, target: usize },
    Rename { group: usize, name: String },
    Import { format: Format, text: String, now: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// The cache changed and must be synced
    pub persist: bool,
    /// Urls to open, in cache order
    pub open: Vec<String>,
    /// Focus the first opened tab
    pub activate: bool,
    /// Shown once every url has opened
    pub notice: Option<Notice>,
}

impl Outcome {
    fn unchanged() -> Outcome {
        Outcome::default()
    }

    fn changed(notice: Option<Notice>) -> Outcome {
        Outcome {
            persist: true,
            notice,
            ..Outcome::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// The address no longer resolves; logged, never shown
    #[error(transparent)]
    Stale(#[from] CacheError),

    /// Refused before touching the cache; shown to the user
    #[error("{0}")]
    Rejected(Notice),
}

pub fn apply(cache: &mut GroupCache, action: Action) -> Result<Outcome, ActionError> {
    match action {
        Action::OpenTab { group, tab } => {
            if !cache.tab(group, tab)?.is_openable() {
                return Err(ActionError::Rejected(Notice::error("This tab has no link to open")));
            }
            let record = cache.remove_tab(group, tab)?;
            Ok(Outcome {
                persist: true,
                open: vec![record.url],
                activate: true,
                notice: None,
            })
        }
        Action::DeleteTab { group, tab } => {
            cache.remove_tab(group, tab)?;
            Ok(Outcome::changed(Some(Notice::success("Tab removed"))))
        }
        Action::DeleteGroup { group } => {
            let removed = cache.remove_group(group)?;
            Ok(Outcome::changed(Some(Notice::success(format!(
                "Group \"{}\" deleted",
                removed.display_name()
            )))))
        }
        Action::OpenGroup { group } => {
            if cache.get(group)?.tabs.is_empty() {
                return Err(ActionError::Rejected(Notice::info("This group is empty")));
            }
            let removed = cache.remove_group(group)?;
            Ok(Outcome {
                persist: true,
                open: openable_urls(&removed.tabs),
                activate: false,
                notice: Some(Notice::success(format!(
                    "Opened {} tabs from \"{}\"",
                    removed.tabs.len(),
                    removed.display_name()
                ))),
            })
        }
        Action::OpenAll => {
            let total = cache.total_tabs();
            if total == 0 {
                return Err(ActionError::Rejected(Notice::info("No tabs to open")));
            }
            let open: Vec<String> = cache
                .groups()
                .iter()
                .flat_map(|g| openable_urls(&g.tabs))
                .collect();
            cache.clear();
            Ok(Outcome {
                persist: true,
                open,
                activate: false,
                notice: Some(Notice::success(format!("Opened all {} tabs", total))),
            })
        }
        Action::DeleteAll => {
            if cache.is_empty() {
                return Err(ActionError::Rejected(Notice::info("No tabs to delete")));
            }
            cache.clear();
            Ok(Outcome::changed(Some(Notice::success("All tabs deleted"))))
        }
        Action::MergeGroup { source, target } => Ok(if cache.merge(source, target)? {
            Outcome::changed(None)
        } else {
            Outcome::unchanged()
        }),
        Action::MoveTab { group, tab, target } => Ok(if cache.move_tab(group, tab, target)? {
            Outcome::changed(None)
        } else {
            Outcome::unchanged()
        }),
        Action::Rename { group, name } => Ok(if cache.rename(group, &name)? {
            Outcome::changed(None)
        } else {
            Outcome::unchanged()
        }),
        Action::Import { format, text, now } => {
            let groups = transfer::import(format, &text, &now)
                .map_err(|e| ActionError::Rejected(Notice::warning(e.to_string())))?;
            let tabs: usize = groups.iter().map(|g| g.tabs.len()).sum();
            let count = groups.len();
            cache.prepend_all(groups);
            Ok(Outcome::changed(Some(Notice::success(format!(
                "Imported {} tabs in {} groups from {}",
                tabs,
                count,
                format.label()
            )))))
        }
    }
}

fn openable_urls(tabs: &[TabRecord]) -> Vec<String> {
    tabs.iter()
        .filter(|t| t.is_openable())
        .map(|t| t.url.clone())
        .collect()
}

/// Opens the outcome's urls and returns the notice to show.
/// Every url is attempted even after a failure.
pub async fn open_urls<H: TabHost>(host: &H, outcome: &Outcome) -> Option<Notice> {
    let mut failures = Vec::new();
    for (i, url) in outcome.open.iter().enumerate() {
        if let Err(e) = host.open_tab(url, outcome.activate && i == 0).await {
            error!("{}", e);
            failures.push(e);
        }
    }

    match failures.len() {
        0 => outcome.notice.clone(),
        1 if outcome.open.len() == 1 => Some(Notice::error("Failed to open tab")),
        n => Some(Notice::error(format!(
            "Failed to open {} of {} tabs",
            n,
            outcome.open.len()
        ))),
    }
}

/// Logs stale references and turns rejections into a notice
pub fn report(err: ActionError) -> Option<Notice> {
    match err {
        ActionError::Stale(stale) => {
            warn!("Ignoring action on a stale reference: {}", stale);
            None
        }
        ActionError::Rejected(notice) => Some(notice),
    }
}

/// A file ready for download
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub filename: String,
    pub content: String,
    pub mime: &'static str,
}

pub fn export_all(cache: &GroupCache, format: Format, stamp: &str) -> Result<Export, ActionError> {
    if cache.is_empty() {
        return Err(ActionError::Rejected(Notice::info("Nothing to export")));
    }
    Ok(Export {
        filename: transfer::export_all_filename(format, stamp),
        content: transfer::export(format, cache.groups()),
        mime: format.mime(),
    })
}

pub fn export_group(cache: &GroupCache, group: usize, format: Format) -> Result<Export, ActionError> {
    let group = cache.get(group)?;
    Ok(Export {
        filename: transfer::export_group_filename(format, group),
        content: transfer::export(format, std::slice::from_ref(group)),
        mime: format.mime(),
    })
}
