/// Error types shared across the crate

use thiserror::Error;

/// Failures reading or writing the persisted group record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Failed to read storage: {0}")]
    Read(String),

    #[error("Failed to write storage: {0}")]
    Write(String),

    #[error("Failed to decode stored data: {0}")]
    Decode(String),

    #[error("Failed to encode data for storage: {0}")]
    Encode(String),
}

/// A cache address that no longer resolves
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("No group at index {0}")]
    StaleGroup(usize),

    #[error("No tab at index {tab} in group {group}")]
    StaleTab { group: usize, tab: usize },
}

/// A browser call (open, close, message) rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlatformError {
    #[error("Failed to open tab {url}: {reason}")]
    OpenTab { url: String, reason: String },

    #[error("Failed to close tabs: {0}")]
    CloseTabs(String),

    #[error("Failed to query tabs: {0}")]
    QueryTabs(String),

    #[error("Message delivery failed: {0}")]
    Message(String),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
}

/// An import document that could not be turned into groups
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("{0} content is empty")]
    Empty(&'static str),

    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("JSON document must be a list of groups")]
    NotAList,

    #[error("No groups with tabs found in {0} content")]
    NoGroups(&'static str),

    #[error("Failed to read file: {0}")]
    Read(String),
}

/// Archiving tabs from the background worker failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}
