/// Browser tab capabilities used by the action handlers
use crate::bridge;
use crate::error::PlatformError;
use crate::message::Message;

/// Opens browser tabs. Implemented by the extension runtime and by test fakes.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    async fn open_tab(&self, url: &str, active: bool) -> Result<(), PlatformError>;
}

/// `chrome.tabs`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

impl TabHost for ChromeHost {
    async fn open_tab(&self, url: &str, active: bool) -> Result<(), PlatformError> {
        bridge::createTab(url, active)
            .await
            .map_err(|e| PlatformError::OpenTab {
                url: url.to_string(),
                reason: bridge::describe(&e),
            })
    }
}

pub async fn copy_to_clipboard(text: &str) -> Result<(), PlatformError> {
    bridge::copyToClipboard(text)
        .await
        .map_err(|e| PlatformError::Clipboard(bridge::describe(&e)))
}

/// Sends `message` to every other extension page. Having no listener is not an error.
pub async fn broadcast(message: &Message) -> Result<(), PlatformError> {
    let value = message
        .to_js()
        .map_err(|e| PlatformError::Message(e.to_string()))?;
    bridge::broadcast(value)
        .await
        .map(|_| ())
        .map_err(|e| PlatformError::Message(bridge::describe(&e)))
}

/// Starts a browser download of `content`
pub fn download(filename: &str, content: &str, mime: &str) {
    bridge::downloadFile(filename, content, mime);
}
