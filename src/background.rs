/// Background service worker: toolbar clicks, context menu commands and
/// install-time setup.
///
/// Archiving reads the stored list, prepends the new group and writes it back
/// before any tab is closed, so a failed write never loses a tab.

use crate::bridge;
use crate::capture::{BrowserTab, Capture, MenuCommand, capturable, menu_items};
use crate::error::{CaptureError, PlatformError, StoreError};
use crate::message::Message;
use crate::storage::{ChromeStore, GroupStore, load_settings, save_settings};
use crate::tab_data::{Group, now_display};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// Pause between closing tabs and notifying the manager page
const NOTIFY_DELAY: Duration = Duration::from_millis(150);

/// Browser calls the background worker makes
#[allow(async_fn_in_trait)]
pub trait Browser {
    fn manage_url(&self) -> String;
    /// Tabs of `window_id`, or of the current window
    async fn window_tabs(&self, window_id: Option<i32>) -> Result<Vec<BrowserTab>, PlatformError>;
    async fn active_tab(&self) -> Result<Option<BrowserTab>, PlatformError>;
    async fn close_tabs(&self, ids: &[i32]) -> Result<(), PlatformError>;
    /// Makes sure the pinned manager page exists, focusing it when `activate`
    async fn show_manager(&self, activate: bool, creating: bool) -> Result<(), PlatformError>;
    async fn notify_manager(&self, message: &Message) -> Result<(), PlatformError>;
    fn open_options(&self);
    async fn pause(&self, duration: Duration);
}

async fn show_manager<B: Browser>(browser: &B, activate: bool, creating: bool) {
    if let Err(e) = browser.show_manager(activate, creating).await {
        warn!("Could not show the manager page: {}", e);
    }
}

/// Archives `tabs` as a new group, closes them and refreshes the manager page.
/// Returns the stored list, or `None` when there was nothing to archive.
pub async fn save_and_refresh<B: Browser, S: GroupStore>(
    browser: &B,
    store: &S,
    tabs: Vec<BrowserTab>,
    activate_manager: bool,
    create_time: String,
) -> Result<Option<Vec<Group>>, StoreError> {
    if activate_manager {
        show_manager(browser, false, true).await;
    }
    if tabs.is_empty() {
        if activate_manager {
            show_manager(browser, true, false).await;
        }
        return Ok(None);
    }

    let group = Group::capture(tabs.iter().map(BrowserTab::to_record).collect(), create_time);
    let mut groups = store.load().await?;
    groups.insert(0, group);
    store.save(&groups).await?;
    info!("Archived {} tabs", tabs.len());

    let ids: Vec<i32> = tabs.iter().filter_map(|t| t.id).collect();
    if let Err(e) = browser.close_tabs(&ids).await {
        warn!("{}", e);
    }

    browser.pause(NOTIFY_DELAY).await;
    let update = Message::Update { groups: groups.clone() };
    if let Err(e) = browser.notify_manager(&update).await {
        // the manager page is often just not open
        debug!("Manager page not notified: {}", e);
    }

    if activate_manager {
        show_manager(browser, true, false).await;
    }
    Ok(Some(groups))
}

/// Resolves which tabs `capture` means and archives them
pub async fn archive<B: Browser, S: GroupStore>(
    browser: &B,
    store: &S,
    capture: Capture,
    clicked: Option<BrowserTab>,
) -> Result<Option<Vec<Group>>, CaptureError> {
    let manage_url = browser.manage_url();
    let candidates = match capture {
        Capture::CurrentTab => match clicked.filter(|t| t.id.is_some()) {
            Some(tab) => vec![tab],
            None => browser.active_tab().await?.into_iter().collect(),
        },
        Capture::Window => {
            browser
                .window_tabs(clicked.and_then(|t| t.window_id))
                .await?
        }
    };
    let tabs = capturable(candidates, &manage_url);

    Ok(save_and_refresh(browser, store, tabs, capture.activates_manager(), now_display()).await?)
}

pub async fn run_menu_command<B: Browser, S: GroupStore>(
    browser: &B,
    store: &S,
    command: MenuCommand,
    tab: Option<BrowserTab>,
) -> Result<(), CaptureError> {
    match command {
        MenuCommand::OpenManager => browser.show_manager(true, false).await?,
        MenuCommand::OpenOptions => browser.open_options(),
        MenuCommand::SaveCurrentTab => {
            if tab.as_ref().is_some_and(|t| t.id.is_some()) {
                archive(browser, store, Capture::CurrentTab, tab).await?;
            } else {
                warn!("\"{}\" clicked without a tab", command.id());
            }
        }
        MenuCommand::SaveAllTabs => {
            archive(browser, store, Capture::Window, tab).await?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    window_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_window: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<bool>,
}

/// `chrome.tabs`, `chrome.windows` and `chrome.runtime`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeBrowser;

impl ChromeBrowser {
    async fn query(&self, query: TabQuery) -> Result<Vec<BrowserTab>, PlatformError> {
        let query = serde_wasm_bindgen::to_value(&query)
            .map_err(|e| PlatformError::QueryTabs(e.to_string()))?;
        let tabs = bridge::queryTabs(query)
            .await
            .map_err(|e| PlatformError::QueryTabs(bridge::describe(&e)))?;
        serde_wasm_bindgen::from_value(tabs).map_err(|e| PlatformError::QueryTabs(e.to_string()))
    }
}

impl Browser for ChromeBrowser {
    fn manage_url(&self) -> String {
        bridge::managePageUrl()
    }

    async fn window_tabs(&self, window_id: Option<i32>) -> Result<Vec<BrowserTab>, PlatformError> {
        self.query(TabQuery {
            window_id,
            current_window: window_id.is_none().then_some(true),
            active: None,
        })
        .await
    }

    async fn active_tab(&self) -> Result<Option<BrowserTab>, PlatformError> {
        let tabs = self
            .query(TabQuery {
                window_id: None,
                current_window: Some(true),
                active: Some(true),
            })
            .await?;
        Ok(tabs.into_iter().next())
    }

    async fn close_tabs(&self, ids: &[i32]) -> Result<(), PlatformError> {
        let ids = serde_wasm_bindgen::to_value(ids)
            .map_err(|e| PlatformError::CloseTabs(e.to_string()))?;
        bridge::closeTabs(ids)
            .await
            .map_err(|e| PlatformError::CloseTabs(bridge::describe(&e)))
    }

    async fn show_manager(&self, activate: bool, creating: bool) -> Result<(), PlatformError> {
        bridge::ensureManagePage(activate, creating)
            .await
            .map_err(|e| PlatformError::OpenTab {
                url: self.manage_url(),
                reason: bridge::describe(&e),
            })
    }

    async fn notify_manager(&self, message: &Message) -> Result<(), PlatformError> {
        let message = message
            .to_js()
            .map_err(|e| PlatformError::Message(e.to_string()))?;
        bridge::sendToManagePage(message)
            .await
            .map(|_| ())
            .map_err(|e| PlatformError::Message(bridge::describe(&e)))
    }

    fn open_options(&self) {
        bridge::openOptionsPage();
    }

    async fn pause(&self, duration: Duration) {
        yew::platform::time::sleep(duration).await;
    }
}

async fn on_action_clicked(tab: JsValue) {
    let settings = load_settings().await.unwrap_or_else(|e| {
        warn!("{}; using default settings", e);
        Default::default()
    });
    let clicked = serde_wasm_bindgen::from_value::<BrowserTab>(tab).ok();
    let capture = Capture::for_icon(settings.icon_action);

    if let Err(e) = archive(&ChromeBrowser, &ChromeStore, capture, clicked).await {
        error!("Archiving failed: {}", e);
    }
}

async fn on_menu_clicked(id: JsValue, tab: JsValue) {
    let Some(command) = id.as_string().as_deref().and_then(MenuCommand::from_id) else {
        debug!("Ignoring unknown menu item {:?}", id);
        return;
    };
    let tab = serde_wasm_bindgen::from_value::<Option<BrowserTab>>(tab)
        .ok()
        .flatten();

    if let Err(e) = run_menu_command(&ChromeBrowser, &ChromeStore, command, tab).await {
        error!("Menu command {} failed: {}", command.id(), e);
    }
}

/// Writes the merged settings back so new keys get their defaults, then
/// recreates the context menus
async fn on_installed(reason: JsValue) {
    info!("Installed ({})", reason.as_string().unwrap_or_default());
    match load_settings().await {
        Ok(settings) => {
            if let Err(e) = save_settings(&settings).await {
                error!("{}", e);
            }
        }
        Err(e) => error!("{}", e),
    }
    match serde_wasm_bindgen::to_value(&menu_items()) {
        Ok(items) => bridge::createContextMenus(items),
        Err(e) => error!("Could not build context menus: {}", e),
    }
}

/// Registers the worker's event listeners
pub fn start() {
    let clicked = Closure::<dyn Fn(JsValue)>::new(|tab: JsValue| {
        spawn_local(on_action_clicked(tab));
    });
    bridge::onActionClicked(clicked.as_ref().unchecked_ref());
    clicked.forget();

    let menu = Closure::<dyn Fn(JsValue, JsValue)>::new(|id: JsValue, tab: JsValue| {
        spawn_local(on_menu_clicked(id, tab));
    });
    bridge::onMenuClicked(menu.as_ref().unchecked_ref());
    menu.forget();

    let installed = Closure::<dyn Fn(JsValue)>::new(|reason: JsValue| {
        spawn_local(on_installed(reason));
    });
    bridge::onInstalled(installed.as_ref().unchecked_ref());
    installed.forget();
}
