/// Messages exchanged between the background worker and extension pages
use crate::settings::Settings;
use crate::tab_data::{Group, normalize_groups};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Fresh group list written by the background worker
    Update { groups: Vec<Group> },
    /// Settings saved from another page
    SettingsUpdated { settings: Settings },
    /// Settings reset to defaults from another page
    SettingsRestored,
}

impl Message {
    pub fn to_js(&self) -> Result<JsValue, serde_wasm_bindgen::Error> {
        serde_wasm_bindgen::to_value(self)
    }

    pub fn from_js(value: JsValue) -> Result<Message, serde_wasm_bindgen::Error> {
        serde_wasm_bindgen::from_value(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Response {
        Response {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Response {
        Response {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn to_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self).unwrap_or(JsValue::NULL)
    }
}

/// What the manager page must do for a received message
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    /// Replace the cache and re-render
    Groups(Vec<Group>),
    /// Apply these settings
    Settings(Settings),
    /// Re-read settings from storage
    ReloadSettings,
}

/// Incoming groups are normalized but not pruned; the next sync prunes them
pub fn receive(message: Message, now: &str) -> (Received, Response) {
    match message {
        Message::Update { groups } => (
            Received::Groups(normalize_groups(groups, now)),
            Response::ok("Manager page updated"),
        ),
        Message::SettingsUpdated { settings } => {
            (Received::Settings(settings), Response::ok("Settings applied"))
        }
        Message::SettingsRestored => (Received::ReloadSettings, Response::ok("Defaults applied")),
    }
}
