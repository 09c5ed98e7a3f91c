/// Imports from the extension's JS bridge module.
/// Every `chrome.*` call the crate makes goes through one of these.
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    pub fn managePageUrl() -> String;

    #[wasm_bindgen(catch)]
    pub async fn getLocal(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn setLocal(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn getSyncSettings(defaults: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn setSyncSettings(settings: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn createTab(url: &str, active: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn queryTabs(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn closeTabs(ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn ensureManagePage(activate: bool, creating: bool) -> Result<(), JsValue>;

    pub fn openOptionsPage();

    #[wasm_bindgen(catch)]
    pub async fn sendToManagePage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn broadcast(message: JsValue) -> Result<JsValue, JsValue>;

    pub fn onMessage(handler: &js_sys::Function);

    pub fn onActionClicked(handler: &js_sys::Function);

    pub fn onMenuClicked(handler: &js_sys::Function);

    pub fn onInstalled(handler: &js_sys::Function);

    pub fn createContextMenus(items: JsValue);

    pub fn downloadFile(filename: &str, content: &str, mime: &str);

    #[wasm_bindgen(catch)]
    pub async fn copyToClipboard(text: &str) -> Result<(), JsValue>;
}

/// Readable text for a rejected promise value
pub fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
