/// Tab Shelf - archive browser tabs into named groups and restore them later
/// Built with Rust + WASM + Yew

mod background;
mod bridge;
mod cache;
mod capture;
mod error;
mod message;
mod operations;
mod platform;
mod render;
mod search;
mod settings;
mod storage;
mod sync;
mod tab_data;
mod transfer;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the manager page
#[wasm_bindgen]
pub fn start_manager() {
    yew::Renderer::<ui::manager::ManagerPage>::new().render();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

// Register the service worker's browser event listeners
#[wasm_bindgen]
pub fn start_background() {
    background::start();
}
