/// UI module exports
use crate::settings::ThemePreference;
use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::MediaQueryList;
use yew::prelude::*;

pub mod components;
pub mod group_card;
pub mod manager;
pub mod options;
pub mod settings_form;

const DARK_CLASS: &str = "dark-mode";

fn dark_scheme_query() -> Option<MediaQueryList> {
    web_sys::window()?
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
}

/// Sets or clears the dark palette class on the document root
pub fn apply_theme(preference: ThemePreference) {
    let system_dark = dark_scheme_query().is_some_and(|query| query.matches());
    let Some(root) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element())
    else {
        return;
    };

    let classes = root.class_list();
    let result = if preference.is_dark(system_dark) {
        classes.add_1(DARK_CLASS)
    } else {
        classes.remove_1(DARK_CLASS)
    };
    if let Err(e) = result {
        warn!("Failed to apply theme: {:?}", e);
    }
}

/// Applies `preference`, following the system scheme while it is `System`
#[hook]
pub fn use_theme(preference: ThemePreference) {
    use_effect_with(preference, |preference| {
        let preference = *preference;
        apply_theme(preference);

        let listener = if preference == ThemePreference::System {
            dark_scheme_query().map(|query| {
                let on_change = Closure::<dyn Fn()>::new(move || apply_theme(preference));
                if let Err(e) =
                    query.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
                {
                    warn!("Cannot follow the system theme: {:?}", e);
                }
                (query, on_change)
            })
        } else {
            None
        };

        move || {
            if let Some((query, on_change)) = listener {
                let _ = query
                    .remove_event_listener_with_callback("change", on_change.as_ref().unchecked_ref());
            }
        }
    });
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn root_is_dark() -> bool {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
            .is_some_and(|root| root.class_list().contains(DARK_CLASS))
    }

    #[wasm_bindgen_test]
    fn test_explicit_theme_sets_root_class() {
        apply_theme(ThemePreference::Dark);
        assert!(root_is_dark());

        apply_theme(ThemePreference::Light);
        assert!(!root_is_dark());
    }
}
