/// Standalone options page

use crate::message::Message;
use crate::operations::Notice;
use crate::platform;
use crate::settings::Settings;
use crate::storage::{load_settings, save_settings};
use crate::ui::components::alert_type;
use crate::ui::settings_form::SettingsForm;
use crate::ui::use_theme;
use log::{debug, error, warn};
use patternfly_yew::prelude::*;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;
use yew::platform::time::sleep;
use yew::prelude::*;

const STATUS_LIFETIME: Duration = Duration::from_secs(3);

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let form = use_state(|| None::<Settings>);
    let status = use_state(|| None::<Notice>);
    let status_generation = use_mut_ref(|| 0u64);

    let theme = (*form)
        .as_ref()
        .map(|settings| settings.theme_preference)
        .unwrap_or_default();
    use_theme(theme);

    {
        let form = form.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let loaded = load_settings().await.unwrap_or_else(|e| {
                    warn!("Showing defaults: {}", e);
                    Settings::default()
                });
                form.set(Some(loaded));
            });
            || ()
        });
    }

    // Shows `notice`, clearing it after a few seconds unless a newer one replaced it
    let set_status = {
        let status = status.clone();
        let generation = status_generation.clone();
        move |notice: Notice| {
            let current = {
                let mut generation = generation.borrow_mut();
                *generation += 1;
                *generation
            };
            status.set(Some(notice));

            let status = status.clone();
            let generation = generation.clone();
            spawn_local(async move {
                sleep(STATUS_LIFETIME).await;
                if *generation.borrow() == current {
                    status.set(None);
                }
            });
        }
    };

    let on_change = {
        let form = form.clone();
        Callback::from(move |edited: Settings| form.set(Some(edited)))
    };

    let on_save = {
        let form = form.clone();
        let set_status = set_status.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(settings) = (*form).clone() else {
                return;
            };
            let set_status = set_status.clone();
            spawn_local(async move {
                match save_settings(&settings).await {
                    Ok(()) => {
                        set_status(Notice::success("Settings saved"));
                        if let Err(e) = platform::broadcast(&Message::SettingsUpdated { settings }).await {
                            debug!("{}", e);
                        }
                    }
                    Err(e) => {
                        error!("{}", e);
                        set_status(Notice::error(e.to_string()));
                    }
                }
            });
        })
    };

    // Defaults only fill the form; nothing is stored until Save
    let on_restore = {
        let form = form.clone();
        Callback::from(move |_: MouseEvent| {
            form.set(Some(Settings::default()));
            set_status(Notice::info("Defaults loaded. Press Save to keep them."));
        })
    };

    html! {
        <div class="options-page">
            <h1 class="main-title">{"Tab Shelf settings"}</h1>
            {match &*form {
                None => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                Some(settings) => html! {
                    <>
                        <SettingsForm settings={settings.clone()} onchange={on_change} name_prefix="options" />
                        <div class="options-actions">
                            <Button onclick={on_restore} variant={ButtonVariant::Secondary}>{"Restore defaults"}</Button>
                            <Button onclick={on_save}>{"Save"}</Button>
                        </div>
                    </>
                },
            }}
            if let Some(notice) = &*status {
                <Alert r#type={alert_type(notice.tone)} title={notice.text.clone()} inline={true}>
                </Alert>
            }
        </div>
    }
}
