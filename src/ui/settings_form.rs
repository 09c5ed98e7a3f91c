/// The settings form shared by the options page and the manager's settings dialog

use crate::settings::{IconAction, Settings, ThemePreference, Toggle};
use web_sys::HtmlInputElement;
use yew::prelude::*;

const THEMES: [(ThemePreference, &str); 3] = [
    (ThemePreference::System, "Follow system"),
    (ThemePreference::Light, "Light"),
    (ThemePreference::Dark, "Dark"),
];

const ICON_ACTIONS: [(IconAction, &str); 2] = [
    (IconAction::SaveAllInWindow, "Archive every tab in the window"),
    (IconAction::SaveCurrentTab, "Archive only the current tab"),
];

#[derive(Properties, PartialEq)]
pub struct SettingsFormProps {
    pub settings: Settings,
    /// Emits the whole edited settings value
    pub onchange: Callback<Settings>,
    /// Keeps radio names unique when two forms share a page
    #[prop_or(AttrValue::Static("settings"))]
    pub name_prefix: AttrValue,
}

#[function_component(SettingsForm)]
pub fn settings_form(props: &SettingsFormProps) -> Html {
    let settings = &props.settings;

    let toggle_row = |toggle: Toggle| {
        let onchange = {
            let settings = settings.clone();
            let emit = props.onchange.clone();
            Callback::from(move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                let mut edited = settings.clone();
                toggle.set(&mut edited, input.checked());
                emit.emit(edited);
            })
        };
        html! {
            <label key={toggle.label()} class="setting-row">
                <input type="checkbox" checked={toggle.get(settings)} {onchange} />
                <span>{toggle.label()}</span>
            </label>
        }
    };

    let theme_name = format!("{}-theme", props.name_prefix);
    let theme_row = |(theme, label): (ThemePreference, &'static str)| {
        let onchange = {
            let settings = settings.clone();
            let emit = props.onchange.clone();
            Callback::from(move |_: Event| {
                emit.emit(Settings {
                    theme_preference: theme,
                    ..settings.clone()
                });
            })
        };
        html! {
            <label key={theme.as_str()} class="setting-row">
                <input
                    type="radio"
                    name={theme_name.clone()}
                    value={theme.as_str()}
                    checked={settings.theme_preference == theme}
                    {onchange}
                />
                <span>{label}</span>
            </label>
        }
    };

    let icon_name = format!("{}-icon-action", props.name_prefix);
    let icon_row = |(action, label): (IconAction, &'static str)| {
        let onchange = {
            let settings = settings.clone();
            let emit = props.onchange.clone();
            Callback::from(move |_: Event| {
                emit.emit(Settings {
                    icon_action: action,
                    ..settings.clone()
                });
            })
        };
        html! {
            <label key={action.as_str()} class="setting-row">
                <input
                    type="radio"
                    name={icon_name.clone()}
                    value={action.as_str()}
                    checked={settings.icon_action == action}
                    {onchange}
                />
                <span>{label}</span>
            </label>
        }
    };

    html! {
        <div class="settings-form">
            <section class="settings-section">
                <h3>{"Theme"}</h3>
                {for THEMES.into_iter().map(theme_row)}
            </section>
            <section class="settings-section">
                <h3>{"Toolbar icon"}</h3>
                {for ICON_ACTIONS.into_iter().map(icon_row)}
            </section>
            <section class="settings-section">
                <h3>{"Interface"}</h3>
                {for Toggle::ALL.into_iter().map(toggle_row)}
            </section>
        </div>
    }
}
