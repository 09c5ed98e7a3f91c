/// Reusable UI components

use crate::operations::{Notice, Tone};
use crate::search::Segment;
use crate::settings::TOAST_LIFETIME;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Visible toasts, oldest first. All share one lifetime, so they expire in order.
#[derive(Debug, Default, PartialEq)]
pub struct Toasts {
    next_id: u64,
    items: Vec<(u64, Notice)>,
}

impl Toasts {
    pub fn items(&self) -> &[(u64, Notice)] {
        &self.items
    }
}

pub enum ToastAction {
    Push(Notice),
    Expire,
}

impl Reducible for Toasts {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut items = self.items.clone();
        let mut next_id = self.next_id;
        match action {
            ToastAction::Push(notice) => {
                items.push((next_id, notice));
                next_id += 1;
            }
            ToastAction::Expire => {
                if !items.is_empty() {
                    items.remove(0);
                }
            }
        }
        Rc::new(Toasts { next_id, items })
    }
}

pub fn show_toast(toasts: &UseReducerDispatcher<Toasts>, notice: Notice) {
    toasts.dispatch(ToastAction::Push(notice));
    let toasts = toasts.clone();
    spawn_local(async move {
        yew::platform::time::sleep(TOAST_LIFETIME).await;
        toasts.dispatch(ToastAction::Expire);
    });
}

pub fn alert_type(tone: Tone) -> AlertType {
    match tone {
        Tone::Success => AlertType::Success,
        Tone::Info => AlertType::Info,
        Tone::Warning => AlertType::Warning,
        Tone::Error => AlertType::Danger,
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastStackProps {
    pub items: Vec<(u64, Notice)>,
}

#[function_component(ToastStack)]
pub fn toast_stack(props: &ToastStackProps) -> Html {
    html! {
        <div class="toast-stack" aria-live="polite">
            {for props.items.iter().map(|(id, notice)| html! {
                <div key={*id} class="toast">
                    <Alert r#type={alert_type(notice.tone)} title={notice.text.clone()} inline={true}>
                    </Alert>
                </div>
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub title: AttrValue,
    pub onclose: Callback<()>,
    #[prop_or_default]
    pub children: Html,
    #[prop_or_default]
    pub footer: Html,
}

/// Dialog over a backdrop. Escape or a backdrop click closes it.
#[function_component(Modal)]
pub fn modal(props: &ModalProps) -> Html {
    let on_backdrop = props.onclose.reform(|_: MouseEvent| ());
    let on_close_button = props.onclose.reform(|_: MouseEvent| ());
    let on_keydown = {
        let onclose = props.onclose.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                onclose.emit(());
            }
        })
    };

    html! {
        <div class="modal-backdrop" onclick={on_backdrop}>
            <div
                class="modal-box"
                role="dialog"
                aria-modal="true"
                tabindex="-1"
                onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}
                onkeydown={on_keydown}
            >
                <div class="modal-header">
                    <h2 class="modal-title">{props.title.clone()}</h2>
                    <button class="modal-close" aria-label="Close" onclick={on_close_button}>{"×"}</button>
                </div>
                <div class="modal-body">{props.children.clone()}</div>
                <div class="modal-footer">{props.footer.clone()}</div>
            </div>
        </div>
    }
}

#[derive(Clone, PartialEq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub onselect: Callback<()>,
}

#[derive(Properties, PartialEq)]
pub struct DropdownProps {
    pub label: AttrValue,
    pub entries: Vec<MenuEntry>,
    #[prop_or_default]
    pub small: bool,
}

#[function_component(Dropdown)]
pub fn dropdown(props: &DropdownProps) -> Html {
    let open = use_state(|| false);

    let toggle = {
        let open = open.clone();
        Callback::from(move |_: MouseEvent| open.set(!*open))
    };

    html! {
        <div class="dropdown">
            if props.small {
                <Button onclick={toggle} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {format!("{} ▾", props.label)}
                </Button>
            } else {
                <Button onclick={toggle} variant={ButtonVariant::Secondary}>
                    {format!("{} ▾", props.label)}
                </Button>
            }
            if *open {
                <ul class="dropdown-menu">
                    {for props.entries.iter().map(|entry| {
                        let open = open.clone();
                        let onselect = entry.onselect.clone();
                        html! {
                            <li key={entry.label}>
                                <button
                                    class="dropdown-item"
                                    onclick={Callback::from(move |_: MouseEvent| {
                                        open.set(false);
                                        onselect.emit(());
                                    })}
                                >
                                    {entry.label}
                                </button>
                            </li>
                        }
                    })}
                </ul>
            }
        </div>
    }
}

/// Text with the matched runs wrapped in `<mark>`
pub fn highlighted(segments: &[Segment]) -> Html {
    html! {
        {for segments.iter().map(|segment| {
            if segment.highlighted {
                html! { <mark class="search-highlight">{&segment.text}</mark> }
            } else {
                html! { {&segment.text} }
            }
        })}
    }
}
