/// The manager page: archived groups, search, import/export and settings

use crate::bridge;
use crate::cache::GroupCache;
use crate::error::ImportError;
use crate::message::{Message, Received, Response, receive};
use crate::operations::{Action, ActionError, Export, Notice, apply, export_all, export_group, open_urls, report};
use crate::platform::{self, ChromeHost};
use crate::render::{Body, RenderInput, render_page};
use crate::search::filter_groups;
use crate::settings::{SEARCH_DEBOUNCE, SYNC_DEBOUNCE, Settings};
use crate::storage::{ChromeStore, GroupStore, load_settings, save_settings};
use crate::sync::{Flush, SyncEngine, Ticket, flush_all};
use crate::tab_data::{normalize_groups, now_display};
use crate::transfer::{Format, file_stamp};
use crate::ui::components::{Dropdown, MenuEntry, Modal, ToastStack, Toasts, show_toast};
use crate::ui::group_card::{Drag, GroupCard};
use crate::ui::settings_form::SettingsForm;
use crate::ui::use_theme;
use log::{debug, error, info, warn};
use patternfly_yew::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{File, HtmlInputElement, HtmlTextAreaElement};
use yew::platform::time::sleep;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum Dialog {
    ConfirmDeleteAll,
    MarkdownImport,
    MarkdownExport(String),
    /// Holds the draft being edited
    Settings(Settings),
    ConfirmRestore,
}

/// Handles shared by every callback that touches the archive
#[derive(Clone)]
struct Page {
    cache: Rc<RefCell<GroupCache>>,
    engine: Rc<RefCell<SyncEngine>>,
    refresh: UseForceUpdateHandle,
    toasts: UseReducerDispatcher<Toasts>,
}

impl Page {
    fn notify(&self, notice: Notice) {
        show_toast(&self.toasts, notice);
    }

    /// Applies `action`, then syncs, re-renders and opens whatever it asks for
    fn run(&self, action: Action) {
        debug!("action {:?}", action);
        let result = apply(&mut self.cache.borrow_mut(), action);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.refresh.force_update();
                if let Some(notice) = report(e) {
                    self.notify(notice);
                }
                return;
            }
        };

        if outcome.persist {
            self.sync();
        }
        self.refresh.force_update();

        if outcome.open.is_empty() {
            if let Some(notice) = outcome.notice {
                self.notify(notice);
            }
        } else {
            let page = self.clone();
            spawn_local(async move {
                if let Some(notice) = open_urls(&ChromeHost, &outcome).await {
                    page.notify(notice);
                }
            });
        }
    }

    fn sync(&self) {
        let snapshot = self.cache.borrow().snapshot();
        let ticket = self.engine.borrow_mut().schedule(snapshot);
        spawn_local(self.clone().run_sync(ticket));
    }

    async fn run_sync(self, ticket: Ticket) {
        sleep(SYNC_DEBOUNCE).await;
        for flushed in flush_all(&self.engine, &ChromeStore, ticket).await {
            match flushed {
                Flush::Saved {
                    groups,
                    current: true,
                    ..
                } => {
                    self.cache.borrow_mut().replace(groups);
                    self.refresh.force_update();
                }
                Flush::Failed { error, .. } => {
                    self.notify(Notice::error(format!("Sync failed: {}", error)));
                }
                _ => {}
            }
        }
    }

    /// Markdown exports open in a dialog; other formats download
    fn deliver(&self, result: Result<Export, ActionError>, format: Format, dialog: &UseStateHandle<Option<Dialog>>) {
        match result {
            Ok(export) if format == Format::Markdown => {
                dialog.set(Some(Dialog::MarkdownExport(export.content)));
            }
            Ok(export) => {
                platform::download(&export.filename, &export.content, export.mime);
                self.notify(Notice::success(format!("{} download started", export.filename)));
            }
            Err(e) => {
                if let Some(notice) = report(e) {
                    self.notify(notice);
                }
            }
        }
    }
}

async fn read_file(file: &File) -> Result<String, ImportError> {
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| ImportError::Read(bridge::describe(&e)))?;
    text.as_string()
        .ok_or_else(|| ImportError::Read(format!("{} is not a text file", file.name())))
}

async fn reload_settings(settings: UseStateHandle<Settings>) {
    match load_settings().await {
        Ok(stored) => settings.set(stored),
        Err(e) => warn!("Keeping current settings: {}", e),
    }
}

#[function_component(ManagerPage)]
pub fn manager_page() -> Html {
    let toasts = use_reducer(Toasts::default);
    let page = Page {
        cache: use_mut_ref(GroupCache::new),
        engine: use_mut_ref(SyncEngine::default),
        refresh: use_force_update(),
        toasts: toasts.dispatcher(),
    };

    let loaded = use_state(|| false);
    let settings = use_state(Settings::default);
    let search_text = use_state(String::new);
    let query = use_state(String::new);
    let search_generation = use_mut_ref(|| 0u64);
    let editing = use_mut_ref(|| None::<(usize, String)>);
    let drag = use_mut_ref(|| None::<Drag>);
    let dialog = use_state(|| None::<Dialog>);
    let import_format = use_mut_ref(|| Format::Json);
    let file_input = use_node_ref();
    let markdown_input = use_node_ref();

    use_theme(settings.theme_preference);

    // Load the archive and settings on mount
    {
        let page = page.clone();
        let loaded = loaded.clone();
        let settings = settings.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match ChromeStore.load().await {
                    Ok(groups) => {
                        info!("Loaded {} groups", groups.len());
                        let groups = normalize_groups(groups, &now_display());
                        page.cache.borrow_mut().replace(groups);
                    }
                    Err(e) => {
                        error!("{}", e);
                        page.notify(Notice::error("Failed to load archived tabs"));
                    }
                }
                loaded.set(true);
                page.refresh.force_update();
            });
            spawn_local(reload_settings(settings));
            || ()
        });
    }

    // Messages from the background worker and the options page
    {
        let page = page.clone();
        let settings = settings.clone();

        use_effect_with((), move |_| {
            let handler = Closure::<dyn Fn(JsValue) -> JsValue>::new(move |value: JsValue| {
                let message = match Message::from_js(value) {
                    Ok(message) => message,
                    Err(e) => {
                        debug!("Ignoring message: {}", e);
                        return Response::failed("Unknown action").to_js();
                    }
                };
                let (received, response) = receive(message, &now_display());
                match received {
                    Received::Groups(groups) => {
                        // the worker already stored this list; queued edits predate it
                        page.engine.borrow_mut().rebase(groups.clone());
                        page.cache.borrow_mut().replace(groups);
                        page.refresh.force_update();
                    }
                    Received::Settings(updated) => settings.set(updated),
                    Received::ReloadSettings => spawn_local(reload_settings(settings.clone())),
                }
                response.to_js()
            });
            bridge::onMessage(handler.as_ref().unchecked_ref());
            handler.forget();
            || ()
        });
    }

    let on_search = {
        let search_text = search_text.clone();
        let query = query.clone();
        let generation = search_generation.clone();

        Callback::from(move |e: InputEvent| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let text = input.value();
            search_text.set(text.clone());

            let current = {
                let mut generation = generation.borrow_mut();
                *generation += 1;
                *generation
            };
            let query = query.clone();
            let generation = generation.clone();
            spawn_local(async move {
                sleep(SEARCH_DEBOUNCE).await;
                if *generation.borrow() == current {
                    query.set(text);
                }
            });
        })
    };

    let on_action = {
        let page = page.clone();
        Callback::from(move |action: Action| page.run(action))
    };

    let on_open_all = {
        let page = page.clone();
        Callback::from(move |_: MouseEvent| page.run(Action::OpenAll))
    };

    let on_delete_all = {
        let page = page.clone();
        let dialog = dialog.clone();
        Callback::from(move |_: MouseEvent| {
            if page.cache.borrow().is_empty() {
                page.run(Action::DeleteAll);
            } else {
                dialog.set(Some(Dialog::ConfirmDeleteAll));
            }
        })
    };

    let on_export_group = {
        let page = page.clone();
        let dialog = dialog.clone();
        Callback::from(move |(index, format): (usize, Format)| {
            let result = export_group(&page.cache.borrow(), index, format);
            page.deliver(result, format, &dialog);
        })
    };

    let export_entries: Vec<MenuEntry> = [Format::Json, Format::Markdown, Format::Html]
        .into_iter()
        .map(|format| {
            let page = page.clone();
            let dialog = dialog.clone();
            MenuEntry {
                label: format.label(),
                onselect: Callback::from(move |_| {
                    let result = export_all(&page.cache.borrow(), format, &file_stamp());
                    page.deliver(result, format, &dialog);
                }),
            }
        })
        .collect();

    let import_entries: Vec<MenuEntry> = {
        let paste = {
            let dialog = dialog.clone();
            MenuEntry {
                label: "Paste Markdown",
                onselect: Callback::from(move |_| dialog.set(Some(Dialog::MarkdownImport))),
            }
        };
        let pick = |format: Format, label: &'static str| {
            let file_input = file_input.clone();
            let import_format = import_format.clone();
            MenuEntry {
                label,
                onselect: Callback::from(move |_| {
                    *import_format.borrow_mut() = format;
                    if let Some(input) = file_input.cast::<HtmlInputElement>() {
                        input.set_accept(format.accept());
                        input.click();
                    }
                }),
            }
        };
        vec![
            paste,
            pick(Format::Json, "JSON file"),
            pick(Format::Markdown, "Markdown file"),
            pick(Format::Html, "HTML bookmarks file"),
        ]
    };

    let on_file_chosen = {
        let page = page.clone();
        let import_format = import_format.clone();

        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            input.set_value("");

            let format = *import_format.borrow();
            let page = page.clone();
            spawn_local(async move {
                match read_file(&file).await {
                    Ok(text) => page.run(Action::Import {
                        format,
                        text,
                        now: now_display(),
                    }),
                    Err(e) => page.notify(Notice::warning(e.to_string())),
                }
            });
        })
    };

    // Rename
    let on_start_edit = {
        let editing = editing.clone();
        let page = page.clone();
        Callback::from(move |(index, name): (usize, String)| {
            *editing.borrow_mut() = Some((index, name));
            page.refresh.force_update();
        })
    };

    let on_edit_input = {
        let editing = editing.clone();
        let page = page.clone();
        Callback::from(move |text: String| {
            if let Some((_, draft)) = editing.borrow_mut().as_mut() {
                *draft = text;
            }
            page.refresh.force_update();
        })
    };

    // Taking the draft makes the blur that follows Enter or Escape a no-op
    let on_commit_edit = {
        let editing = editing.clone();
        let page = page.clone();
        Callback::from(move |_: ()| {
            let taken = editing.borrow_mut().take();
            if let Some((group, name)) = taken {
                page.run(Action::Rename { group, name });
            }
        })
    };

    let on_cancel_edit = {
        let editing = editing.clone();
        let page = page.clone();
        Callback::from(move |_: ()| {
            editing.borrow_mut().take();
            page.refresh.force_update();
        })
    };

    // Drag and drop
    let on_drag_start = {
        let drag = drag.clone();
        Callback::from(move |started: Drag| {
            *drag.borrow_mut() = Some(started);
        })
    };

    let on_drag_end = {
        let drag = drag.clone();
        Callback::from(move |_: ()| {
            drag.borrow_mut().take();
        })
    };

    let on_drop = {
        let drag = drag.clone();
        let page = page.clone();
        Callback::from(move |target: String| {
            let taken = drag.borrow_mut().take();
            let action = taken.and_then(|d| d.drop_on(&page.cache.borrow(), &target));
            if let Some(action) = action {
                page.run(action);
            }
        })
    };

    // Dialogs
    let close_dialog = {
        let dialog = dialog.clone();
        Callback::from(move |_: ()| dialog.set(None))
    };

    let on_open_settings = {
        let dialog = dialog.clone();
        let settings = settings.clone();
        Callback::from(move |_: MouseEvent| dialog.set(Some(Dialog::Settings((*settings).clone()))))
    };

    let dialog_view = match &*dialog {
        None => html! {},
        Some(Dialog::ConfirmDeleteAll) => {
            let on_confirm = {
                let page = page.clone();
                let dialog = dialog.clone();
                Callback::from(move |_: MouseEvent| {
                    dialog.set(None);
                    page.run(Action::DeleteAll);
                })
            };
            let footer = html! {
                <>
                    <Button onclick={close_dialog.reform(|_: MouseEvent| ())} variant={ButtonVariant::Secondary}>{"Cancel"}</Button>
                    <Button onclick={on_confirm} variant={ButtonVariant::Danger}>{"Delete all"}</Button>
                </>
            };
            html! {
                <Modal title="Delete all groups?" onclose={close_dialog.clone()} {footer}>
                    <p>{"Every archived tab will be removed. This cannot be undone."}</p>
                </Modal>
            }
        }
        Some(Dialog::MarkdownImport) => {
            let on_import = {
                let page = page.clone();
                let dialog = dialog.clone();
                let markdown_input = markdown_input.clone();
                Callback::from(move |_: MouseEvent| {
                    let text = markdown_input
                        .cast::<HtmlTextAreaElement>()
                        .map(|area| area.value())
                        .unwrap_or_default();
                    dialog.set(None);
                    page.run(Action::Import {
                        format: Format::Markdown,
                        text,
                        now: now_display(),
                    });
                })
            };
            let footer = html! {
                <>
                    <Button onclick={close_dialog.reform(|_: MouseEvent| ())} variant={ButtonVariant::Secondary}>{"Cancel"}</Button>
                    <Button onclick={on_import}>{"Import"}</Button>
                </>
            };
            html! {
                <Modal title="Import from Markdown" onclose={close_dialog.clone()} {footer}>
                    <textarea
                        ref={markdown_input.clone()}
                        class="markdown-input"
                        rows="14"
                        placeholder={"### Group name\n- [Title](https://example.com)"}
                    />
                </Modal>
            }
        }
        Some(Dialog::MarkdownExport(content)) => {
            let on_copy = {
                let page = page.clone();
                let content = content.clone();
                Callback::from(move |_: MouseEvent| {
                    let page = page.clone();
                    let content = content.clone();
                    spawn_local(async move {
                        match platform::copy_to_clipboard(&content).await {
                            Ok(()) => page.notify(Notice::success("Copied to clipboard")),
                            Err(e) => {
                                error!("{}", e);
                                page.notify(Notice::error("Failed to copy to clipboard"));
                            }
                        }
                    });
                })
            };
            let footer = html! {
                <>
                    <Button onclick={close_dialog.reform(|_: MouseEvent| ())} variant={ButtonVariant::Secondary}>{"Close"}</Button>
                    <Button onclick={on_copy}>{"Copy"}</Button>
                </>
            };
            html! {
                <Modal title="Markdown export" onclose={close_dialog.clone()} {footer}>
                    <textarea class="markdown-output" rows="14" readonly={true} value={content.clone()} />
                </Modal>
            }
        }
        Some(Dialog::Settings(draft)) => {
            let on_change = {
                let dialog = dialog.clone();
                Callback::from(move |edited: Settings| dialog.set(Some(Dialog::Settings(edited))))
            };
            let on_save = {
                let page = page.clone();
                let dialog = dialog.clone();
                let settings = settings.clone();
                let draft = draft.clone();
                Callback::from(move |_: MouseEvent| {
                    dialog.set(None);
                    let page = page.clone();
                    let settings = settings.clone();
                    let draft = draft.clone();
                    spawn_local(async move {
                        if let Err(e) = save_settings(&draft).await {
                            error!("{}", e);
                            page.notify(Notice::error(e.to_string()));
                            return;
                        }
                        settings.set(draft.clone());
                        page.notify(Notice::success("Settings saved"));
                        if let Err(e) = platform::broadcast(&Message::SettingsUpdated { settings: draft }).await {
                            debug!("{}", e);
                        }
                    });
                })
            };
            let on_restore = {
                let dialog = dialog.clone();
                Callback::from(move |_: MouseEvent| dialog.set(Some(Dialog::ConfirmRestore)))
            };
            let footer = html! {
                <>
                    <Button onclick={on_restore} variant={ButtonVariant::Secondary}>{"Restore defaults"}</Button>
                    <Button onclick={close_dialog.reform(|_: MouseEvent| ())} variant={ButtonVariant::Secondary}>{"Cancel"}</Button>
                    <Button onclick={on_save}>{"Save"}</Button>
                </>
            };
            html! {
                <Modal title="Settings" onclose={close_dialog.clone()} {footer}>
                    <SettingsForm settings={draft.clone()} onchange={on_change} name_prefix="manager" />
                </Modal>
            }
        }
        Some(Dialog::ConfirmRestore) => {
            let on_confirm = {
                let page = page.clone();
                let dialog = dialog.clone();
                let settings = settings.clone();
                Callback::from(move |_: MouseEvent| {
                    dialog.set(None);
                    let page = page.clone();
                    let settings = settings.clone();
                    spawn_local(async move {
                        let defaults = Settings::default();
                        if let Err(e) = save_settings(&defaults).await {
                            error!("{}", e);
                            page.notify(Notice::error(e.to_string()));
                            return;
                        }
                        settings.set(defaults);
                        page.notify(Notice::success("Default settings restored"));
                        if let Err(e) = platform::broadcast(&Message::SettingsRestored).await {
                            debug!("{}", e);
                        }
                    });
                })
            };
            let footer = html! {
                <>
                    <Button onclick={close_dialog.reform(|_: MouseEvent| ())} variant={ButtonVariant::Secondary}>{"Cancel"}</Button>
                    <Button onclick={on_confirm} variant={ButtonVariant::Danger}>{"Restore"}</Button>
                </>
            };
            html! {
                <Modal title="Restore default settings?" onclose={close_dialog.clone()} {footer}>
                    <p>{"All settings return to their defaults. Archived tabs are not affected."}</p>
                </Modal>
            }
        }
    };

    // Hiding the search box also clears its filter
    let effective_query = if settings.show_header_search {
        (*query).clone()
    } else {
        String::new()
    };

    let view = {
        let cache = page.cache.borrow();
        let dragging = drag.borrow().as_ref().map(|d| d.group_id().to_string());
        let filtered = filter_groups(
            cache.groups(),
            &effective_query,
            settings.search_scope(),
            dragging.as_deref(),
        );
        render_page(&RenderInput {
            filtered: &filtered,
            total_tabs: cache.total_tabs(),
            settings: &*settings,
            query: &effective_query,
        })
    };

    let editing_now = editing.borrow().clone();

    let settings_class = classes!(
        "settings-toggle",
        settings.hover_to_show_settings_icon.then_some("hover-reveal")
    );

    html! {
        <div class="manager-page">
            <header class="page-header">
                <div class="brand">
                    <h1 class="main-title">{"Tab Shelf"}</h1>
                    <span class="tab-total">{format!("{} tabs", view.total_tabs)}</span>
                </div>
                if view.header.search {
                    <input
                        type="search"
                        class="search-input"
                        placeholder="Search groups and tabs..."
                        value={(*search_text).clone()}
                        oninput={on_search}
                    />
                }
                <div class="header-actions">
                    if view.header.open_all {
                        <Button onclick={on_open_all} variant={ButtonVariant::Secondary}>{"Open all"}</Button>
                    }
                    if view.header.delete_all {
                        <Button onclick={on_delete_all} variant={ButtonVariant::Danger}>{"Delete all"}</Button>
                    }
                    if view.header.export {
                        <Dropdown label="Export" entries={export_entries} />
                    }
                    if view.header.import {
                        <Dropdown label="Import" entries={import_entries} />
                    }
                    <button class={settings_class} title="Settings" onclick={on_open_settings}>{"⚙"}</button>
                </div>
            </header>

            <input
                ref={file_input}
                type="file"
                class="hidden-file-input"
                style="display: none"
                onchange={on_file_chosen}
            />

            if !*loaded {
                <div class="loading-text-center">
                    <Spinner />
                    <p class="loading-text">{"Loading archived tabs..."}</p>
                </div>
            } else {
                {match &view.body {
                    Body::Groups(groups) => html! {
                        <div class="groups-list">
                            {for groups.iter().map(|group| {
                                let draft = editing_now
                                    .as_ref()
                                    .filter(|(index, _)| *index == group.group_index)
                                    .map(|(_, draft)| draft.clone());
                                html! {
                                    <GroupCard
                                        key={group.key.clone()}
                                        view={group.clone()}
                                        editing={draft}
                                        on_action={on_action.clone()}
                                        on_export={on_export_group.clone()}
                                        on_start_edit={on_start_edit.clone()}
                                        on_edit_input={on_edit_input.clone()}
                                        on_commit_edit={on_commit_edit.clone()}
                                        on_cancel_edit={on_cancel_edit.clone()}
                                        on_drag_start={on_drag_start.clone()}
                                        on_drag_end={on_drag_end.clone()}
                                        on_drop={on_drop.clone()}
                                    />
                                }
                            })}
                        </div>
                    },
                    empty => html! {
                        <div class="empty-state">
                            <p>{empty.message().unwrap_or_default()}</p>
                        </div>
                    },
                }}
            }

            {dialog_view}
            <ToastStack items={toasts.items().to_vec()} />
        </div>
    }
}
