/// One archived group: header, buttons and tab rows

use crate::cache::GroupCache;
use crate::operations::Action;
use crate::render::{GroupView, TabView, TabsView};
use crate::transfer::Format;
use crate::ui::components::{Dropdown, MenuEntry, highlighted};
use patternfly_yew::prelude::*;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// What is being dragged. Groups are named by id so a drop still lands on the
/// right group after the list shifts under the drag.
#[derive(Debug, Clone, PartialEq)]
pub enum Drag {
    Tab { group_id: String, tab: usize },
    Group { group_id: String },
}

impl Drag {
    /// Id of the group the drag started from; search keeps it on screen
    pub fn group_id(&self) -> &str {
        match self {
            Drag::Tab { group_id, .. } | Drag::Group { group_id } => group_id,
        }
    }

    /// The action a drop on group `target_id` performs, if both groups still exist
    pub fn drop_on(&self, cache: &GroupCache, target_id: &str) -> Option<Action> {
        let source = cache.position_of(self.group_id())?;
        let target = cache.position_of(target_id)?;
        match self {
            Drag::Tab { tab, .. } => Some(Action::MoveTab {
                group: source,
                tab: *tab,
                target,
            }),
            Drag::Group { .. } if source != target => Some(Action::MergeGroup { source, target }),
            Drag::Group { .. } => None,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct GroupCardProps {
    pub view: GroupView,
    /// Draft name while this group's title is being edited
    #[prop_or_default]
    pub editing: Option<String>,
    pub on_action: Callback<Action>,
    pub on_export: Callback<(usize, Format)>,
    pub on_start_edit: Callback<(usize, String)>,
    pub on_edit_input: Callback<String>,
    pub on_commit_edit: Callback<()>,
    pub on_cancel_edit: Callback<()>,
    pub on_drag_start: Callback<Drag>,
    pub on_drag_end: Callback<()>,
    pub on_drop: Callback<String>,
}

#[function_component(GroupCard)]
pub fn group_card(props: &GroupCardProps) -> Html {
    let view = &props.view;
    let index = view.group_index;
    let drag_over = use_state(|| false);
    let input_ref = use_node_ref();

    {
        let input_ref = input_ref.clone();
        use_effect_with(props.editing.is_some(), move |editing| {
            if *editing {
                if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                    let _ = input.focus();
                    input.select();
                }
            }
            || ()
        });
    }

    let on_drag_over = {
        let drag_over = drag_over.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            if !*drag_over {
                drag_over.set(true);
            }
        })
    };

    let on_drag_leave = {
        let drag_over = drag_over.clone();
        Callback::from(move |_: DragEvent| drag_over.set(false))
    };

    let on_drop = {
        let drag_over = drag_over.clone();
        let on_drop = props.on_drop.clone();
        let group_id = view.key.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            drag_over.set(false);
            on_drop.emit(group_id.clone());
        })
    };

    let on_header_drag_start = {
        let on_drag_start = props.on_drag_start.clone();
        let group_id = view.key.clone();
        let name = view.name.clone();
        Callback::from(move |e: DragEvent| {
            if let Some(transfer) = e.data_transfer() {
                transfer.set_effect_allowed("move");
                let _ = transfer.set_data("text/plain", &name);
            }
            on_drag_start.emit(Drag::Group {
                group_id: group_id.clone(),
            });
        })
    };

    let title = if let Some(draft) = &props.editing {
        let on_input = {
            let on_edit_input = props.on_edit_input.clone();
            Callback::from(move |e: InputEvent| {
                if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                    on_edit_input.emit(input.value());
                }
            })
        };
        let on_keydown = {
            let commit = props.on_commit_edit.clone();
            let cancel = props.on_cancel_edit.clone();
            Callback::from(move |e: KeyboardEvent| match e.key().as_str() {
                "Enter" => {
                    e.prevent_default();
                    commit.emit(());
                }
                "Escape" => {
                    e.prevent_default();
                    cancel.emit(());
                }
                _ => {}
            })
        };
        html! {
            <input
                ref={input_ref}
                type="text"
                class="group-title-input"
                value={draft.clone()}
                oninput={on_input}
                onkeydown={on_keydown}
                onblur={props.on_commit_edit.reform(|_: FocusEvent| ())}
            />
        }
    } else {
        let on_dblclick = props.on_start_edit.reform({
            let name = view.name.clone();
            move |_: MouseEvent| (index, name.clone())
        });
        html! {
            <h3 class="group-title" title="Double-click to rename" ondblclick={on_dblclick}>
                {highlighted(&view.name_segments)}
            </h3>
        }
    };

    let export_entries: Vec<MenuEntry> = [Format::Json, Format::Markdown, Format::Html]
        .into_iter()
        .map(|format| MenuEntry {
            label: format.label(),
            onselect: props.on_export.reform(move |_| (index, format)),
        })
        .collect();

    let class = classes!("group-card", (*drag_over).then_some("drag-over"));

    html! {
        <div
            {class}
            ondragover={on_drag_over}
            ondragleave={on_drag_leave}
            ondrop={on_drop}
        >
            <div
                class="group-header"
                draggable={if view.draggable && props.editing.is_none() { "true" } else { "false" }}
                ondragstart={on_header_drag_start}
                ondragend={props.on_drag_end.reform(|_: DragEvent| ())}
            >
                <div class="group-title-container">
                    {title}
                    <span class="group-meta" title={view.created_tooltip.clone()}>
                        {format!("{} tabs", view.tab_count)}
                    </span>
                </div>
                <div class="group-actions">
                    if view.buttons.open {
                        <Button
                            onclick={props.on_action.reform(move |_| Action::OpenGroup { group: index })}
                            size={ButtonSize::Small}
                        >
                            {"Open all"}
                        </Button>
                    }
                    if view.buttons.export {
                        <Dropdown label="Export" entries={export_entries} small={true} />
                    }
                    if view.buttons.delete {
                        <Button
                            onclick={props.on_action.reform(move |_| Action::DeleteGroup { group: index })}
                            variant={ButtonVariant::Danger}
                            size={ButtonSize::Small}
                        >
                            {"Delete"}
                        </Button>
                    }
                </div>
            </div>
            {match &view.tabs {
                TabsView::Rows(rows) => html! {
                    <ul class="tab-list">
                        {for rows.iter().map(|tab| html! {
                            <TabRow
                                key={format!("{}-{}", view.key, tab.tab_index)}
                                tab={tab.clone()}
                                group_id={view.key.clone()}
                                on_action={props.on_action.clone()}
                                on_drag_start={props.on_drag_start.clone()}
                                on_drag_end={props.on_drag_end.clone()}
                            />
                        })}
                    </ul>
                },
                TabsView::Hint(hint) => html! {
                    <p class="group-hint">{*hint}</p>
                },
            }}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct TabRowProps {
    tab: TabView,
    group_id: String,
    on_action: Callback<Action>,
    on_drag_start: Callback<Drag>,
    on_drag_end: Callback<()>,
}

#[function_component(TabRow)]
fn tab_row(props: &TabRowProps) -> Html {
    let tab = &props.tab;
    let group = tab.group_index;
    let index = tab.tab_index;

    let on_open = props
        .on_action
        .reform(move |_: MouseEvent| Action::OpenTab { group, tab: index });

    let on_delete = {
        let on_action = props.on_action.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_action.emit(Action::DeleteTab { group, tab: index });
        })
    };

    let on_drag_start = {
        let on_drag_start = props.on_drag_start.clone();
        let group_id = props.group_id.clone();
        let tooltip = tab.tooltip.clone();
        Callback::from(move |e: DragEvent| {
            e.stop_propagation();
            if let Some(transfer) = e.data_transfer() {
                transfer.set_effect_allowed("move");
                let _ = transfer.set_data("text/plain", &tooltip);
            }
            on_drag_start.emit(Drag::Tab {
                group_id: group_id.clone(),
                tab: index,
            });
        })
    };

    html! {
        <li
            class="tab-item"
            title={tab.tooltip.clone()}
            draggable={if tab.draggable { "true" } else { "false" }}
            onclick={on_open}
            ondragstart={on_drag_start}
            ondragend={props.on_drag_end.reform(|_: DragEvent| ())}
        >
            <img class="tab-favicon" src={tab.favicon.clone()} alt="" width="16" height="16" />
            <div class="tab-content">
                <div class="tab-title">{highlighted(&tab.title)}</div>
                <div class="tab-url">{highlighted(&tab.url)}</div>
            </div>
            <button class="tab-delete" title="Remove from archive" onclick={on_delete}>{"×"}</button>
        </li>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab_data::{Group, TabRecord};

    fn shelf(ids: &[&str]) -> GroupCache {
        GroupCache::from_groups(
            ids.iter()
                .map(|id| Group {
                    id: id.to_string(),
                    create_time: "1/1/2024, 9:00:00 AM".to_string(),
                    custom_name: String::new(),
                    tabs: vec![TabRecord::new("Docs", "https://docs.rs", "")],
                })
                .collect(),
        )
    }

    fn group_drag(group_id: &str) -> Drag {
        Drag::Group {
            group_id: group_id.to_string(),
        }
    }

    #[test]
    fn test_tab_drop_moves_tab() {
        let cache = shelf(&["a", "b"]);
        let drag = Drag::Tab {
            group_id: "a".to_string(),
            tab: 2,
        };

        assert_eq!(
            drag.drop_on(&cache, "b"),
            Some(Action::MoveTab {
                group: 0,
                tab: 2,
                target: 1
            })
        );
    }

    #[test]
    fn test_group_drop_merges() {
        let cache = shelf(&["a", "b", "c", "d"]);
        assert_eq!(
            group_drag("d").drop_on(&cache, "a"),
            Some(Action::MergeGroup { source: 3, target: 0 })
        );
    }

    #[test]
    fn test_group_dropped_on_itself_does_nothing() {
        let cache = shelf(&["a", "b"]);
        assert_eq!(group_drag("b").drop_on(&cache, "b"), None);
    }

    #[test]
    fn test_drop_follows_groups_after_list_shifts() {
        let drag = group_drag("b");
        // a window archived from the toolbar lands on top mid-drag
        let mut cache = shelf(&["a", "b", "c"]);
        cache.prepend(shelf(&["new"]).snapshot().remove(0));

        assert_eq!(
            drag.drop_on(&cache, "c"),
            Some(Action::MergeGroup { source: 2, target: 3 })
        );
    }

    #[test]
    fn test_drop_involving_vanished_group_does_nothing() {
        let cache = shelf(&["a", "b"]);
        assert_eq!(group_drag("gone").drop_on(&cache, "a"), None);
        assert_eq!(group_drag("a").drop_on(&cache, "gone"), None);
    }
}
