//! 見出し行コンポーネント

use inventory_table_common::{CheckState, ColumnId, SortDirection, TableState};
use leptos::prelude::*;

#[component]
pub fn TableHead<FA, FS>(
    state: ReadSignal<TableState>,
    on_select_all: FA,
    on_sort: FS,
) -> impl IntoView
where
    FA: Fn(()) + 'static + Clone + Send,
    FS: Fn(ColumnId) + 'static + Clone + Send,
{
    let checked = move || state.get().check_state == CheckState::Checked;
    let indeterminate = move || state.get().check_state == CheckState::Indeterminate;

    view! {
        <thead>
            <tr>
                <th class="cell-checkbox">
                    <input
                        type="checkbox"
                        aria-label="select all"
                        prop:checked=checked
                        prop:indeterminate=indeterminate
                        on:change=move |_| on_select_all(())
                    />
                </th>
                {move || {
                    let current = state.get();
                    current
                        .columns
                        .iter()
                        .map(|column| {
                            let id = column.id;
                            let on_sort = on_sort.clone();
                            let active = current.sort.key == id;
                            let arrow = match (active, current.sort.direction) {
                                (false, _) => "",
                                (true, SortDirection::Asc) => " ▲",
                                (true, SortDirection::Desc) => " ▼",
                            };
                            let class = match (column.numeric, column.disable_padding) {
                                (true, _) => "cell-numeric",
                                (false, true) => "cell-dense",
                                (false, false) => "cell",
                            };
                            let description = current.sort_description(column).unwrap_or_default();
                            view! {
                                <th class=class>
                                    <button
                                        class="sort-label"
                                        on:click=move |_| on_sort(id)
                                    >
                                        {column.label}
                                        {arrow}
                                    </button>
                                    <span class="visually-hidden">{description}</span>
                                </th>
                            }
                        })
                        .collect_view()
                }}
            </tr>
        </thead>
    }
}
