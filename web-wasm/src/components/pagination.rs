//! ページ送りコンポーネント

use inventory_table_common::TableState;
use leptos::prelude::*;

/// 「1-5 of 12」形式の表示
fn range_label(state: &TableState) -> String {
    let window = state.window;
    if window.total_row_count == 0 {
        return "0-0 of 0".to_string();
    }
    let first = window.page_index * window.page_size + 1;
    let last = (first + state.rows.len()).saturating_sub(1);
    format!("{}-{} of {}", first, last, window.total_row_count)
}

#[component]
pub fn TablePagination<FP, FS>(
    state: ReadSignal<TableState>,
    on_page: FP,
    on_page_size: FS,
) -> impl IntoView
where
    FP: Fn(usize) + 'static + Clone + Send,
    FS: Fn(usize) + 'static + Clone + Send,
{
    let on_prev = on_page.clone();
    let on_next = on_page;

    view! {
        <div class="pagination">
            <label>
                "Rows per page: "
                <select
                    prop:value=move || state.get().window.page_size.to_string()
                    on:change=move |ev| {
                        if let Ok(size) = event_target_value(&ev).parse::<usize>() {
                            on_page_size(size);
                        }
                    }
                >
                    {move || {
                        let current = state.get();
                        current
                            .page_size_options
                            .iter()
                            .map(|size| {
                                view! {
                                    <option
                                        value=size.to_string()
                                        selected=*size == current.window.page_size
                                    >
                                        {size.to_string()}
                                    </option>
                                }
                            })
                            .collect_view()
                    }}
                </select>
            </label>
            <span class="pagination-range">{move || range_label(&state.get())}</span>
            <button
                class="btn"
                disabled=move || state.get().window.page_index == 0
                on:click=move |_| {
                    let page = state.get_untracked().window.page_index;
                    if page > 0 {
                        on_prev(page - 1);
                    }
                }
            >
                "‹"
            </button>
            <button
                class="btn"
                disabled=move || {
                    let window = state.get().window;
                    window.page_index >= window.last_page_index()
                }
                on:click=move |_| {
                    let window = state.get_untracked().window;
                    if window.page_index < window.last_page_index() {
                        on_next(window.page_index + 1);
                    }
                }
            >
                "›"
            </button>
        </div>
    }
}
