//! ツールバーコンポーネント
//!
//! 選択がなければタイトル、あれば件数と操作ボタンを表示する。

use inventory_table_common::TableState;
use leptos::prelude::*;

#[component]
pub fn TableToolbar(state: ReadSignal<TableState>) -> impl IntoView {
    let toolbar_class = move || {
        if state.get().selected_count > 0 {
            "toolbar toolbar-highlight"
        } else {
            "toolbar"
        }
    };

    view! {
        <div class=toolbar_class>
            <h2 class="toolbar-title">{move || state.get().toolbar_label()}</h2>
            <div class="toolbar-actions">
                <Show when=move || state.get().can_edit()>
                    <button class="btn btn-icon" title="Edit">"編集"</button>
                </Show>
                <Show when=move || state.get().can_delete()>
                    <button class="btn btn-icon" title="Delete">"削除"</button>
                </Show>
            </div>
        </div>
    }
}
