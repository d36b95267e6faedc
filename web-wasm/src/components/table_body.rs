//! 本体コンポーネント

use inventory_table_common::{AuditState, Column, ColumnId, RowId, RowView, TableState};
use leptos::prelude::*;

/// 空行1つ分の高さ(px)
const ROW_HEIGHT: usize = 53;

#[component]
pub fn TableBody<FT, FA>(
    state: ReadSignal<TableState>,
    on_toggle: FT,
    on_audit: FA,
) -> impl IntoView
where
    FT: Fn(RowId) + 'static + Clone + Send,
    FA: Fn(RowId) + 'static + Clone + Send,
{
    view! {
        <tbody>
            {move || {
                let current = state.get();
                let columns = current.columns.clone();
                current
                    .rows
                    .into_iter()
                    .map(|row| {
                        view! {
                            <InventoryRow
                                row=row
                                columns=columns.clone()
                                on_toggle=on_toggle.clone()
                                on_audit=on_audit.clone()
                            />
                        }
                    })
                    .collect_view()
            }}
            {move || {
                let current = state.get();
                (current.padding > 0).then(|| {
                    let colspan = current.columns.len() + 1;
                    view! {
                        <tr style=format!("height: {}px", ROW_HEIGHT * current.padding)>
                            <td colspan=colspan></td>
                        </tr>
                    }
                })
            }}
        </tbody>
    }
}

#[component]
fn InventoryRow<FT, FA>(
    row: RowView,
    columns: Vec<Column>,
    on_toggle: FT,
    on_audit: FA,
) -> impl IntoView
where
    FT: Fn(RowId) + 'static + Clone + Send,
    FA: Fn(RowId) + 'static + Clone + Send,
{
    let id = row.row.id;
    let row_class = if row.selected { "row row-selected" } else { "row" };

    let cells = columns
        .into_iter()
        .map(|column| {
            let class = if column.numeric { "cell-numeric" } else { "cell" };
            if column.id == ColumnId::AuditStatus {
                let on_audit = on_audit.clone();
                let disabled = !row.can_audit();
                let label = match row.audit {
                    AuditState::Pending => format!("{}...", row.audit_label()),
                    _ => row.audit_label().to_string(),
                };
                view! {
                    <td class=class>
                        <button
                            class="btn btn-audit"
                            disabled=disabled
                            on:click=move |ev| {
                                ev.stop_propagation();
                                on_audit(id);
                            }
                        >
                            {label}
                        </button>
                    </td>
                }
                .into_any()
            } else {
                view! { <td class=class>{row.row.cell_text(column.id)}</td> }.into_any()
            }
        })
        .collect_view();

    view! {
        <tr class=row_class aria-checked=row.selected.to_string() on:click=move |_| on_toggle(id)>
            <td class="cell-checkbox">
                <input type="checkbox" prop:checked=row.selected />
            </td>
            {cells}
        </tr>
    }
}
