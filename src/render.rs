//! テーブルのテキスト出力

use inventory_table_common::{
    AuditState, CheckState, Column, ColumnId, RowView, SortDirection, TableState,
};

fn check_mark(state: CheckState) -> &'static str {
    match state {
        CheckState::Unchecked => "[ ]",
        CheckState::Indeterminate => "[-]",
        CheckState::Checked => "[x]",
    }
}

fn cell(row: &RowView, column: &Column) -> String {
    match (column.id, row.audit) {
        (ColumnId::AuditStatus, AuditState::Pending) => format!("{} (pending)", row.audit_label()),
        (id, _) => row.row.cell_text(id),
    }
}

fn header(state: &TableState, column: &Column) -> String {
    match state.sort_description(column) {
        Some(_) if state.sort.direction == SortDirection::Asc => format!("{} ▲", column.label),
        Some(_) => format!("{} ▼", column.label),
        None => column.label.to_string(),
    }
}

/// 数値列は右寄せ
fn pad(text: &str, width: usize, numeric: bool) -> String {
    if numeric {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

pub fn render_table(state: &TableState) -> String {
    let headers: Vec<String> = state.columns.iter().map(|c| header(state, c)).collect();
    let cells: Vec<Vec<String>> = state
        .rows
        .iter()
        .map(|row| state.columns.iter().map(|c| cell(row, c)).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::new();
    lines.push(state.toolbar_label());

    let mut line = vec![check_mark(state.check_state).to_string()];
    for (i, (h, c)) in headers.iter().zip(&state.columns).enumerate() {
        line.push(pad(h, widths[i], c.numeric));
    }
    lines.push(line.join("  "));

    for (row, row_cells) in state.rows.iter().zip(&cells) {
        let mark = if row.selected { CheckState::Checked } else { CheckState::Unchecked };
        let mut line = vec![check_mark(mark).to_string()];
        for (i, (text, c)) in row_cells.iter().zip(&state.columns).enumerate() {
            line.push(pad(text, widths[i], c.numeric));
        }
        lines.push(line.join("  ").trim_end().to_string());
    }

    for _ in 0..state.padding {
        lines.push(String::new());
    }

    let window = state.window;
    let (first, last) = if window.total_row_count == 0 {
        (0, 0)
    } else {
        let first = window.page_index * window.page_size + 1;
        (first, (first + state.rows.len()).saturating_sub(1))
    };
    lines.push(format!(
        "Rows per page: {} {:?}  {}-{} of {}",
        window.page_size, state.page_size_options, first, last, window.total_row_count
    ));

    if let Some(error) = &state.last_error {
        lines.push(format!("! {}", error));
    }

    lines.join("\n")
}
