//! テーブルコントローラ
//!
//! 表示行・ソート・選択・ページ・ロール・監査状態を一つにまとめ、
//! ビューには `state()` のスナップショットと操作（intent）だけを公開する。
//!
//! 非同期処理はデータ取得と監査送信の2か所のみ。どちらも
//! 「要求を返す → 呼び出し側が送信 → 結果を戻す」の2段階に分けているので、
//! コントローラ自体は同期的な状態遷移だけを持つ。

use crate::audit::{AuditCoordinator, AuditRequest, AuditState};
use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::pagination::{PageWindow, PaginationController};
use crate::projector::project_with_fallback;
use crate::selection::{CheckState, SelectionSet};
use crate::sort::{order, SortKey, SortState};
use crate::types::{
    AuditAck, Column, DisplayRow, InventoryRecord, LocationFilter, Role, RowId, ALL_COLUMNS,
};
use crate::visibility::visible_columns;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// データ取得の要求
///
/// `generation` は要求ごとに単調増加し、最新の要求の結果だけが反映される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub filter: LocationFilter,
    pub page_index: usize,
    pub page_size: usize,
}

/// 表示用の1行
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub row: DisplayRow,
    pub selected: bool,
    pub audit: AuditState,
}

impl RowView {
    /// 監査ボタンの文言
    pub fn audit_label(&self) -> &'static str {
        if self.row.audit_status {
            "Present"
        } else {
            "Audit"
        }
    }

    /// 監査ボタンを押せるか
    pub fn can_audit(&self) -> bool {
        !self.row.audit_status && self.audit != AuditState::Pending
    }
}

/// ビューに渡すスナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<RowView>,
    pub padding: usize,
    pub row_count: usize,
    pub selected_count: usize,
    pub check_state: CheckState,
    pub sort: SortState,
    pub window: PageWindow,
    pub page_size_options: Vec<usize>,
    pub role: Role,
    pub loading: bool,
    pub last_error: Option<Error>,
}

impl TableState {
    /// ツールバーの表示（選択があれば件数）
    pub fn toolbar_label(&self) -> String {
        if self.selected_count > 0 {
            format!("{} selected", self.selected_count)
        } else {
            self.title.clone()
        }
    }

    /// 編集は1件選択時のみ
    pub fn can_edit(&self) -> bool {
        self.selected_count == 1
    }

    pub fn can_delete(&self) -> bool {
        self.selected_count > 0
    }

    pub fn sort_description(&self, column: &Column) -> Option<&'static str> {
        (self.sort.key == column.id).then(|| self.sort.direction.description())
    }
}

#[derive(Debug, Clone)]
pub struct TableController {
    config: TableConfig,
    filter: LocationFilter,
    rows: Vec<DisplayRow>,
    sort: SortState,
    selection: SelectionSet,
    pagination: PaginationController,
    role: Role,
    audit: AuditCoordinator,
    generation: u64,
    loading: bool,
    last_error: Option<Error>,
}

impl TableController {
    pub fn new(config: TableConfig, filter: LocationFilter) -> Result<Self> {
        config.validate()?;
        let pagination =
            PaginationController::new(config.page_size_options.clone(), config.default_page_size)?;
        Ok(Self {
            sort: config.initial_sort(),
            config,
            filter,
            rows: Vec::new(),
            selection: SelectionSet::new(),
            pagination,
            role: Role::Unknown,
            audit: AuditCoordinator::new(),
            generation: 0,
            loading: false,
            last_error: None,
        })
    }

    pub fn filter(&self) -> &LocationFilter {
        &self.filter
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn audit_state(&self, id: RowId) -> AuditState {
        self.audit.state(id)
    }

    /// ソート済みの全行（フィルタ後）
    pub fn sorted_rows(&self) -> Vec<DisplayRow> {
        order(&self.rows, self.sort.key, self.sort.direction)
    }

    pub fn state(&self) -> TableState {
        let sorted = self.sorted_rows();
        let rows = self
            .pagination
            .slice(&sorted)
            .iter()
            .map(|row| RowView {
                selected: self.selection.is_selected(row.id),
                audit: self.audit.state(row.id),
                row: row.clone(),
            })
            .collect();

        TableState {
            title: self.config.title.clone(),
            columns: visible_columns(self.role, &ALL_COLUMNS),
            rows,
            padding: self.pagination.padding(),
            row_count: self.rows.len(),
            selected_count: self.selection.count(),
            check_state: self.selection.check_state(self.rows.len()),
            sort: self.sort,
            window: self.pagination.window(),
            page_size_options: self.pagination.allowed_sizes().to_vec(),
            role: self.role,
            loading: self.loading,
            last_error: self.last_error.clone(),
        }
    }

    pub fn request_sort(&mut self, key: SortKey) {
        self.sort = self.sort.request(key);
        tracing::debug!(
            key = %self.sort.key,
            direction = self.sort.direction.as_str(),
            "sort requested"
        );
    }

    pub fn toggle_selection(&mut self, id: RowId) -> Result<()> {
        if !self.rows.iter().any(|r| r.id == id) {
            return Err(Error::UnknownRow(id));
        }
        self.selection.toggle(id);
        Ok(())
    }

    /// ヘッダのチェックボックス
    pub fn select_all(&mut self) {
        let ids: Vec<RowId> = self.rows.iter().map(|r| r.id).collect();
        self.selection.select_all(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// 現在のページで再取得
    pub fn refresh(&mut self) -> FetchRequest {
        self.next_fetch()
    }

    pub fn change_page(&mut self, page_index: usize) -> Result<FetchRequest> {
        if let Err(e) = self.pagination.change_page(page_index) {
            tracing::warn!(page_index, "page change rejected");
            return Err(e);
        }
        Ok(self.next_fetch())
    }

    pub fn change_page_size(&mut self, page_size: usize) -> Result<FetchRequest> {
        if let Err(e) = self.pagination.change_page_size(page_size) {
            tracing::warn!(page_size, "page size change rejected");
            return Err(e);
        }
        Ok(self.next_fetch())
    }

    fn next_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.loading = true;
        let window = self.pagination.window();
        FetchRequest {
            generation: self.generation,
            filter: self.filter.clone(),
            page_index: window.page_index,
            page_size: window.page_size,
        }
    }

    /// 取得結果の反映
    ///
    /// 古い要求の結果は捨てて `Ok(false)`。取得失敗時は直前の行を残す。
    pub fn apply_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<InventoryRecord>>,
    ) -> Result<bool> {
        if generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "stale fetch result discarded");
            return Ok(false);
        }
        self.loading = false;

        match result {
            Ok(records) => {
                if matches!(self.last_error, Some(Error::FetchFailure(_))) {
                    self.last_error = None;
                }
                self.rows_updated(&records);
                Ok(true)
            }
            Err(e) => {
                let error = match e {
                    Error::FetchFailure(_) => e,
                    other => Error::FetchFailure(other.to_string()),
                };
                tracing::error!(error = %error, "fetch failed, keeping previous rows");
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// 行の再構築
    ///
    /// 不正レコードの報告を返す。存在しなくなった行の選択は黙って外す。
    pub fn rows_updated(&mut self, records: &[InventoryRecord]) -> Vec<Error> {
        let scoped: Vec<InventoryRecord> = records
            .iter()
            .filter(|r| self.filter.admits(r))
            .cloned()
            .collect();

        let projection = project_with_fallback(&scoped, &self.config.owner_fallback);
        let mut rows = projection.rows;
        self.audit.reapply_pending(&mut rows);

        let ids: HashSet<RowId> = rows.iter().map(|r| r.id).collect();
        let dropped = self.selection.retain_existing(|id| ids.contains(&id));
        if dropped > 0 {
            tracing::debug!(dropped, "selection entries dropped");
        }

        self.rows = rows;
        self.pagination.set_total(self.rows.len());

        if let Some(issue) = projection.issues.last() {
            self.last_error = Some(issue.clone());
        }
        projection.issues
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// ロール解決結果の反映（失敗時は Unknown）
    pub fn apply_role(&mut self, result: Result<Role>) -> Role {
        self.role = match result {
            Ok(role) => role,
            Err(e) => {
                let error = match e {
                    Error::RoleResolution(_) => e,
                    other => Error::RoleResolution(other.to_string()),
                };
                tracing::warn!(
                    error = %error,
                    "role resolution failed, using most restrictive columns"
                );
                self.last_error = Some(error);
                Role::Unknown
            }
        };
        self.role
    }

    /// 監査開始（楽観的更新）
    pub fn perform_audit(&mut self, id: RowId, now: DateTime<Utc>) -> Result<AuditRequest> {
        self.audit.begin(&mut self.rows, id, now)
    }

    pub fn settle_audit(&mut self, id: RowId, outcome: Result<AuditAck>) -> Result<AuditState> {
        let result = self.audit.settle(&mut self.rows, id, outcome);
        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        result
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;
    use crate::types::ColumnId;
    use chrono::TimeZone;

    fn record(id: RowId, amount: f64, audited: bool) -> InventoryRecord {
        InventoryRecord {
            chemical_id: Some(id),
            chemical_name: Some(format!("Chemical {}", id)),
            qr_id: Some(format!("QR-{}", id)),
            amount: Some(amount),
            research_group: None,
            last_audit: Some("2024-01-10T00:00:00Z".to_string()),
            date_updated: Some("2024-01-11T00:00:00Z".to_string()),
            audit_status: Some(audited),
            location_id: Some(1),
        }
    }

    fn controller() -> TableController {
        TableController::new(TableConfig::default(), LocationFilter::new("Lab A"))
            .expect("初期化失敗")
    }

    fn sample() -> Vec<InventoryRecord> {
        vec![record(1, 5.0, false), record(2, 5.0, false), record(3, 3.0, true)]
    }

    fn page_ids(state: &TableState) -> Vec<RowId> {
        state.rows.iter().map(|r| r.row.id).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        let state = c.state();
        assert_eq!(state.sort.key, ColumnId::Amount);
        assert_eq!(state.sort.direction, SortDirection::Asc);
        assert_eq!(state.window.page_size, 5);
        assert_eq!(state.role, Role::Unknown);
        assert!(!state.columns.iter().any(|c| c.id == ColumnId::AuditStatus));
        assert_eq!(state.toolbar_label(), "All Chemicals");
        assert_eq!(state.check_state, CheckState::Unchecked);
    }

    #[test]
    fn test_rows_updated_sorted_by_amount() {
        let mut c = controller();
        c.rows_updated(&sample());
        let state = c.state();
        assert_eq!(page_ids(&state), vec![3, 1, 2]);
        assert_eq!(state.row_count, 3);
        assert_eq!(state.rows[1].row.owner_label, "N/A");
    }

    #[test]
    fn test_request_sort_toggles() {
        let mut c = controller();
        c.rows_updated(&sample());
        c.request_sort(ColumnId::Amount);
        assert_eq!(page_ids(&c.state()), vec![1, 2, 3]);
        c.request_sort(ColumnId::Name);
        assert_eq!(c.state().sort.direction, SortDirection::Asc);
        assert_eq!(page_ids(&c.state()), vec![1, 2, 3]);
    }

    #[test]
    fn test_selection_survives_sort_and_page() {
        let mut c = controller();
        let records: Vec<InventoryRecord> = (1..=12).map(|i| record(i, i as f64, false)).collect();
        c.rows_updated(&records);
        c.toggle_selection(2).expect("選択失敗");
        c.toggle_selection(11).expect("選択失敗");

        c.request_sort(ColumnId::Amount);
        c.change_page(1).expect("ページ移動失敗");
        c.request_sort(ColumnId::Name);

        assert!(c.selection().is_selected(2));
        assert!(c.selection().is_selected(11));
        assert_eq!(c.state().selected_count, 2);
        assert_eq!(c.state().check_state, CheckState::Indeterminate);
    }

    #[test]
    fn test_toggle_unknown_row() {
        let mut c = controller();
        c.rows_updated(&sample());
        assert_eq!(c.toggle_selection(99), Err(Error::UnknownRow(99)));
    }

    #[test]
    fn test_select_all_covers_filtered_set_not_page() {
        let mut c = controller();
        let records: Vec<InventoryRecord> = (1..=8).map(|i| record(i, 1.0, false)).collect();
        c.rows_updated(&records);

        c.select_all();
        let state = c.state();
        assert_eq!(state.selected_count, 8);
        assert_eq!(state.rows.len(), 5);
        assert_eq!(state.check_state, CheckState::Checked);
        assert_eq!(state.toolbar_label(), "8 selected");
        assert!(state.can_delete());
        assert!(!state.can_edit());

        c.select_all();
        assert_eq!(c.state().selected_count, 0);
    }

    #[test]
    fn test_rows_updated_drops_missing_selection() {
        let mut c = controller();
        c.rows_updated(&sample());
        c.select_all();
        c.rows_updated(&[record(1, 5.0, false), record(4, 1.0, false)]);
        assert!(c.selection().is_selected(1));
        assert!(!c.selection().is_selected(2));
        assert_eq!(c.state().selected_count, 1);
    }

    #[test]
    fn test_rows_updated_filters_location() {
        let mut c = TableController::new(
            TableConfig::default(),
            LocationFilter::new("Lab A").with_location_id(1),
        )
        .expect("初期化失敗");
        let mut other = record(4, 1.0, false);
        other.location_id = Some(2);
        c.rows_updated(&[record(1, 1.0, false), other]);
        assert_eq!(c.state().row_count, 1);
    }

    #[test]
    fn test_rows_updated_reports_malformed() {
        let mut c = controller();
        let issues = c.rows_updated(&[record(1, 1.0, false), InventoryRecord::default()]);
        assert_eq!(issues.len(), 1);
        assert_eq!(c.state().row_count, 1);
        assert!(matches!(c.state().last_error, Some(Error::MalformedRecord { .. })));
    }

    #[test]
    fn test_change_page_issues_fetch() {
        let mut c = controller();
        let records: Vec<InventoryRecord> = (1..=12).map(|i| record(i, i as f64, false)).collect();
        c.rows_updated(&records);

        let request = c.change_page(2).expect("ページ移動失敗");
        assert_eq!(request.page_index, 2);
        assert_eq!(request.page_size, 5);
        assert_eq!(request.filter.location_name, "Lab A");

        let state = c.state();
        assert!(state.loading);
        assert_eq!(page_ids(&state), vec![11, 12]);
        assert_eq!(state.padding, 3);

        assert!(c.change_page(3).is_err());
        assert_eq!(c.state().window.page_index, 2);
    }

    #[test]
    fn test_change_page_size() {
        let mut c = controller();
        let records: Vec<InventoryRecord> = (1..=12).map(|i| record(i, i as f64, false)).collect();
        c.rows_updated(&records);
        c.change_page(1).expect("ページ移動失敗");

        let request = c.change_page_size(10).expect("ページサイズ変更失敗");
        assert_eq!(request.page_index, 0);
        assert_eq!(request.page_size, 10);
        assert_eq!(c.state().rows.len(), 10);

        assert_eq!(c.change_page_size(7), Err(Error::InvalidPageSize(7)));
        assert_eq!(c.state().window.page_size, 10);
    }

    #[test]
    fn test_stale_fetch_discarded() {
        let mut c = controller();
        let first = c.refresh();
        let second = c.refresh();

        let applied = c.apply_fetch(second.generation, Ok(vec![record(2, 1.0, false)]));
        assert_eq!(applied, Ok(true));
        let applied = c.apply_fetch(first.generation, Ok(vec![record(1, 1.0, false)]));
        assert_eq!(applied, Ok(false));

        assert_eq!(page_ids(&c.state()), vec![2]);
        assert!(!c.state().loading);
    }

    #[test]
    fn test_fetch_failure_keeps_rows() {
        let mut c = controller();
        c.rows_updated(&sample());
        let request = c.refresh();

        let result = c.apply_fetch(request.generation, Err(Error::Json("bad".into())));
        assert!(matches!(result, Err(Error::FetchFailure(_))));
        let state = c.state();
        assert_eq!(state.row_count, 3);
        assert!(matches!(state.last_error, Some(Error::FetchFailure(_))));

        c.dismiss_error();
        assert_eq!(c.state().last_error, None);
    }

    #[test]
    fn test_successful_fetch_clears_fetch_failure() {
        let mut c = controller();
        c.rows_updated(&sample());
        let failed = c.refresh();
        let _ = c.apply_fetch(failed.generation, Err(Error::FetchFailure("down".into())));
        assert!(matches!(c.state().last_error, Some(Error::FetchFailure(_))));

        let retry = c.refresh();
        let applied = c.apply_fetch(retry.generation, Ok(vec![record(1, 5.0, false)]));
        assert_eq!(applied, Ok(true));
        let state = c.state();
        assert_eq!(state.row_count, 1);
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_successful_fetch_keeps_other_errors() {
        let mut c = controller();
        let _ = c.apply_role(Err(Error::RoleResolution("no session".into())));

        let request = c.refresh();
        c.apply_fetch(request.generation, Ok(sample())).expect("反映失敗");
        assert!(matches!(c.state().last_error, Some(Error::RoleResolution(_))));
    }

    #[test]
    fn test_role_controls_columns() {
        let mut c = controller();
        c.set_role(Role::Staff);
        assert!(c.state().columns.iter().any(|c| c.id == ColumnId::AuditStatus));

        let role = c.apply_role(Err(Error::FetchFailure("no session".into())));
        assert_eq!(role, Role::Unknown);
        assert!(!c.state().columns.iter().any(|c| c.id == ColumnId::AuditStatus));
        assert!(matches!(c.state().last_error, Some(Error::RoleResolution(_))));
    }

    #[test]
    fn test_audit_success() {
        let mut c = controller();
        c.rows_updated(&sample());

        let request = c.perform_audit(1, now()).expect("監査開始失敗");
        assert_eq!(request.id, 1);
        let row = c.rows().iter().find(|r| r.id == 1).cloned().expect("行が無い");
        assert!(row.audit_status);
        assert_eq!(row.audit_date_label(), "2024-07-04");

        assert_eq!(c.perform_audit(1, now()), Err(Error::AuditPending(1)));

        let view = c.state().rows.into_iter().find(|r| r.row.id == 1).expect("行が無い");
        assert_eq!(view.audit, AuditState::Pending);
        assert_eq!(view.audit_label(), "Present");
        assert!(!view.can_audit());

        assert_eq!(c.settle_audit(1, Ok(AuditAck { id: 1 })), Ok(AuditState::Confirmed));
        assert!(c.rows().iter().find(|r| r.id == 1).is_some_and(|r| r.audit_status));
    }

    #[test]
    fn test_audit_failure_rolls_back() {
        let mut c = controller();
        c.rows_updated(&sample());
        let before = c.rows().iter().find(|r| r.id == 1).cloned().expect("行が無い");

        c.perform_audit(1, now()).expect("監査開始失敗");
        let result = c.settle_audit(1, Err(Error::FetchFailure("500".into())));
        assert!(matches!(result, Err(Error::MutationFailure { id: 1, .. })));

        let after = c.rows().iter().find(|r| r.id == 1).cloned().expect("行が無い");
        assert_eq!(after, before);
        assert_eq!(c.audit_state(1), AuditState::RolledBack);
        assert!(matches!(c.state().last_error, Some(Error::MutationFailure { .. })));
    }

    #[test]
    fn test_pending_audit_survives_refresh() {
        let mut c = controller();
        c.rows_updated(&sample());
        c.perform_audit(2, now()).expect("監査開始失敗");

        let request = c.refresh();
        c.apply_fetch(request.generation, Ok(sample())).expect("取得反映失敗");
        let row = c.rows().iter().find(|r| r.id == 2).cloned().expect("行が無い");
        assert!(row.audit_status);
        assert_eq!(row.audit_date_label(), "2024-07-04");
    }
}
