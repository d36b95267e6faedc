//! 行選択
//!
//! 配列の添字ではなく行IDで保持するので、並び替えやページ移動をまたいで残る。

use crate::types::RowId;
use std::collections::BTreeSet;

/// ヘッダのチェックボックス状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// 選択中の行ID集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RowId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 選択を反転
    pub fn toggle(&mut self, id: RowId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// 全選択ボタン
    ///
    /// 何か選択済みなら全解除、空ならフィルタ後の全行を選択する。
    pub fn select_all<I>(&mut self, visible_ids: I)
    where
        I: IntoIterator<Item = RowId>,
    {
        if self.ids.is_empty() {
            self.ids.extend(visible_ids);
        } else {
            self.ids.clear();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: RowId) -> bool {
        self.ids.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.ids.iter().copied()
    }

    /// 存在しなくなった行IDを落とす
    ///
    /// 落とした件数を返す。
    pub fn retain_existing<F>(&mut self, mut exists: F) -> usize
    where
        F: FnMut(RowId) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(|id| exists(*id));
        before - self.ids.len()
    }

    /// 行数に対するヘッダのチェック状態
    pub fn check_state(&self, row_count: usize) -> CheckState {
        let count = self.count();
        if row_count > 0 && count == row_count {
            CheckState::Checked
        } else if count > 0 {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut selection = SelectionSet::new();
        selection.toggle(3);
        selection.toggle(1);
        assert!(selection.is_selected(3));
        assert!(selection.is_selected(1));
        assert_eq!(selection.count(), 2);

        selection.toggle(3);
        assert!(!selection.is_selected(3));
        assert_eq!(selection.count(), 1);
    }

    #[test]
    fn test_toggle_order_independent() {
        let mut a = SelectionSet::new();
        a.toggle(1);
        a.toggle(2);
        let mut b = SelectionSet::new();
        b.toggle(2);
        b.toggle(1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_select_all_alternates() {
        let visible = vec![1, 2, 3];
        let mut selection = SelectionSet::new();

        selection.select_all(visible.clone());
        assert_eq!(selection.count(), 3);

        selection.select_all(visible.clone());
        assert!(selection.is_empty());

        selection.select_all(visible);
        assert_eq!(selection.count(), 3);
    }

    #[test]
    fn test_select_all_with_partial_selection_clears() {
        let mut selection = SelectionSet::new();
        selection.toggle(2);
        selection.select_all(vec![1, 2, 3]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_existing() {
        let mut selection = SelectionSet::new();
        selection.select_all(vec![1, 2, 3, 4]);
        let dropped = selection.retain_existing(|id| id % 2 == 0);
        assert_eq!(dropped, 2);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn test_check_state() {
        let mut selection = SelectionSet::new();
        assert_eq!(selection.check_state(0), CheckState::Unchecked);
        assert_eq!(selection.check_state(3), CheckState::Unchecked);

        selection.toggle(1);
        assert_eq!(selection.check_state(3), CheckState::Indeterminate);

        selection.toggle(2);
        selection.toggle(3);
        assert_eq!(selection.check_state(3), CheckState::Checked);
    }
}
