//! 安定ソート
//!
//! 元の並び順をタイブレークに使うため、同値の行は方向に関係なく入力順を保つ。

use crate::types::{ColumnId, DisplayRow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// ソートキー（列IDと同じ集合）
pub type SortKey = ColumnId;

/// ソート方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// ソートインジケータの読み上げ文言
    pub fn description(&self) -> &'static str {
        match self {
            SortDirection::Asc => "sorted ascending",
            SortDirection::Desc => "sorted descending",
        }
    }
}

/// 現在のソート状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: ColumnId::Amount,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    /// 列ヘッダのクリック
    ///
    /// 同じキーなら方向を反転し、別のキーなら昇順に戻す。
    pub fn request(self, key: SortKey) -> Self {
        let direction = if self.key == key {
            self.direction.toggle()
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }
}

/// 指定キーでの三方比較
pub fn compare(a: &DisplayRow, b: &DisplayRow, key: SortKey, direction: SortDirection) -> Ordering {
    let ordering = match key {
        ColumnId::Name => a.name.cmp(&b.name),
        ColumnId::QrId => a.qr_id.cmp(&b.qr_id),
        ColumnId::Amount => a.amount.total_cmp(&b.amount),
        ColumnId::Owner => a.owner_label.cmp(&b.owner_label),
        ColumnId::AuditDate => a.audit_date.cmp(&b.audit_date),
        ColumnId::UpdatedDate => a.updated_date.cmp(&b.updated_date),
        ColumnId::AuditStatus => a.audit_status.cmp(&b.audit_status),
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// 行を並び替えた新しい列を返す
pub fn order(rows: &[DisplayRow], key: SortKey, direction: SortDirection) -> Vec<DisplayRow> {
    let mut indexed: Vec<(usize, &DisplayRow)> = rows.iter().enumerate().collect();
    indexed.sort_unstable_by(|(ia, a), (ib, b)| {
        compare(a, b, key, direction).then_with(|| ia.cmp(ib))
    });
    indexed.into_iter().map(|(_, row)| row.clone()).collect()
}
