//! 権限による列の表示制御
//!
//! 監査ステータス列は Admin / Staff / Temporary staff にのみ表示する。
//! データそのものは絞らない。

use crate::types::{Column, ColumnId, Role};

/// 監査ステータス列を表示できる権限か
pub fn can_see_audit_status(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Staff | Role::TemporaryStaff)
}

/// 権限に応じた表示列
pub fn visible_columns(role: Role, all_columns: &[Column]) -> Vec<Column> {
    let show_audit = can_see_audit_status(role);
    all_columns
        .iter()
        .filter(|c| show_audit || c.id != ColumnId::AuditStatus)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ALL_COLUMNS;

    fn ids(columns: &[Column]) -> Vec<ColumnId> {
        columns.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_privileged_roles_see_all() {
        for role in [Role::Admin, Role::Staff, Role::TemporaryStaff] {
            let columns = visible_columns(role, &ALL_COLUMNS);
            assert_eq!(columns.len(), ALL_COLUMNS.len());
            assert!(ids(&columns).contains(&ColumnId::AuditStatus));
        }
    }

    #[test]
    fn test_other_and_unknown_hide_audit_status() {
        for role in [Role::Other, Role::Unknown] {
            let columns = visible_columns(role, &ALL_COLUMNS);
            assert_eq!(columns.len(), ALL_COLUMNS.len() - 1);
            assert!(!ids(&columns).contains(&ColumnId::AuditStatus));
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let columns = visible_columns(Role::Unknown, &ALL_COLUMNS);
        assert_eq!(
            ids(&columns),
            vec![
                ColumnId::Name,
                ColumnId::QrId,
                ColumnId::Amount,
                ColumnId::Owner,
                ColumnId::AuditDate,
                ColumnId::UpdatedDate,
            ]
        );
    }
}
