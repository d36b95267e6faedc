//! レコード→表示行の射影
//!
//! 1件の不正レコードでテーブル全体が空にならないよう、
//! 欠けたフィールドはデフォルト値で補い、識別子の無いレコードだけを除外する。

use crate::error::{Error, Result};
use crate::types::{DisplayRow, InventoryRecord, RowId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;

/// 所有グループが無い場合の表示
pub const OWNER_FALLBACK: &str = "N/A";

/// 射影結果
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub rows: Vec<DisplayRow>,
    /// 除外・補完したレコードの報告
    pub issues: Vec<Error>,
}

/// デコード結果
#[derive(Debug, Clone, Default)]
pub struct DecodedRecords {
    pub records: Vec<InventoryRecord>,
    pub issues: Vec<Error>,
}

/// レコード列を表示行に射影
pub fn project(records: &[InventoryRecord]) -> Projection {
    project_with_fallback(records, OWNER_FALLBACK)
}

/// 所有グループ欠落時の表示を指定して射影
pub fn project_with_fallback(records: &[InventoryRecord], owner_fallback: &str) -> Projection {
    let mut projection = Projection::default();
    let mut seen: HashSet<RowId> = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let Some(id) = record.chemical_id else {
            tracing::warn!(index, "record without chemicalID skipped");
            projection.issues.push(Error::MalformedRecord {
                index,
                reason: "missing chemicalID".to_string(),
            });
            continue;
        };

        if !seen.insert(id) {
            tracing::warn!(index, id, "duplicate chemicalID skipped");
            projection.issues.push(Error::MalformedRecord {
                index,
                reason: format!("duplicate chemicalID {}", id),
            });
            continue;
        }

        projection.rows.push(project_record(id, record, owner_fallback));
    }

    projection
}

fn project_record(id: RowId, record: &InventoryRecord, owner_fallback: &str) -> DisplayRow {
    let owner_label = record
        .research_group
        .as_ref()
        .and_then(|g| g.group_name.clone())
        .unwrap_or_else(|| owner_fallback.to_string());

    DisplayRow {
        id,
        name: record.chemical_name.clone().unwrap_or_default(),
        qr_id: record.qr_id.clone().unwrap_or_default(),
        amount: record.amount.unwrap_or_default(),
        owner_label,
        audit_date: record.last_audit.as_deref().and_then(parse_date),
        updated_date: record.date_updated.as_deref().and_then(parse_date),
        audit_status: record.audit_status.unwrap_or(false),
    }
}

/// タイムスタンプ文字列をUTCの日付に変換
///
/// RFC3339、タイムゾーン無しの日時、日付のみの3形式を受け付ける。
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::debug!(value, "unparseable timestamp");
            None
        }
    }
}

/// JSON配列をレコード列にデコード
///
/// 配列でない場合のみエラー。要素単位の型不一致は報告して読み飛ばす。
pub fn decode_records(json: &str) -> Result<DecodedRecords> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(Error::Json("expected an array of records".to_string()));
    };

    let mut decoded = DecodedRecords::default();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<InventoryRecord>(item) {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "undecodable record skipped");
                decoded.issues.push(Error::MalformedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResearchGroup;

    fn record(id: RowId) -> InventoryRecord {
        InventoryRecord {
            chemical_id: Some(id),
            chemical_name: Some(format!("Chemical {}", id)),
            qr_id: Some(format!("QR-{}", id)),
            amount: Some(1.0),
            research_group: Some(ResearchGroup {
                group_name: Some("Group A".to_string()),
            }),
            last_audit: Some("2024-05-06T23:30:00Z".to_string()),
            date_updated: Some("2024-05-07T01:00:00+09:00".to_string()),
            audit_status: Some(true),
            location_id: Some(1),
        }
    }

    #[test]
    fn test_project_full_record() {
        let projection = project(&[record(1)]);
        assert!(projection.issues.is_empty());

        let row = &projection.rows[0];
        assert_eq!(row.id, 1);
        assert_eq!(row.name, "Chemical 1");
        assert_eq!(row.qr_id, "QR-1");
        assert_eq!(row.owner_label, "Group A");
        assert_eq!(row.audit_date_label(), "2024-05-06");
        // +09:00 の 01:00 はUTCでは前日
        assert_eq!(row.updated_date_label(), "2024-05-06");
        assert!(row.audit_status);
    }

    #[test]
    fn test_project_missing_owner_is_na() {
        let mut r = record(2);
        r.research_group = None;
        let projection = project(&[r]);
        assert_eq!(projection.rows[0].owner_label, "N/A");

        let mut r = record(3);
        r.research_group = Some(ResearchGroup { group_name: None });
        let projection = project_with_fallback(&[r], "-");
        assert_eq!(projection.rows[0].owner_label, "-");
    }

    #[test]
    fn test_project_malformed_record_defaults() {
        let sparse = InventoryRecord {
            chemical_id: Some(9),
            last_audit: Some("not a date".to_string()),
            ..Default::default()
        };
        let projection = project(&[record(1), sparse, record(2)]);

        assert_eq!(projection.rows.len(), 3);
        let row = &projection.rows[1];
        assert_eq!(row.name, "");
        assert_eq!(row.amount, 0.0);
        assert_eq!(row.audit_date, None);
        assert!(!row.audit_status);
    }

    #[test]
    fn test_project_skips_missing_id_and_duplicates() {
        let projection = project(&[
            record(1),
            InventoryRecord::default(),
            record(1),
            record(2),
        ]);

        let ids: Vec<RowId> = projection.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(projection.issues.len(), 2);
        assert!(matches!(
            projection.issues[0],
            Error::MalformedRecord { index: 1, .. }
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31);
        assert_eq!(parse_date("2023-12-31T12:00:00Z"), expected);
        assert_eq!(parse_date("2023-12-31T12:00:00.123"), expected);
        assert_eq!(parse_date("2023-12-31 08:15:00"), expected);
        assert_eq!(parse_date("2023-12-31"), expected);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("31/12/2023"), None);
    }

    #[test]
    fn test_decode_records_skips_bad_items() {
        let json = r#"[
            {"chemicalID": 1, "chemicalName": "A"},
            7,
            {"chemicalID": 3, "amount": 4}
        ]"#;

        let decoded = decode_records(json).expect("デコード失敗");
        assert_eq!(decoded.records.len(), 2);
        assert_eq!(decoded.issues.len(), 1);
        assert!(matches!(decoded.issues[0], Error::MalformedRecord { index: 1, .. }));
        assert_eq!(decoded.records[1].amount, Some(4.0));
    }

    #[test]
    fn test_decode_records_tolerates_mistyped_fields() {
        let json = r#"[
            {"chemicalID": 1, "amount": "5", "chemicalName": "X"},
            {"chemicalID": "2", "qrID": 1002, "auditStatus": 1, "locationID": "4"},
            {"chemicalID": 3, "amount": "lots", "auditStatus": "maybe", "chemicalName": null}
        ]"#;

        let decoded = decode_records(json).expect("デコード失敗");
        assert!(decoded.issues.is_empty());
        assert_eq!(decoded.records.len(), 3);

        let first = &decoded.records[0];
        assert_eq!(first.amount, Some(5.0));
        assert_eq!(first.chemical_name.as_deref(), Some("X"));

        let second = &decoded.records[1];
        assert_eq!(second.chemical_id, Some(2));
        assert_eq!(second.qr_id.as_deref(), Some("1002"));
        assert_eq!(second.audit_status, Some(true));
        assert_eq!(second.location_id, Some(4));

        // 解釈できない値は既定値で表示する
        let third = &decoded.records[2];
        assert_eq!(third.amount, None);
        assert_eq!(third.audit_status, None);
        let rows = project(&decoded.records).rows;
        assert_eq!(rows[2].amount, 0.0);
        assert!(!rows[2].audit_status);
        assert_eq!(rows[2].name, "");
    }

    #[test]
    fn test_decode_records_rejects_non_array() {
        assert!(matches!(decode_records("{}"), Err(Error::Json(_))));
        assert!(matches!(decode_records("[1,"), Err(Error::Json(_))));
    }
}
