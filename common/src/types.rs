//! 在庫テーブルの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - InventoryRecord: データソースから届く生レコード
//! - DisplayRow: 表示用に正規化した行
//! - Column / ColumnId: 列定義
//! - Role: 閲覧者の権限区分（表示のみを左右する）

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 行の識別子（chemicalID）
pub type RowId = i64;

/// ロケーションの識別子（locationID）
pub type LocationId = i64;

/// 所有グループ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchGroup {
    pub group_name: Option<String>,
}

/// データソースから届く在庫レコード（読み取り専用）
///
/// 欠けたフィールドがあっても読み込めるよう、すべて `Option`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryRecord {
    #[serde(rename = "chemicalID", deserialize_with = "lenient::integer")]
    pub chemical_id: Option<RowId>,

    #[serde(rename = "chemicalName", deserialize_with = "lenient::text")]
    pub chemical_name: Option<String>,

    #[serde(rename = "qrID", deserialize_with = "lenient::text")]
    pub qr_id: Option<String>,

    #[serde(deserialize_with = "lenient::number")]
    pub amount: Option<f64>,

    #[serde(rename = "researchGroup")]
    pub research_group: Option<ResearchGroup>,

    /// 最終監査日時（RFC3339 または YYYY-MM-DD）
    #[serde(rename = "lastAudit")]
    pub last_audit: Option<String>,

    /// 最終更新日時
    #[serde(rename = "dateUpdated")]
    pub date_updated: Option<String>,

    #[serde(rename = "auditStatus", deserialize_with = "lenient::flag")]
    pub audit_status: Option<bool>,

    #[serde(rename = "locationID", deserialize_with = "lenient::integer")]
    pub location_id: Option<LocationId>,
}

/// 型の揺れを許すフィールド読み込み
///
/// 数値の文字列表現などは受け入れ、解釈できない値は `None` にする。
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_i64().map(|v| v != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }
}

/// 表示用の行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub id: RowId,
    pub name: String,
    pub qr_id: String,
    pub amount: f64,
    pub owner_label: String,
    #[serde(rename = "auditDateLabel")]
    pub audit_date: Option<NaiveDate>,
    #[serde(rename = "updatedDateLabel")]
    pub updated_date: Option<NaiveDate>,
    pub audit_status: bool,
}

impl DisplayRow {
    pub fn audit_date_label(&self) -> String {
        date_label(self.audit_date)
    }

    pub fn updated_date_label(&self) -> String {
        date_label(self.updated_date)
    }

    /// 列ごとのセル表示
    pub fn cell_text(&self, column: ColumnId) -> String {
        match column {
            ColumnId::Name => self.name.clone(),
            ColumnId::QrId => self.qr_id.clone(),
            ColumnId::Amount => self.amount.to_string(),
            ColumnId::Owner => self.owner_label.clone(),
            ColumnId::AuditDate => self.audit_date_label(),
            ColumnId::UpdatedDate => self.updated_date_label(),
            ColumnId::AuditStatus => {
                let label = if self.audit_status { "Present" } else { "Audit" };
                label.to_string()
            }
        }
    }
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// 列ID（ソートキーを兼ねる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnId {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "qr")]
    QrId,
    #[serde(rename = "amount")]
    Amount,
    #[serde(rename = "owner")]
    Owner,
    #[serde(rename = "auditDate")]
    AuditDate,
    #[serde(rename = "newDate")]
    UpdatedDate,
    #[serde(rename = "auditStatus")]
    AuditStatus,
}

impl ColumnId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Name => "name",
            ColumnId::QrId => "qr",
            ColumnId::Amount => "amount",
            ColumnId::Owner => "owner",
            ColumnId::AuditDate => "auditDate",
            ColumnId::UpdatedDate => "newDate",
            ColumnId::AuditStatus => "auditStatus",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_COLUMNS
            .iter()
            .map(|c| c.id)
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown column: {}", s))
    }
}

/// 列定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    /// 数値列（右寄せ）
    pub numeric: bool,
    pub disable_padding: bool,
    pub label: &'static str,
}

impl Column {
    const fn new(id: ColumnId, numeric: bool, disable_padding: bool, label: &'static str) -> Self {
        Self {
            id,
            numeric,
            disable_padding,
            label,
        }
    }
}

/// 全列（表示順）
pub const ALL_COLUMNS: [Column; 7] = [
    Column::new(ColumnId::Name, false, true, "Item Name"),
    Column::new(ColumnId::QrId, true, false, "QR ID"),
    Column::new(ColumnId::Amount, true, false, "Amount (units)"),
    Column::new(ColumnId::Owner, true, false, "Owner"),
    Column::new(ColumnId::AuditDate, true, false, "Last Audit"),
    Column::new(ColumnId::UpdatedDate, true, false, "Updated"),
    Column::new(ColumnId::AuditStatus, true, false, "Audit Status"),
];

/// 閲覧者の権限区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    Staff,
    TemporaryStaff,
    Other,
    /// 未解決（セッション取得前・取得失敗）
    #[default]
    Unknown,
}

impl Role {
    /// セッションのロール文字列から変換
    pub fn from_session_role(role: Option<&str>) -> Self {
        match role.map(str::trim) {
            None => Role::Unknown,
            Some("Admin") => Role::Admin,
            Some("Staff") => Role::Staff,
            Some("Temporary staff") => Role::TemporaryStaff,
            Some(_) => Role::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Staff => "Staff",
            Role::TemporaryStaff => "Temporary staff",
            Role::Other => "Other",
            Role::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// データ取得のスコープ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilter {
    pub location_name: String,
    /// 指定時は一致しない locationID のレコードを除外する
    #[serde(default)]
    pub location_id: Option<LocationId>,
}

impl LocationFilter {
    pub fn new(location_name: impl Into<String>) -> Self {
        Self {
            location_name: location_name.into(),
            location_id: None,
        }
    }

    pub fn with_location_id(mut self, location_id: LocationId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    /// レコードがこのロケーションに属するか
    pub fn admits(&self, record: &InventoryRecord) -> bool {
        match (self.location_id, record.location_id) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        }
    }
}

/// 監査送信の内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPayload {
    pub audit_status: bool,
    pub last_audit: DateTime<Utc>,
}

/// 監査送信の受理通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditAck {
    pub id: RowId,
}
