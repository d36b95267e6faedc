//! JSONファイルをデータソース・監査送信先として扱う
//!
//! ファイルは在庫レコードの配列。監査時は該当要素の `auditStatus` と
//! `lastAudit` だけを書き換え、他のフィールドはそのまま残す。

use inventory_table_common::{
    decode_records, AuditAck, AuditPayload, AuditTransport, Error, InventoryRecord,
    InventorySource, LocationFilter, Result, Role, RoleResolver, RowId,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_array(&self) -> std::result::Result<Vec<Value>, String> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| format!("{}: {}", self.path.display(), e))?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err(format!("{}: expected an array of records", self.path.display())),
            Err(e) => Err(format!("{}: {}", self.path.display(), e)),
        }
    }
}

impl InventorySource for JsonFileStore {
    async fn fetch_page(
        &self,
        filter: &LocationFilter,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<InventoryRecord>> {
        tracing::debug!(
            path = %self.path.display(),
            location = %filter.location_name,
            page_index,
            page_size,
            "reading records"
        );
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::FetchFailure(format!("{}: {}", self.path.display(), e)))?;
        let decoded = decode_records(&content)
            .map_err(|e| Error::FetchFailure(format!("{}: {}", self.path.display(), e)))?;
        for issue in &decoded.issues {
            tracing::warn!(error = %issue, "record skipped");
        }
        Ok(decoded.records)
    }
}

impl AuditTransport for JsonFileStore {
    async fn submit_audit(&self, id: RowId, payload: &AuditPayload) -> Result<AuditAck> {
        let failure = |reason: String| Error::MutationFailure { id, reason };

        let mut items = self.read_array().await.map_err(failure)?;
        let item = items
            .iter_mut()
            .find(|item| item.get("chemicalID").and_then(Value::as_i64) == Some(id))
            .ok_or_else(|| failure("record not found".to_string()))?;

        let Value::Object(fields) = item else {
            return Err(failure("record is not an object".to_string()));
        };
        fields.insert("auditStatus".to_string(), Value::Bool(payload.audit_status));
        fields.insert(
            "lastAudit".to_string(),
            Value::String(payload.last_audit.to_rfc3339()),
        );

        let content = serde_json::to_string_pretty(&items).map_err(|e| failure(e.to_string()))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| failure(e.to_string()))?;

        tracing::info!(id, "audit written");
        Ok(AuditAck { id })
    }
}

/// コマンドラインで指定されたロール
#[derive(Debug, Clone, Default)]
pub struct FixedRole(pub Option<String>);

impl RoleResolver for FixedRole {
    async fn resolve_role(&self) -> Result<Role> {
        Ok(Role::from_session_role(self.0.as_deref()))
    }
}
