//! 外部協調先のインターフェース
//!
//! データ取得・ロール解決・監査送信の3つ。ブラウザでは単一スレッドで動くため
//! `Send` は要求しない。

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{AuditAck, AuditPayload, InventoryRecord, LocationFilter, Role, RowId};

/// 在庫レコードの取得元
pub trait InventorySource {
    async fn fetch_page(
        &self,
        filter: &LocationFilter,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<InventoryRecord>>;
}

/// 閲覧者ロールの解決
pub trait RoleResolver {
    /// セッションが無い場合は `Role::Unknown`
    async fn resolve_role(&self) -> Result<Role>;
}

/// 監査の送信先
pub trait AuditTransport {
    async fn submit_audit(&self, id: RowId, payload: &AuditPayload) -> Result<AuditAck>;
}
