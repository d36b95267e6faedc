//! 非同期処理の実行
//!
//! コントローラの要求を外部協調先に送り、結果を戻す。
//! `RefCell` の借用は `.await` をまたがない。

use crate::audit::AuditState;
use crate::controller::{FetchRequest, TableController};
use crate::error::Result;
use crate::source::{AuditTransport, InventorySource, RoleResolver};
use crate::types::{Role, RowId};
use chrono::{DateTime, Utc};
use std::cell::RefCell;

/// 取得を実行して反映（古い結果なら `Ok(false)`）
pub async fn run_fetch<S: InventorySource>(
    controller: &RefCell<TableController>,
    source: &S,
    request: FetchRequest,
) -> Result<bool> {
    let result = source
        .fetch_page(&request.filter, request.page_index, request.page_size)
        .await;
    controller
        .borrow_mut()
        .apply_fetch(request.generation, result)
}

pub async fn refresh<S: InventorySource>(
    controller: &RefCell<TableController>,
    source: &S,
) -> Result<bool> {
    let request = controller.borrow_mut().refresh();
    run_fetch(controller, source, request).await
}

pub async fn change_page<S: InventorySource>(
    controller: &RefCell<TableController>,
    source: &S,
    page_index: usize,
) -> Result<bool> {
    let request = controller.borrow_mut().change_page(page_index)?;
    run_fetch(controller, source, request).await
}

pub async fn change_page_size<S: InventorySource>(
    controller: &RefCell<TableController>,
    source: &S,
    page_size: usize,
) -> Result<bool> {
    let request = controller.borrow_mut().change_page_size(page_size)?;
    run_fetch(controller, source, request).await
}

/// 監査を送信して確定またはロールバック
pub async fn perform_audit<T: AuditTransport>(
    controller: &RefCell<TableController>,
    transport: &T,
    id: RowId,
    now: DateTime<Utc>,
) -> Result<AuditState> {
    let request = controller.borrow_mut().perform_audit(id, now)?;
    let outcome = transport.submit_audit(request.id, &request.payload).await;
    controller.borrow_mut().settle_audit(request.id, outcome)
}

pub async fn resolve_role<R: RoleResolver>(
    controller: &RefCell<TableController>,
    resolver: &R,
) -> Role {
    let result = resolver.resolve_role().await;
    controller.borrow_mut().apply_role(result)
}
