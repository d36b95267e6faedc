//! エラー型定義
//!
//! どのエラーもコントローラを壊さない。最悪でも古い表示・ロールバック済みの表示と
//! エラー通知が残るだけ。

use crate::types::RowId;
use thiserror::Error;

/// 共通エラー型
///
/// 状態スナップショットに最後のエラーを保持するため `Clone` にしている。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Fetch failure: {0}")]
    FetchFailure(String),

    #[error("Role resolution failure: {0}")]
    RoleResolution(String),

    #[error("Audit of item {id} failed: {reason}")]
    MutationFailure { id: RowId, reason: String },

    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Page size {0} is not allowed")]
    InvalidPageSize(usize),

    #[error("Page {page_index} is out of range (last page: {last_page})")]
    PageOutOfRange { page_index: usize, last_page: usize },

    #[error("Audit of item {0} is already pending")]
    AuditPending(RowId),

    #[error("Unknown item: {0}")]
    UnknownRow(RowId),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
