use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryTableError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("レコードファイルが見つかりません: {0}")]
    RecordsNotFound(String),

    #[error("テーブル操作エラー: {0}")]
    Table(#[from] inventory_table_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InventoryTableError>;
