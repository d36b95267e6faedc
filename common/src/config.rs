//! テーブル設定

use crate::error::{Error, Result};
use crate::projector::OWNER_FALLBACK;
use crate::sort::{SortDirection, SortKey, SortState};
use crate::types::ColumnId;
use serde::{Deserialize, Serialize};

/// ページサイズの選択肢（デフォルト）
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 25];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    pub page_size_options: Vec<usize>,
    pub default_page_size: usize,
    pub default_sort: SortKey,
    pub default_direction: SortDirection,
    pub owner_fallback: String,
    /// ツールバーのタイトル
    pub title: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default_page_size: 5,
            default_sort: ColumnId::Amount,
            default_direction: SortDirection::Asc,
            owner_fallback: OWNER_FALLBACK.to_string(),
            title: "All Chemicals".to_string(),
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size_options.is_empty() {
            return Err(Error::Config("pageSizeOptions must not be empty".into()));
        }
        if self.page_size_options.contains(&0) {
            return Err(Error::Config("page sizes must be positive".into()));
        }
        if !self.page_size_options.contains(&self.default_page_size) {
            return Err(Error::Config(format!(
                "defaultPageSize {} is not one of {:?}",
                self.default_page_size, self.page_size_options
            )));
        }
        Ok(())
    }

    pub fn initial_sort(&self) -> SortState {
        SortState {
            key: self.default_sort,
            direction: self.default_direction,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
