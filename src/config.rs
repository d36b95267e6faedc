use crate::error::{InventoryTableError, Result};
use inventory_table_common::TableConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub table: TableConfig,
    /// `--role` 省略時のロール
    pub default_role: Option<String>,
    /// `--location` 省略時のロケーション名
    pub default_location: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config
            .table
            .validate()
            .map_err(|e| InventoryTableError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InventoryTableError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("inventory-table").join("config.json"))
    }

    /// 既定のページサイズを変更（選択肢に無い値は拒否）
    pub fn set_default_page_size(&mut self, page_size: usize) -> Result<()> {
        let mut table = self.table.clone();
        table.default_page_size = page_size;
        table
            .validate()
            .map_err(|e| InventoryTableError::Config(e.to_string()))?;
        self.table = table;
        Ok(())
    }
}
