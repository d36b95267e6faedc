//! 在庫監査テーブル CLI
//!
//! JSONファイルのレコードを共通コントローラで表示・監査する。

pub mod cli;
pub mod config;
pub mod error;
pub mod render;
pub mod store;
