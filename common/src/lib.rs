//! Inventory Table Common Library
//!
//! CLIとWeb(WASM)で共有されるテーブル状態エンジン

pub mod types;
pub mod error;
pub mod config;
pub mod projector;
pub mod sort;
pub mod selection;
pub mod visibility;
pub mod pagination;
pub mod audit;
pub mod controller;
pub mod source;
pub mod driver;

pub use types::{
    AuditAck, AuditPayload, Column, ColumnId, DisplayRow, InventoryRecord, LocationFilter,
    LocationId, ResearchGroup, Role, RowId, ALL_COLUMNS,
};
pub use error::{Error, Result};
pub use config::TableConfig;
pub use projector::{decode_records, project, DecodedRecords, Projection};
pub use sort::{SortDirection, SortKey, SortState};
pub use selection::{CheckState, SelectionSet};
pub use visibility::visible_columns;
pub use pagination::{PageWindow, PaginationController};
pub use audit::{AuditCoordinator, AuditRequest, AuditState};
pub use controller::{FetchRequest, RowView, TableController, TableState};
pub use source::{AuditTransport, InventorySource, RoleResolver};
