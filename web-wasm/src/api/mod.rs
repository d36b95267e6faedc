//! サーバAPI連携

pub mod inventory;

pub use inventory::InventoryApi;
