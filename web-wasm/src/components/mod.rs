pub mod pagination;
pub mod table_body;
pub mod table_head;
pub mod toolbar;
