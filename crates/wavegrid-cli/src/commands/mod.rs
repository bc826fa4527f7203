//! CLI command implementations.

pub mod make_table;
pub mod params;
pub mod render;
pub mod table_info;
