// crates/fsi_io/src/exporters/mod.rs

//! 数据导出模块

pub mod vtu;

// 重导出
pub use vtu::VtuExporter;
