// crates/fsi_mesh/src/io/mod.rs

//! 网格 IO 模块
//!
//! - Gambit 中性文件 (.neu)

pub mod neutral;

pub use neutral::NeutralLoader;
