// crates/fsi_foundation/src/lib.rs

//! FsiKit Foundation Layer
//!
//! 零业务依赖的基础层，提供跨层传递的统一错误类型。
//!
//! # 模块概览
//!
//! - [`error`]: `FsiError` / `FsiResult`
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: fsi_cli
//! Layer 4: fsi_io        ─> VTU/PVD 快照
//! Layer 3: fsi_physics   ─> 场、边界、时间步、驱动
//! Layer 2: fsi_mesh / fsi_config
//! Layer 1: fsi_foundation (本层)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{FsiError, FsiResult};
