// crates/fsi_io/src/lib.rs

//! FsiKit IO 模块
//!
//! 提供模拟结果输出功能。
//!
//! # 模块
//!
//! - [`exporters`]: VTU 单帧导出与 PVD 时间序列索引
//! - [`snapshot`]: 网格和场快照
//! - [`writer`]: 驱动器使用的快照输出
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use fsi_io::VtuSnapshotWriter;
//!
//! let mut writer = VtuSnapshotWriter::from_config(&config.output, family, &mesh)?;
//! driver.run(&mut session, &mut state, &mut writer, num_steps, write_interval)?;
//! writer.finish()?;
//! ```

pub mod error;
pub mod exporters;
pub mod snapshot;
pub mod vtu;
pub mod writer;

// 重导出常用类型
pub use error::{IoError, IoResult};
pub use exporters::VtuExporter;
pub use snapshot::{FieldSnapshot, MeshSnapshot, VtkCellType};
pub use writer::VtuSnapshotWriter;
