// crates/fsi_physics/src/engine/mod.rs

//! 瞬态求解引擎
//!
//! # 模块结构
//!
//! - `context` - 协作者上下文与会话（资源释放顺序）
//! - `system` - 非线性瞬态系统接口
//! - `relaxation` - 节点松弛参考系统
//! - `timestep` - 时间步长策略
//! - `driver` - 时间推进驱动器

pub mod context;
pub mod driver;
pub mod relaxation;
pub mod system;
pub mod timestep;

// 重导出常用类型
pub use context::{CollaboratorContext, Session};
pub use driver::{DriverError, RunSummary, SimulationDriver, SnapshotWriter};
pub use relaxation::RelaxationSystem;
pub use system::{NonlinearSystem, SolveReport, SolverSettings};
pub use timestep::{ConstantTimeStep, SteppedTimeStep, TimeStepPolicy};
