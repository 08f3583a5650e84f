// crates/fsi_physics/src/lib.rs

//! 流固耦合瞬态求解模块
//!
//! 提供耦合问题的时间推进功能，包括：
//! - 场类型与注册表 (fields)
//! - 模拟状态与历史层 (state)
//! - Newmark 加速度重构 (newmark)
//! - 边界条件求值与边界数据生成 (boundary)
//! - 材料参数 (material)
//! - 引擎核心 (engine) - 协作者会话、非线性系统、时间步策略、驱动器
//! - 问题装配 (problem)
//!
//! # 时间推进
//!
//! ```text
//! SimulationDriver::run
//!   ├─ TimeStepPolicy::dt(t)
//!   ├─ NonlinearSystem::solve              (读取 BoundaryDataGenerator)
//!   ├─ NonlinearSystem::reconstruct_acceleration
//!   ├─ NonlinearSystem::advance_history
//!   └─ SnapshotWriter::write_snapshot      (step % write_interval == 0)
//! ```

#![warn(missing_docs)]

pub mod boundary;
pub mod engine;
pub mod fields;
pub mod material;
pub mod newmark;
pub mod problem;
pub mod state;

// 重导出常用类型
pub use boundary::{
    BcGenerationMode, BoundaryConditionProvider, BoundaryData, BoundaryDataGenerator,
    BoundaryEntry, BoundaryError, BoundaryMode, BoundaryNode, BoundaryValue, ChannelFsiBoundary,
    FaceId, InflowProfile,
};
pub use engine::{
    CollaboratorContext, ConstantTimeStep, DriverError, NonlinearSystem, RelaxationSystem,
    RunSummary, Session, SimulationDriver, SnapshotWriter, SolveReport, SolverSettings,
    SteppedTimeStep, TimeStepPolicy,
};
pub use fields::{
    Component, FieldDescriptor, FieldError, FieldKind, FieldRegistry, InterpolationFamily,
    PhysicalMeaning,
};
pub use material::{Fluid, ReferenceScales, Solid};
pub use newmark::{KinematicTriplet, NewmarkParams};
pub use problem::FsiProblem;
pub use state::{FieldHistory, SimulationState};
