// crates/fsi_config/src/lib.rs

//! FsiKit Config Layer
//!
//! 配置层，提供 JSON 模拟配置的加载、保存与校验。
//!
//! # 模块概览
//!
//! - [`simulation_config`]: `SimulationConfig` 及各分节
//! - [`error`]: 配置错误类型
//!
//! 本层只描述数据，不依赖物理层类型；场名称以字符串保存，
//! 在构建问题时才解析为场类型。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod simulation_config;

pub use error::ConfigError;
pub use simulation_config::{
    ConvergencePolicy, DirichletHandling, FluidConfig, FluidModel, MaterialsConfig, MeshConfig,
    MultigridCycle, OutputConfig, OutputEncoding, ParallelConfig, ReferenceConfig,
    SimulationConfig, SolidConfig, SolidModel, SolverSettingsConfig, TimeConfig,
};
