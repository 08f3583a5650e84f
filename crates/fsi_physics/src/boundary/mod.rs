// crates/fsi_physics/src/boundary/mod.rs

//! 边界条件模块
//!
//! # 子模块
//!
//! - [`types`]: 边界模式、面编号、入口剖面
//! - [`provider`]: 边界条件求值接口与通道算例决策表
//! - [`generator`]: 边界节点上的数据生成与缓存
//!
//! # 使用示例
//!
//! ```
//! use fsi_physics::boundary::{BoundaryConditionProvider, ChannelFsiBoundary, FaceId};
//! use fsi_physics::fields::FieldKind;
//! use glam::DVec3;
//!
//! let bc = ChannelFsiBoundary::new();
//! let v = bc.evaluate(FieldKind::P, DVec3::ZERO, FaceId::Outflow, 0.0);
//! assert!(!v.is_dirichlet());
//! ```

mod generator;
mod provider;
mod types;

pub use generator::{BoundaryData, BoundaryDataGenerator, BoundaryEntry, BoundaryError, BoundaryNode};
pub use provider::{BoundaryConditionProvider, ChannelFsiBoundary};
pub use types::{BcGenerationMode, BoundaryMode, BoundaryValue, FaceId, InflowProfile};
