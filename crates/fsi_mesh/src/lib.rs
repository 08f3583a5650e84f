// crates/fsi_mesh/src/lib.rs

//! FsiKit 网格模块
//!
//! 提供网格描述的读取与查询，不负责网格存储与并行分区。
//!
//! # 核心类型
//!
//! - [`MeshDescription`]: 节点、单元、单元组与边界边
//! - [`NeutralLoader`]: Gambit 中性文件读取器
//! - [`RefinementPredicate`] / [`GroupRefinement`]: 单元细化判据
//! - [`RefinementPlan`]: 多重网格层级的细化标记
//!
//! # 示例
//!
//! ```ignore
//! use fsi_mesh::{GroupRefinement, NeutralLoader, RefinementPlan};
//!
//! let mesh = NeutralLoader::load("./input/fsifirst.neu")?;
//! let plan = RefinementPlan::build(&mesh, &GroupRefinement, 4, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod refinement;
pub mod topology;

pub use error::{MeshError, MeshResult};
pub use io::NeutralLoader;
pub use mesh::{BoundarySide, Element, ElementGroup, ElementShape, MeshDescription};
pub use refinement::{GroupRefinement, RefinementPass, RefinementPlan, RefinementPredicate};
pub use topology::{boundary_nodes, node_adjacency, structure_nodes, CsrConnectivity};
