// crates/fsi_physics/src/boundary/generator.rs

//! 边界数据生成器
//!
//! 本模块在边界节点上调用求值器，生成非线性求解所需的边界数据：
//! - BoundaryNode: 边界节点（坐标 + 面编号）
//! - BoundaryData: 某场在全部边界节点上的边界取值
//! - BoundaryDataGenerator: 按场的生成方式（定常/时变）生成并缓存
//!
//! # 设计思路
//!
//! 1. 求值器只描述决策表，不关心节点集合
//! 2. 定常数据在 t = 0 计算一次并缓存，时变数据每次请求时重算
//! 3. 只接受已在状态中注册的场，未注册的场显式报错

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use glam::DVec3;
use thiserror::Error;
use tracing::debug;

use fsi_foundation::FsiError;
use fsi_mesh::{MeshDescription, MeshError};

use super::provider::BoundaryConditionProvider;
use super::types::{BcGenerationMode, BoundaryValue, FaceId};
use crate::fields::{FieldKind, FieldRegistry};

// ============================================================
// 边界节点与数据
// ============================================================

/// 边界节点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryNode {
    /// 节点索引（即自由度索引）
    pub node: usize,
    /// 节点坐标
    pub point: DVec3,
    /// 所在边界面
    pub face: FaceId,
}

/// 单个边界节点上的取值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEntry {
    /// 节点索引
    pub node: usize,
    /// 所在边界面
    pub face: FaceId,
    /// 边界取值
    pub value: BoundaryValue,
}

/// 某场的边界数据
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryData {
    /// 场类型
    pub kind: FieldKind,
    /// 生成方式
    pub mode: BcGenerationMode,
    /// 求值时刻
    pub time: f64,
    /// 各边界节点取值
    pub entries: Vec<BoundaryEntry>,
}

impl BoundaryData {
    /// 本质边界条目
    pub fn dirichlet_entries(&self) -> impl Iterator<Item = &BoundaryEntry> {
        self.entries.iter().filter(|e| e.value.is_dirichlet())
    }
}

// ============================================================
// 错误
// ============================================================

/// 边界处理错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundaryError {
    /// 请求的场未在状态中注册
    #[error("场 {0} 未在状态中注册，无法生成边界数据")]
    UnregisteredField(FieldKind),

    /// 网格中出现了不在 {{1, 2, 3, 4}} 内的面编号
    #[error("未知边界面编号 {0}")]
    UnknownFace(u32),

    /// 网格拓扑错误
    #[error("边界节点提取失败: {0}")]
    Mesh(String),
}

impl From<MeshError> for BoundaryError {
    fn from(err: MeshError) -> Self {
        BoundaryError::Mesh(err.to_string())
    }
}

impl From<BoundaryError> for FsiError {
    fn from(err: BoundaryError) -> Self {
        match err {
            BoundaryError::Mesh(msg) => FsiError::invalid_mesh(msg),
            other => FsiError::config(other.to_string()),
        }
    }
}

// ============================================================
// 生成器
// ============================================================

/// 边界数据生成器
///
/// # 使用流程
///
/// 1. 由网格边界节点创建（[`BoundaryDataGenerator::from_mesh`]）
/// 2. 为各场登记生成方式 (set_mode)
/// 3. 求解器在每个时间步请求数据 (data_for / generate)
pub struct BoundaryDataGenerator {
    provider: Arc<dyn BoundaryConditionProvider>,
    nodes: Vec<BoundaryNode>,
    registered: HashSet<FieldKind>,
    modes: HashMap<FieldKind, BcGenerationMode>,
    cache: HashMap<FieldKind, BoundaryData>,
}

impl BoundaryDataGenerator {
    /// 创建生成器
    pub fn new(
        provider: Arc<dyn BoundaryConditionProvider>,
        nodes: Vec<BoundaryNode>,
        registry: &FieldRegistry,
    ) -> Self {
        Self {
            provider,
            nodes,
            registered: registry.kinds().iter().copied().collect(),
            modes: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// 从网格的边界节点创建
    ///
    /// 节点被多个面触及时取最小面编号。
    pub fn from_mesh(
        provider: Arc<dyn BoundaryConditionProvider>,
        mesh: &MeshDescription,
        registry: &FieldRegistry,
    ) -> Result<Self, BoundaryError> {
        let nodes = fsi_mesh::boundary_nodes(mesh)?
            .into_iter()
            .map(|(node, face_id)| -> Result<BoundaryNode, BoundaryError> {
                Ok(BoundaryNode {
                    node,
                    point: mesh.nodes[node],
                    face: FaceId::try_from(face_id)?,
                })
            })
            .collect::<Result<Vec<_>, BoundaryError>>()?;
        debug!("边界数据生成器: {} 个边界节点, 求值器 {}", nodes.len(), provider.name());
        Ok(Self::new(provider, nodes, registry))
    }

    /// 边界节点
    #[inline]
    pub fn nodes(&self) -> &[BoundaryNode] {
        &self.nodes
    }

    /// 求值器
    #[inline]
    pub fn provider(&self) -> &dyn BoundaryConditionProvider {
        self.provider.as_ref()
    }

    /// 登记场的生成方式
    pub fn set_mode(&mut self, kind: FieldKind, mode: BcGenerationMode) -> Result<(), BoundaryError> {
        self.ensure_registered(kind)?;
        if self.modes.insert(kind, mode) != Some(mode) {
            self.cache.remove(&kind);
        }
        Ok(())
    }

    /// 场的生成方式
    #[inline]
    pub fn mode(&self, kind: FieldKind) -> Option<BcGenerationMode> {
        self.modes.get(&kind).copied()
    }

    /// 已登记生成方式的场
    pub fn fields(&self) -> Vec<FieldKind> {
        let mut kinds: Vec<FieldKind> = self.modes.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// 按登记的生成方式取边界数据，未登记时视为定常
    pub fn data_for(&mut self, kind: FieldKind, time: f64) -> Result<&BoundaryData, BoundaryError> {
        let mode = self.mode(kind).unwrap_or_default();
        self.generate(kind, mode, time)
    }

    /// 生成边界数据
    ///
    /// # 参数
    /// - `kind`: 场类型，必须已注册
    /// - `mode`: 定常数据忽略 `time`，以 t = 0 计算并缓存
    /// - `time`: 时变数据的求值时刻
    pub fn generate(
        &mut self,
        kind: FieldKind,
        mode: BcGenerationMode,
        time: f64,
    ) -> Result<&BoundaryData, BoundaryError> {
        self.ensure_registered(kind)?;

        let eval_time = match mode {
            BcGenerationMode::Steady => 0.0,
            BcGenerationMode::TimeDependent => time,
        };
        let fresh = match self.cache.get(&kind) {
            Some(cached) => cached.mode == mode && cached.time == eval_time,
            None => false,
        };

        if !fresh {
            let data = self.evaluate(kind, mode, eval_time);
            self.cache.insert(kind, data);
        }
        self.cache
            .get(&kind)
            .ok_or(BoundaryError::UnregisteredField(kind))
    }

    fn evaluate(&self, kind: FieldKind, mode: BcGenerationMode, time: f64) -> BoundaryData {
        let entries = self
            .nodes
            .iter()
            .map(|n| BoundaryEntry {
                node: n.node,
                face: n.face,
                value: self.provider.evaluate(kind, n.point, n.face, time),
            })
            .collect();
        BoundaryData { kind, mode, time, entries }
    }

    fn ensure_registered(&self, kind: FieldKind) -> Result<(), BoundaryError> {
        if self.registered.contains(&kind) {
            Ok(())
        } else {
            Err(BoundaryError::UnregisteredField(kind))
        }
    }
}

impl std::fmt::Debug for BoundaryDataGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryDataGenerator")
            .field("provider", &self.provider.name())
            .field("nodes", &self.nodes.len())
            .field("modes", &self.modes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::ChannelFsiBoundary;
    use crate::fields::{FieldDescriptor, InterpolationFamily};

    fn generator(kinds: &[FieldKind]) -> BoundaryDataGenerator {
        let mut reg = FieldRegistry::new();
        for &k in kinds {
            reg.register(FieldDescriptor::new(k, InterpolationFamily::Biquadratic, 2)).unwrap();
        }
        let nodes = vec![
            BoundaryNode { node: 0, point: DVec3::new(0.0, 0.1, 0.0), face: FaceId::Inflow },
            BoundaryNode { node: 1, point: DVec3::new(2.5, 0.2, 0.0), face: FaceId::Outflow },
            BoundaryNode { node: 2, point: DVec3::new(1.0, 0.0, 0.0), face: FaceId::PrimaryWall },
        ];
        BoundaryDataGenerator::new(Arc::new(ChannelFsiBoundary::new()), nodes, &reg)
    }

    #[test]
    fn test_unregistered_field_rejected() {
        let mut g = generator(&[FieldKind::U]);
        assert_eq!(
            g.generate(FieldKind::Dx, BcGenerationMode::Steady, 0.0).unwrap_err(),
            BoundaryError::UnregisteredField(FieldKind::Dx)
        );
        assert!(g.set_mode(FieldKind::P, BcGenerationMode::Steady).is_err());
    }

    #[test]
    fn test_time_dependent_reevaluates() {
        let mut g = generator(&[FieldKind::U]);
        g.set_mode(FieldKind::U, BcGenerationMode::TimeDependent).unwrap();

        let early = g.data_for(FieldKind::U, 0.5).unwrap().entries[0].value.value;
        let late = g.data_for(FieldKind::U, 3.0).unwrap().entries[0].value.value;
        assert!(early < late);
        assert_eq!(g.data_for(FieldKind::U, 3.0).unwrap().time, 3.0);
    }

    #[test]
    fn test_steady_evaluated_at_time_zero() {
        let mut g = generator(&[FieldKind::U]);
        g.set_mode(FieldKind::U, BcGenerationMode::Steady).unwrap();
        let data = g.data_for(FieldKind::U, 3.0).unwrap();
        assert_eq!(data.time, 0.0);
        // t = 0 时入口斜坡为 0
        assert_eq!(data.entries[0].value.value, 0.0);
    }

    #[test]
    fn test_dirichlet_entries() {
        let mut g = generator(&[FieldKind::U]);
        let data = g.generate(FieldKind::U, BcGenerationMode::TimeDependent, 2.0).unwrap();
        let nodes: Vec<usize> = data.dirichlet_entries().map(|e| e.node).collect();
        assert_eq!(nodes, vec![0, 2]);
    }

    #[test]
    fn test_from_mesh_rejects_unknown_face() {
        let text = "\
   NODAL COORDINATES 2.4.6
 1 0.0 0.0
 2 1.0 0.0
 3 0.0 1.0
ENDOFSECTION
      ELEMENTS/CELLS 2.4.6
 1 3 3 1 2 3
ENDOFSECTION
 BOUNDARY CONDITIONS 2.4.6
 9 1 1 0 6
 1 3 1
ENDOFSECTION
";
        let mesh = fsi_mesh::NeutralLoader::parse_str(text, "tri.neu").unwrap();
        let reg = FieldRegistry::new();
        let err = BoundaryDataGenerator::from_mesh(Arc::new(ChannelFsiBoundary::new()), &mesh, &reg)
            .unwrap_err();
        assert_eq!(err, BoundaryError::UnknownFace(9));
    }
}
