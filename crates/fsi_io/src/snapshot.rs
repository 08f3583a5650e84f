// crates/fsi_io/src/snapshot.rs

//! 网格和场快照
//!
//! 快照是网格和状态的只读副本，按 VTK 的节点顺序与单元类型整理好，
//! 导出器只负责序列化。
//!
//! # 节点顺序
//!
//! Gambit 二维高阶单元按 角点-边中点-角点 交替编号，VTK 要求先角点后边中点：
//!
//! ```text
//! Gambit 八节点四边形: 0 1 2 3 4 5 6 7      (角点为偶数位)
//! VTK QuadraticQuad:   0 2 4 6 1 3 5 7
//! ```

use fsi_mesh::{ElementShape, MeshDescription};
use fsi_physics::{FieldKind, InterpolationFamily, SimulationState};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

// ============================================================
// VTK 单元类型
// ============================================================

/// VTK 单元类型编号
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VtkCellType {
    /// 线段
    Line = 3,
    /// 三角形
    Triangle = 5,
    /// 四边形
    Quad = 9,
    /// 四面体
    Tetra = 10,
    /// 六面体
    Hexahedron = 12,
    /// 三棱柱
    Wedge = 13,
    /// 金字塔
    Pyramid = 14,
    /// 二次线段
    QuadraticEdge = 21,
    /// 六节点三角形
    QuadraticTriangle = 22,
    /// 八节点四边形
    QuadraticQuad = 23,
    /// 七节点三角形
    BiquadraticTriangle = 34,
    /// 九节点四边形
    BiquadraticQuad = 28,
}

impl VtkCellType {
    /// 由单元形状与节点数确定类型
    pub fn classify(shape: ElementShape, n_nodes: usize) -> IoResult<Self> {
        use ElementShape::*;
        let ty = match (shape, n_nodes) {
            (Edge, 2) => Self::Line,
            (Edge, 3) => Self::QuadraticEdge,
            (Triangle, 3) => Self::Triangle,
            (Triangle, 6) => Self::QuadraticTriangle,
            (Triangle, 7) => Self::BiquadraticTriangle,
            (Quadrilateral, 4) => Self::Quad,
            (Quadrilateral, 8) => Self::QuadraticQuad,
            (Quadrilateral, 9) => Self::BiquadraticQuad,
            (Tetrahedron, 4) => Self::Tetra,
            (Brick, 8) => Self::Hexahedron,
            (Wedge, 6) => Self::Wedge,
            (Pyramid, 5) => Self::Pyramid,
            _ => {
                return Err(IoError::UnsupportedCell { shape: shape.name(), nodes: n_nodes });
            }
        };
        Ok(ty)
    }
}

/// 把 Gambit 局部节点顺序转换为 VTK 顺序
fn vtk_order(shape: ElementShape, nodes: &[usize]) -> Vec<usize> {
    let corners = shape.n_corners();
    let two_d_high_order = shape.dimension() == 2 && nodes.len() >= 2 * corners;
    if shape == ElementShape::Edge && nodes.len() == 3 {
        // 端点, 端点, 中点
        return vec![nodes[0], nodes[2], nodes[1]];
    }
    if !two_d_high_order {
        return nodes.to_vec();
    }
    let ring = 2 * corners;
    let mut ordered: Vec<usize> = (0..corners).map(|k| nodes[2 * k]).collect();
    ordered.extend((0..corners).map(|k| nodes[2 * k + 1]));
    ordered.extend_from_slice(&nodes[ring..]);
    ordered
}

// ============================================================
// 网格快照
// ============================================================

/// 网格快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSnapshot {
    /// 节点坐标
    pub points: Vec<[f64; 3]>,
    /// 单元节点（VTK 顺序）
    pub connectivity: Vec<Vec<usize>>,
    /// 单元类型
    pub cell_types: Vec<VtkCellType>,
}

impl MeshSnapshot {
    /// 从网格描述创建
    pub fn from_mesh(mesh: &MeshDescription) -> IoResult<Self> {
        let points = mesh.nodes.iter().map(|p| p.to_array()).collect();
        let mut connectivity = Vec::with_capacity(mesh.n_elements());
        let mut cell_types = Vec::with_capacity(mesh.n_elements());
        for elem in &mesh.elements {
            cell_types.push(VtkCellType::classify(elem.shape, elem.nodes.len())?);
            connectivity.push(vtk_order(elem.shape, &elem.nodes));
        }
        Ok(Self { points, connectivity, cell_types })
    }

    /// 节点数
    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.connectivity.len()
    }

    /// 每个单元连接表的结束偏移
    pub fn offsets(&self) -> Vec<usize> {
        self.connectivity
            .iter()
            .scan(0, |acc, c| {
                *acc += c.len();
                Some(*acc)
            })
            .collect()
    }

    /// 按位移移动节点（移动网格输出）
    pub fn displaced(&self, dx: Option<&[f64]>, dy: Option<&[f64]>, dz: Option<&[f64]>) -> IoResult<Self> {
        let n = self.n_points();
        for (name, d) in [("DX", dx), ("DY", dy), ("DZ", dz)] {
            if let Some(d) = d {
                if d.len() != n {
                    return Err(IoError::FieldLength { field: name.into(), expected: n, actual: d.len() });
                }
            }
        }
        let mut out = self.clone();
        for (axis, d) in [dx, dy, dz].into_iter().enumerate() {
            if let Some(d) = d {
                for (p, v) in out.points.iter_mut().zip(d) {
                    p[axis] += v;
                }
            }
        }
        Ok(out)
    }
}

// ============================================================
// 场快照
// ============================================================

/// 某一步的场快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// 步号
    pub step: usize,
    /// 模拟时间
    pub time: f64,
    /// 输出插值族
    pub family: InterpolationFamily,
    /// 场名与当前值，按请求顺序
    pub fields: Vec<(FieldKind, Vec<f64>)>,
}

impl FieldSnapshot {
    /// 复制 `kinds` 的当前值
    pub fn capture(
        state: &SimulationState,
        kinds: &[FieldKind],
        family: InterpolationFamily,
        step: usize,
    ) -> IoResult<Self> {
        let fields = kinds
            .iter()
            .map(|&k| -> IoResult<(FieldKind, Vec<f64>)> { Ok((k, state.current(k)?.to_vec())) })
            .collect::<IoResult<Vec<_>>>()?;
        Ok(Self { step, time: state.time, family, fields })
    }

    /// 某个场的值
    pub fn get(&self, kind: FieldKind) -> Option<&[f64]> {
        self.fields.iter().find(|(k, _)| *k == kind).map(|(_, v)| v.as_slice())
    }

    /// 检查所有场长度等于节点数
    pub fn check_length(&self, n_points: usize) -> IoResult<()> {
        for (kind, values) in &self.fields {
            if values.len() != n_points {
                return Err(IoError::FieldLength {
                    field: kind.name().to_string(),
                    expected: n_points,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }
}
