// crates/fsi_mesh/src/mesh.rs

//! 网格描述
//!
//! 读取器产出的只读网格数据：节点坐标、单元、单元组（材料标签）
//! 以及带面编号的边界边。节点与单元索引均为 0 起始。

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

// ============================================================
// 单元形状
// ============================================================

/// 单元形状（Gambit NTYPE 编码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ElementShape {
    /// 线单元
    Edge = 1,
    /// 四边形
    Quadrilateral = 2,
    /// 三角形
    Triangle = 3,
    /// 六面体
    Brick = 4,
    /// 三棱柱
    Wedge = 5,
    /// 四面体
    Tetrahedron = 6,
    /// 金字塔
    Pyramid = 7,
}

impl ElementShape {
    /// 从 Gambit NTYPE 转换
    pub fn from_gambit(ntype: u8) -> Option<Self> {
        match ntype {
            1 => Some(Self::Edge),
            2 => Some(Self::Quadrilateral),
            3 => Some(Self::Triangle),
            4 => Some(Self::Brick),
            5 => Some(Self::Wedge),
            6 => Some(Self::Tetrahedron),
            7 => Some(Self::Pyramid),
            _ => None,
        }
    }

    /// 形状名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Quadrilateral => "quadrilateral",
            Self::Triangle => "triangle",
            Self::Brick => "brick",
            Self::Wedge => "wedge",
            Self::Tetrahedron => "tetrahedron",
            Self::Pyramid => "pyramid",
        }
    }

    /// 空间维数
    pub fn dimension(&self) -> usize {
        match self {
            Self::Edge => 1,
            Self::Quadrilateral | Self::Triangle => 2,
            _ => 3,
        }
    }

    /// 角点数
    pub fn n_corners(&self) -> usize {
        match self {
            Self::Edge => 2,
            Self::Triangle => 3,
            Self::Quadrilateral | Self::Tetrahedron => 4,
            Self::Pyramid => 5,
            Self::Wedge => 6,
            Self::Brick => 8,
        }
    }

    /// 二维单元第 `face` 条边（0 起始）上的局部节点序号
    ///
    /// Gambit 高阶单元按 角点-边中点-角点 交替编号，
    /// 因此二次单元的第 k 条边为 `[2k, 2k+1, 2k+2]`（首尾环绕）。
    pub fn face_local_nodes(&self, n_nodes: usize, face: usize) -> MeshResult<Vec<usize>> {
        if self.dimension() != 2 {
            return Err(MeshError::UnsupportedShape {
                shape: self.name(),
                operation: "face_local_nodes",
            });
        }
        let corners = self.n_corners();
        if face >= corners {
            return Err(MeshError::invalid_topology(
                "face_local_nodes",
                format!("{} 没有第 {} 条边", self.name(), face + 1),
            ));
        }
        if n_nodes >= 2 * corners {
            let ring = 2 * corners;
            Ok(vec![2 * face, 2 * face + 1, (2 * face + 2) % ring])
        } else {
            Ok(vec![face, (face + 1) % corners])
        }
    }
}

impl std::fmt::Display for ElementShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================
// 网格数据
// ============================================================

/// 单元
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// 单元形状
    pub shape: ElementShape,
    /// 节点索引
    pub nodes: Vec<usize>,
    /// 所属单元组编号
    pub group: u32,
}

/// 单元组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementGroup {
    /// 组编号
    pub id: u32,
    /// 组名
    pub name: String,
    /// 材料标签
    pub material: u32,
    /// 组内单元索引
    pub elements: Vec<usize>,
}

/// 边界边：某单元的某条局部边属于某个边界面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundarySide {
    /// 单元索引
    pub element: usize,
    /// 局部边序号（0 起始）
    pub local_face: usize,
    /// 边界面编号
    pub face_id: u32,
}

/// 网格描述
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshDescription {
    /// 节点坐标
    pub nodes: Vec<DVec3>,
    /// 单元列表
    pub elements: Vec<Element>,
    /// 单元组
    pub groups: Vec<ElementGroup>,
    /// 基于单元边的边界集
    pub boundary_sides: Vec<BoundarySide>,
    /// 基于节点的边界集 (节点索引, 面编号)
    pub boundary_node_sets: Vec<(usize, u32)>,
    /// 空间维数
    pub dimension: usize,
}

impl MeshDescription {
    /// 节点数量
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数量
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// 按编号查找单元组
    pub fn group(&self, id: u32) -> Option<&ElementGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// 出现过的边界面编号（升序去重）
    pub fn face_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .boundary_sides
            .iter()
            .map(|s| s.face_id)
            .chain(self.boundary_node_sets.iter().map(|&(_, f)| f))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// 单元 `element` 的第 `local_face` 条边上的全局节点
    pub fn side_nodes(&self, element: usize, local_face: usize) -> MeshResult<Vec<usize>> {
        let elem = self.elements.get(element).ok_or_else(|| {
            MeshError::invalid_topology("side_nodes", format!("单元 {} 不存在", element))
        })?;
        let local = elem.shape.face_local_nodes(elem.nodes.len(), local_face)?;
        local
            .into_iter()
            .map(|i| {
                elem.nodes.get(i).copied().ok_or_else(|| {
                    MeshError::invalid_topology(
                        "side_nodes",
                        format!("单元 {} 仅有 {} 个节点", element, elem.nodes.len()),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_gambit() {
        assert_eq!(ElementShape::from_gambit(2), Some(ElementShape::Quadrilateral));
        assert_eq!(ElementShape::from_gambit(3), Some(ElementShape::Triangle));
        assert_eq!(ElementShape::from_gambit(9), None);
    }

    #[test]
    fn test_linear_quad_faces() {
        let quad = ElementShape::Quadrilateral;
        assert_eq!(quad.face_local_nodes(4, 0).unwrap(), vec![0, 1]);
        assert_eq!(quad.face_local_nodes(4, 3).unwrap(), vec![3, 0]);
        assert!(quad.face_local_nodes(4, 4).is_err());
    }

    #[test]
    fn test_quadratic_quad_faces() {
        let quad = ElementShape::Quadrilateral;
        assert_eq!(quad.face_local_nodes(9, 1).unwrap(), vec![2, 3, 4]);
        assert_eq!(quad.face_local_nodes(9, 3).unwrap(), vec![6, 7, 0]);
    }

    #[test]
    fn test_brick_faces_unsupported() {
        assert!(matches!(
            ElementShape::Brick.face_local_nodes(8, 0),
            Err(MeshError::UnsupportedShape { .. })
        ));
    }
}
