// crates/fsi_mesh/src/topology.rs

//! 网格拓扑查询
//!
//! 提供 CSR (Compressed Sparse Row) 格式的节点邻接、带面编号的边界节点
//! 以及结构区域节点的计算。
//!
//! # 示例
//!
//! ```
//! use fsi_mesh::topology::CsrConnectivity;
//!
//! let rows: Vec<&[u32]> = vec![&[1, 2], &[0], &[0]];
//! let csr: CsrConnectivity<u32> = CsrConnectivity::from_rows(&rows);
//! assert_eq!(csr.row(0), &[1, 2]);
//! assert_eq!(csr.n_rows(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::MeshResult;
use crate::mesh::MeshDescription;

/// CSR 格式连接性
///
/// `offsets[i]..offsets[i+1]` 是第 i 行在 `indices` 中的范围。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrConnectivity<I: Copy> {
    /// 行偏移数组，长度 = n_rows + 1
    pub offsets: Vec<u32>,
    /// 列索引数组
    pub indices: Vec<I>,
}

impl<I: Copy> CsrConnectivity<I> {
    /// 创建空的 CSR 结构（0 行）
    pub fn empty() -> Self {
        Self {
            offsets: vec![0],
            indices: Vec::new(),
        }
    }

    /// 从行列表构建 CSR
    pub fn from_rows<R: AsRef<[I]>>(rows: &[R]) -> Self {
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();

        offsets.push(0);
        for row in rows {
            indices.extend_from_slice(row.as_ref());
            offsets.push(indices.len() as u32);
        }

        Self { offsets, indices }
    }

    /// 获取第 row 行的切片
    #[inline]
    pub fn row(&self, row: usize) -> &[I] {
        let start = self.offsets[row] as usize;
        let end = self.offsets[row + 1] as usize;
        &self.indices[start..end]
    }

    /// 行数
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// 非零元素总数
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// 检查是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }
}

// ============================================================
// 网格查询
// ============================================================

/// 节点邻接：同一单元内的任意两个节点互为邻居
///
/// 每行按节点索引升序排列，不含自身。
pub fn node_adjacency(mesh: &MeshDescription) -> CsrConnectivity<u32> {
    let mut neighbors: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); mesh.n_nodes()];
    for elem in &mesh.elements {
        for &a in &elem.nodes {
            for &b in &elem.nodes {
                if a != b {
                    neighbors[a].insert(b as u32);
                }
            }
        }
    }
    let rows: Vec<Vec<u32>> = neighbors.into_iter().map(|s| s.into_iter().collect()).collect();
    CsrConnectivity::from_rows(&rows)
}

/// 边界节点及其面编号，按节点索引升序
///
/// 同一节点被多个边界面触及时取最小的面编号。
pub fn boundary_nodes(mesh: &MeshDescription) -> MeshResult<Vec<(usize, u32)>> {
    let mut faces: BTreeMap<usize, u32> = BTreeMap::new();
    let mut touch = |node: usize, face_id: u32| {
        faces
            .entry(node)
            .and_modify(|f| *f = (*f).min(face_id))
            .or_insert(face_id);
    };

    for side in &mesh.boundary_sides {
        for node in mesh.side_nodes(side.element, side.local_face)? {
            touch(node, side.face_id);
        }
    }
    for &(node, face_id) in &mesh.boundary_node_sets {
        touch(node, face_id);
    }

    Ok(faces.into_iter().collect())
}

/// 结构区域节点：属于材料标签在 `materials` 中的单元组的节点
pub fn structure_nodes(mesh: &MeshDescription, materials: &[u32]) -> Vec<usize> {
    let solid_groups: BTreeSet<u32> = mesh
        .groups
        .iter()
        .filter(|g| materials.contains(&g.material))
        .map(|g| g.id)
        .collect();

    let nodes: BTreeSet<usize> = mesh
        .elements
        .iter()
        .filter(|e| solid_groups.contains(&e.group))
        .flat_map(|e| e.nodes.iter().copied())
        .collect();
    nodes.into_iter().collect()
}
