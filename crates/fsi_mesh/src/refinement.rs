// crates/fsi_mesh/src/refinement.rs

//! 网格细化标记
//!
//! 细化判据只依据单元组编号与细化层级（静态几何标记，非后验误差估计），
//! 在时间循环之前构建多重网格层级时使用一次。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mesh::MeshDescription;

/// 细化判据
pub trait RefinementPredicate: Send + Sync {
    /// 单元组 `group` 中的单元在第 `level` 层是否需要细化
    fn should_refine(&self, group: u32, level: usize) -> bool;
}

/// 按单元组的细化规则
///
/// 组 5、6 总是细化；组 7 仅在 `level < 5` 时细化；其余不细化。
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupRefinement;

impl GroupRefinement {
    /// 组 7 细化的层级上限（不含）
    pub const GROUP_7_MAX_LEVEL: usize = 5;
}

impl RefinementPredicate for GroupRefinement {
    fn should_refine(&self, group: u32, level: usize) -> bool {
        match group {
            5 | 6 => true,
            7 => level < Self::GROUP_7_MAX_LEVEL,
            _ => false,
        }
    }
}

impl<F> RefinementPredicate for F
where
    F: Fn(u32, usize) -> bool + Send + Sync,
{
    fn should_refine(&self, group: u32, level: usize) -> bool {
        self(group, level)
    }
}

// ============================================================
// 多层细化计划
// ============================================================

/// 一次细化（从 `level` 层生成 `level + 1` 层）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementPass {
    /// 被细化的层级
    pub level: usize,
    /// 是否均匀细化
    pub uniform: bool,
    /// 每个粗网格单元的细化标记
    pub flags: Vec<bool>,
}

impl RefinementPass {
    /// 被标记的单元数
    pub fn n_marked(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// 多重网格细化计划
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementPlan {
    /// 总层数（含最粗层）
    pub levels: usize,
    /// 各次细化
    pub passes: Vec<RefinementPass>,
}

impl RefinementPlan {
    /// 构建细化计划
    ///
    /// `levels` 层网格需要 `levels - 1` 次细化。生成最后 `selective` 层的
    /// 细化按判据标记，其余均匀细化（全部标记）。判据收到的层级为被细化的层。
    pub fn build(
        mesh: &MeshDescription,
        predicate: &dyn RefinementPredicate,
        levels: usize,
        selective: usize,
    ) -> Self {
        let n_passes = levels.saturating_sub(1);
        let first_selective = n_passes.saturating_sub(selective);

        let passes = (0..n_passes)
            .map(|level| {
                let uniform = level < first_selective;
                let flags: Vec<bool> = if uniform {
                    vec![true; mesh.n_elements()]
                } else {
                    mesh.elements
                        .iter()
                        .map(|e| predicate.should_refine(e.group, level))
                        .collect()
                };
                let pass = RefinementPass { level, uniform, flags };
                debug!(
                    "细化层 {} -> {}: {} / {} 单元 ({})",
                    level,
                    level + 1,
                    pass.n_marked(),
                    mesh.n_elements(),
                    if uniform { "均匀" } else { "选择性" }
                );
                pass
            })
            .collect();

        Self { levels, passes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Element, ElementShape};
    use glam::DVec3;

    fn mesh_with_groups(groups: &[u32]) -> MeshDescription {
        MeshDescription {
            nodes: vec![DVec3::ZERO; 3],
            elements: groups
                .iter()
                .map(|&g| Element { shape: ElementShape::Triangle, nodes: vec![0, 1, 2], group: g })
                .collect(),
            dimension: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_group_rule() {
        let p = GroupRefinement;
        for level in [0, 1, 2, 10] {
            assert!(p.should_refine(5, level));
            assert!(p.should_refine(6, level));
        }
        assert!(p.should_refine(7, 4));
        assert!(!p.should_refine(7, 5));
        assert!(!p.should_refine(7, 6));
        assert!(!p.should_refine(99, 0));
    }

    #[test]
    fn test_closure_predicate() {
        let only_one = |group: u32, _level: usize| group == 1;
        assert!(only_one.should_refine(1, 3));
        assert!(!only_one.should_refine(2, 3));
    }

    #[test]
    fn test_plan_all_uniform() {
        let mesh = mesh_with_groups(&[1, 5, 7]);
        let plan = RefinementPlan::build(&mesh, &GroupRefinement, 4, 0);
        assert_eq!(plan.passes.len(), 3);
        assert!(plan.passes.iter().all(|p| p.uniform && p.n_marked() == 3));
    }

    #[test]
    fn test_plan_selective_tail() {
        let mesh = mesh_with_groups(&[1, 5, 7]);
        let plan = RefinementPlan::build(&mesh, &GroupRefinement, 7, 2);
        assert_eq!(plan.passes.len(), 6);
        assert!(plan.passes[3].uniform);
        // 第 4 层: 组 7 仍细化
        assert_eq!(plan.passes[4].flags, vec![false, true, true]);
        // 第 5 层: 组 7 停止细化
        assert_eq!(plan.passes[5].flags, vec![false, true, false]);
    }

    #[test]
    fn test_single_level_has_no_passes() {
        let mesh = mesh_with_groups(&[5]);
        let plan = RefinementPlan::build(&mesh, &GroupRefinement, 1, 0);
        assert!(plan.passes.is_empty());
    }
}
