// crates/fsi_physics/src/state.rs

//! 模拟状态管理
//!
//! 本模块提供瞬态耦合求解所需的状态容器：
//! - FieldHistory: 单个场的多时间层数据
//! - SimulationState: 当前时间、步号与所有已注册场
//!
//! # 布局设计
//!
//! 每个场按时间层存储 SoA 数组，第 0 层为当前值：
//! ```text
//! DX: level 0 [d_0, d_1, ...]   <- 当前
//!     level 1 [d_0, d_1, ...]   <- 上一时间步
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::fields::{FieldDescriptor, FieldError, FieldKind, FieldRegistry};

// ============================================================
// 场历史
// ============================================================

/// 单个场的多时间层数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldHistory {
    levels: Vec<Vec<f64>>,
}

impl FieldHistory {
    /// 创建全零历史
    pub fn zeros(n_levels: usize, n_dofs: usize) -> Self {
        Self {
            levels: vec![vec![0.0; n_dofs]; n_levels],
        }
    }

    /// 时间层数
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// 自由度数
    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// 当前值
    #[inline]
    pub fn current(&self) -> &[f64] {
        &self.levels[0]
    }

    /// 当前值（可变）
    #[inline]
    pub fn current_mut(&mut self) -> &mut [f64] {
        &mut self.levels[0]
    }

    /// 第 `level` 层（0 为当前）
    #[inline]
    pub fn level(&self, level: usize) -> Option<&[f64]> {
        self.levels.get(level).map(Vec::as_slice)
    }

    /// 推进历史：第 k 层复制到第 k+1 层，当前值保留作为下一步的初值
    pub fn advance(&mut self) {
        for k in (1..self.levels.len()).rev() {
            let (older, newer) = self.levels.split_at_mut(k);
            newer[0].copy_from_slice(&older[k - 1]);
        }
    }
}

// ============================================================
// 模拟状态
// ============================================================

/// 模拟状态
///
/// 在问题建立时创建一次（所有场零初始化），由驱动器每个时间步原地更新。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// 当前模拟时间
    pub time: f64,
    /// 当前步号
    pub step: usize,
    n_dofs: usize,
    registry: FieldRegistry,
    fields: HashMap<FieldKind, FieldHistory>,
}

impl SimulationState {
    /// 按注册表创建全零状态
    pub fn new(registry: FieldRegistry, n_dofs: usize) -> Self {
        let fields = registry
            .iter()
            .map(|d| (d.kind, FieldHistory::zeros(d.history_levels, n_dofs)))
            .collect();
        Self {
            time: 0.0,
            step: 0,
            n_dofs,
            registry,
            fields,
        }
    }

    /// 每个场的自由度数
    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// 场注册表
    #[inline]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// 场描述
    #[inline]
    pub fn descriptor(&self, kind: FieldKind) -> Result<&FieldDescriptor, FieldError> {
        self.registry.require(kind)
    }

    /// 检查场是否已注册
    #[inline]
    pub fn contains(&self, kind: FieldKind) -> bool {
        self.fields.contains_key(&kind)
    }

    /// 场历史
    pub fn field(&self, kind: FieldKind) -> Result<&FieldHistory, FieldError> {
        self.fields.get(&kind).ok_or(FieldError::NotRegistered(kind))
    }

    /// 场历史（可变）
    pub fn field_mut(&mut self, kind: FieldKind) -> Result<&mut FieldHistory, FieldError> {
        self.fields.get_mut(&kind).ok_or(FieldError::NotRegistered(kind))
    }

    /// 场当前值
    pub fn current(&self, kind: FieldKind) -> Result<&[f64], FieldError> {
        self.field(kind).map(FieldHistory::current)
    }

    /// 场当前值（可变）
    pub fn current_mut(&mut self, kind: FieldKind) -> Result<&mut [f64], FieldError> {
        self.field_mut(kind).map(FieldHistory::current_mut)
    }

    /// 场上一时间层的值
    pub fn previous(&self, kind: FieldKind) -> Result<&[f64], FieldError> {
        let history = self.field(kind)?;
        history.level(1).ok_or(FieldError::InsufficientHistory {
            kind,
            required: 2,
            available: history.n_levels(),
        })
    }

    /// 推进所有场的历史
    pub fn advance_history(&mut self) {
        for history in self.fields.values_mut() {
            history.advance();
        }
    }

    /// 只推进指定场的历史
    pub fn advance_fields(&mut self, kinds: &[FieldKind]) -> Result<(), FieldError> {
        for &kind in kinds {
            self.field(kind)?;
        }
        for &kind in kinds {
            self.field_mut(kind)?.advance();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::InterpolationFamily;

    fn state() -> SimulationState {
        let mut reg = FieldRegistry::new();
        reg.register(FieldDescriptor::new(FieldKind::Dx, InterpolationFamily::Biquadratic, 2)).unwrap();
        reg.register(FieldDescriptor::new(FieldKind::P, InterpolationFamily::DiscLinear, 1)).unwrap();
        SimulationState::new(reg, 3)
    }

    #[test]
    fn test_zero_initialised() {
        let s = state();
        assert_eq!(s.time, 0.0);
        assert_eq!(s.step, 0);
        assert_eq!(s.current(FieldKind::Dx).unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(s.field(FieldKind::Dx).unwrap().n_levels(), 2);
    }

    #[test]
    fn test_unregistered_field() {
        let s = state();
        assert_eq!(s.current(FieldKind::U), Err(FieldError::NotRegistered(FieldKind::U)));
    }

    #[test]
    fn test_previous_requires_two_levels() {
        let s = state();
        assert!(s.previous(FieldKind::Dx).is_ok());
        assert!(matches!(
            s.previous(FieldKind::P),
            Err(FieldError::InsufficientHistory { available: 1, .. })
        ));
    }

    #[test]
    fn test_advance_history() {
        let mut s = state();
        s.current_mut(FieldKind::Dx).unwrap().copy_from_slice(&[1.0, 2.0, 3.0]);
        s.advance_history();
        assert_eq!(s.previous(FieldKind::Dx).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(s.current(FieldKind::Dx).unwrap(), &[1.0, 2.0, 3.0]);

        s.current_mut(FieldKind::Dx).unwrap()[0] = 5.0;
        assert_eq!(s.previous(FieldKind::Dx).unwrap()[0], 1.0);
    }

    #[test]
    fn test_advance_selected_fields() {
        let mut s = state();
        s.current_mut(FieldKind::Dx).unwrap()[0] = 2.0;
        assert!(s.advance_fields(&[FieldKind::Dx, FieldKind::U]).is_err());
        // 出错时不推进任何场
        assert_eq!(s.previous(FieldKind::Dx).unwrap()[0], 0.0);

        s.advance_fields(&[FieldKind::Dx]).unwrap();
        assert_eq!(s.previous(FieldKind::Dx).unwrap()[0], 2.0);
    }

    #[test]
    fn test_three_level_shift() {
        let mut h = FieldHistory::zeros(3, 1);
        h.current_mut()[0] = 1.0;
        h.advance();
        h.current_mut()[0] = 2.0;
        h.advance();
        assert_eq!(h.level(1), Some(&[2.0][..]));
        assert_eq!(h.level(2), Some(&[1.0][..]));
    }
}
