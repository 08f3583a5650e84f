// crates/fsi_physics/src/engine/system.rs

//! 非线性瞬态系统接口
//!
//! 驱动器只通过 [`NonlinearSystem`] 与求解协作者交互：求解、加速度重构、
//! 历史推进。组装与多重网格求解本身不在本 crate 内实现。

use fsi_config::{DirichletHandling, MultigridCycle, SolverSettingsConfig};
use fsi_foundation::FsiResult;
use serde::{Deserialize, Serialize};

use super::context::CollaboratorContext;
use crate::fields::FieldKind;
use crate::state::SimulationState;

/// 非线性求解设置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// 每次非线性迭代的最大线性迭代次数
    pub max_linear_iterations: usize,
    /// 绝对收敛容差
    pub absolute_tolerance: f64,
    /// 多重网格循环类型
    pub multigrid_cycle: MultigridCycle,
    /// 非线性迭代上限
    pub max_nonlinear_iterations: usize,
    /// Dirichlet 处理策略
    pub dirichlet_handling: DirichletHandling,
    /// 松弛因子
    pub relaxation: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self::from(&SolverSettingsConfig::default())
    }
}

impl From<&SolverSettingsConfig> for SolverSettings {
    fn from(c: &SolverSettingsConfig) -> Self {
        Self {
            max_linear_iterations: c.max_linear_iterations,
            absolute_tolerance: c.absolute_tolerance,
            multigrid_cycle: c.multigrid_cycle,
            max_nonlinear_iterations: c.max_nonlinear_iterations,
            dirichlet_handling: c.dirichlet_handling,
            relaxation: c.relaxation,
        }
    }
}

/// 单次求解报告
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// 实际执行的非线性迭代次数
    pub iterations: usize,
    /// 最终残差
    pub residual: f64,
    /// 是否达到容差
    pub converged: bool,
}

/// 非线性瞬态系统
///
/// 每个时间步驱动器依次调用 `solve`、`reconstruct_acceleration`、`advance_history`。
pub trait NonlinearSystem: Send {
    /// 系统名称
    fn name(&self) -> &str;

    /// 系统求解的场
    fn fields(&self) -> &[FieldKind];

    /// 求解设置
    fn settings(&self) -> &SolverSettings;

    /// 在 `time` 处以步长 `dt` 求解一步，结果写入各场的当前层
    ///
    /// 达到迭代上限而未收敛不是错误，通过 `SolveReport::converged` 报告。
    fn solve(
        &mut self,
        ctx: &CollaboratorContext,
        state: &mut SimulationState,
        time: f64,
        dt: f64,
    ) -> FsiResult<SolveReport>;

    /// 由新位移重构加速度与速度
    fn reconstruct_acceleration(&mut self, state: &mut SimulationState, dt: f64) -> FsiResult<()>;

    /// 推进本系统负责的场的历史
    fn advance_history(&mut self, state: &mut SimulationState) -> FsiResult<()>;

    /// 销毁系统持有的协作者资源
    fn destroy(&mut self) {}
}
