// crates/fsi_physics/src/engine/driver.rs

//! 瞬态模拟驱动器
//!
//! 每个时间步的执行顺序固定为：
//!
//! ```text
//! dt = policy.dt(t)
//!   -> 所有系统 solve
//!   -> 所有系统 reconstruct_acceleration
//!   -> 所有系统 advance_history
//!   -> step % write_interval == 0 时写快照
//!   -> t += dt, step += 1
//! ```
//!
//! 协作者调用失败时立即终止，错误携带步号与时间。

use fsi_config::ConvergencePolicy;
use fsi_foundation::{FsiError, FsiResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::context::Session;
use super::timestep::TimeStepPolicy;
use crate::fields::{FieldError, FieldKind};
use crate::state::SimulationState;

// ============================================================
// 输出协作者
// ============================================================

/// 快照输出
pub trait SnapshotWriter {
    /// 写出 `fields` 在第 `step` 步的当前值
    fn write_snapshot(
        &mut self,
        state: &SimulationState,
        fields: &[FieldKind],
        step: usize,
    ) -> FsiResult<()>;

    /// 模拟结束时调用（写出索引文件等）
    fn finish(&mut self) -> FsiResult<()> {
        Ok(())
    }
}

// ============================================================
// 错误
// ============================================================

/// 驱动器错误
#[derive(Debug, Error)]
pub enum DriverError {
    /// 输出间隔为零
    #[error("输出间隔必须为正")]
    InvalidWriteInterval,

    /// 输出场未注册
    #[error(transparent)]
    Field(#[from] FieldError),

    /// 会话不可用
    #[error("会话不可用: {0}")]
    Session(FsiError),

    /// 系统求解失败
    #[error("第 {step} 步 (t = {time}) 系统 '{system}' 求解失败: {source}")]
    Solve {
        /// 步号
        step: usize,
        /// 时间
        time: f64,
        /// 系统名称
        system: String,
        /// 底层错误
        source: FsiError,
    },

    /// 非线性迭代未收敛且策略为终止
    #[error("第 {step} 步 (t = {time}) 非线性迭代 {iterations} 次后未收敛 (残差 {residual:.3e})")]
    NotConverged {
        /// 步号
        step: usize,
        /// 时间
        time: f64,
        /// 已执行的迭代次数
        iterations: usize,
        /// 最终残差
        residual: f64,
    },

    /// 加速度重构或历史推进失败
    #[error("第 {step} 步 (t = {time}) 时间层更新失败: {source}")]
    Reconstruct {
        /// 步号
        step: usize,
        /// 时间
        time: f64,
        /// 底层错误
        source: FsiError,
    },

    /// 快照写出失败
    #[error("第 {step} 步 (t = {time}) 快照写出失败: {source}")]
    Snapshot {
        /// 步号
        step: usize,
        /// 时间
        time: f64,
        /// 底层错误
        source: FsiError,
    },
}

impl From<DriverError> for FsiError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Session(e) => e,
            DriverError::Field(e) => e.into(),
            other @ DriverError::InvalidWriteInterval => FsiError::config(other.to_string()),
            other @ DriverError::Snapshot { .. } => FsiError::io(other.to_string()),
            other => FsiError::collaborator("run", other.to_string()),
        }
    }
}

// ============================================================
// 运行摘要
// ============================================================

/// 运行摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 完成的步数
    pub steps: usize,
    /// 结束时间
    pub final_time: f64,
    /// 结束步号
    pub final_step: usize,
    /// 已写出快照的步号
    pub snapshots: Vec<usize>,
    /// 未收敛的步号
    pub unconverged_steps: Vec<usize>,
    /// 非线性迭代总数
    pub total_nonlinear_iterations: usize,
}

impl RunSummary {
    /// 是否所有步都收敛
    #[inline]
    pub fn all_converged(&self) -> bool {
        self.unconverged_steps.is_empty()
    }
}

// ============================================================
// 驱动器
// ============================================================

/// 瞬态模拟驱动器
pub struct SimulationDriver {
    time_step: Box<dyn TimeStepPolicy>,
    convergence: ConvergencePolicy,
    output_fields: Vec<FieldKind>,
}

impl SimulationDriver {
    /// 以给定步长策略创建驱动器
    pub fn new(time_step: Box<dyn TimeStepPolicy>) -> Self {
        Self {
            time_step,
            convergence: ConvergencePolicy::default(),
            output_fields: Vec::new(),
        }
    }

    /// 设置未收敛处理策略
    pub fn with_convergence_policy(mut self, policy: ConvergencePolicy) -> Self {
        self.convergence = policy;
        self
    }

    /// 设置快照包含的场
    pub fn with_output_fields(mut self, fields: Vec<FieldKind>) -> Self {
        self.output_fields = fields;
        self
    }

    /// 快照包含的场
    #[inline]
    pub fn output_fields(&self) -> &[FieldKind] {
        &self.output_fields
    }

    /// 未收敛处理策略
    #[inline]
    pub fn convergence_policy(&self) -> ConvergencePolicy {
        self.convergence
    }

    /// 执行 `num_steps` 个时间步
    pub fn run(
        &self,
        session: &mut Session,
        state: &mut SimulationState,
        writer: &mut dyn SnapshotWriter,
        num_steps: usize,
        write_interval: usize,
    ) -> Result<RunSummary, DriverError> {
        if write_interval == 0 {
            return Err(DriverError::InvalidWriteInterval);
        }
        for &kind in &self.output_fields {
            state.descriptor(kind)?;
        }

        let (ctx, systems) = session.parts_mut().map_err(DriverError::Session)?;
        info!(
            "开始瞬态模拟: {} 步, 每 {} 步输出, 步长策略 '{}', {} 个系统",
            num_steps,
            write_interval,
            self.time_step.name(),
            systems.len()
        );

        let mut summary = RunSummary::default();

        for _ in 0..num_steps {
            let step = state.step;
            let time = state.time;
            let dt = self.time_step.dt(time);
            info!("求解第 {} 步 (t = {:.4}, dt = {})", step, time, dt);

            let mut step_converged = true;
            for system in systems.iter_mut() {
                let report = system.solve(ctx, state, time, dt).map_err(|source| {
                    DriverError::Solve {
                        step,
                        time,
                        system: system.name().to_string(),
                        source,
                    }
                })?;
                summary.total_nonlinear_iterations += report.iterations;
                debug!(
                    "系统 '{}': {} 次非线性迭代, 残差 {:.3e}",
                    system.name(),
                    report.iterations,
                    report.residual
                );

                if !report.converged {
                    warn!(
                        "第 {} 步系统 '{}' 在 {} 次迭代后未达到容差 {:.1e} (残差 {:.3e})",
                        step,
                        system.name(),
                        report.iterations,
                        system.settings().absolute_tolerance,
                        report.residual
                    );
                    if self.convergence == ConvergencePolicy::Abort {
                        return Err(DriverError::NotConverged {
                            step,
                            time,
                            iterations: report.iterations,
                            residual: report.residual,
                        });
                    }
                    step_converged = false;
                }
            }
            if !step_converged {
                summary.unconverged_steps.push(step);
            }

            for system in systems.iter_mut() {
                system
                    .reconstruct_acceleration(state, dt)
                    .map_err(|source| DriverError::Reconstruct { step, time, source })?;
            }
            for system in systems.iter_mut() {
                system
                    .advance_history(state)
                    .map_err(|source| DriverError::Reconstruct { step, time, source })?;
            }

            if step % write_interval == 0 {
                writer
                    .write_snapshot(state, &self.output_fields, step)
                    .map_err(|source| DriverError::Snapshot { step, time, source })?;
                summary.snapshots.push(step);
            }

            state.time += dt;
            state.step += 1;
            summary.steps += 1;
        }

        summary.final_time = state.time;
        summary.final_step = state.step;
        info!(
            "瞬态模拟完成: {} 步, t = {:.4}, {} 个快照, {} 步未收敛",
            summary.steps,
            summary.final_time,
            summary.snapshots.len(),
            summary.unconverged_steps.len()
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for SimulationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationDriver")
            .field("time_step", &self.time_step.name())
            .field("convergence", &self.convergence)
            .field("output_fields", &self.output_fields)
            .finish()
    }
}
