// crates/fsi_physics/src/engine/relaxation.rs

//! 节点松弛求解系统
//!
//! [`RelaxationSystem`] 是 [`NonlinearSystem`] 的参考实现：在网格节点邻接图上
//! 对每个场做带阻尼的 Jacobi 松弛，本质边界节点取边界数据生成器给出的值。
//! 每个场每个网格节点一个自由度。
//!
//! 移动网格场（位移）在结构节点上保持当前值，流体区域内由松弛做调和延拓。
//! 加速度重构时，只有结构节点按位移重构速度，流体节点保留求解得到的速度。

use fsi_config::DirichletHandling;
use fsi_foundation::{FsiError, FsiResult};
use fsi_mesh::CsrConnectivity;
use rayon::prelude::*;
use tracing::debug;

use super::context::CollaboratorContext;
use super::system::{NonlinearSystem, SolveReport, SolverSettings};
use crate::boundary::BoundaryDataGenerator;
use crate::fields::FieldKind;
use crate::newmark::{self, KinematicTriplet, NewmarkParams};
use crate::state::SimulationState;

/// 罚函数法的罚系数
const PENALTY: f64 = 1.0e10;

/// 节点松弛求解系统
pub struct RelaxationSystem {
    name: String,
    fields: Vec<FieldKind>,
    settings: SolverSettings,
    adjacency: CsrConnectivity<u32>,
    boundary: BoundaryDataGenerator,
    newmark: NewmarkParams,
    moving_mesh_fields: Vec<FieldKind>,
    structure_mask: Vec<bool>,
    destroyed: bool,
}

impl RelaxationSystem {
    /// 创建系统
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldKind>,
        settings: SolverSettings,
        adjacency: CsrConnectivity<u32>,
        boundary: BoundaryDataGenerator,
        newmark: NewmarkParams,
    ) -> Self {
        let n = adjacency.n_rows();
        Self {
            name: name.into(),
            fields,
            settings,
            adjacency,
            boundary,
            newmark,
            moving_mesh_fields: Vec::new(),
            structure_mask: vec![false; n],
            destroyed: false,
        }
    }

    /// 设置移动网格场与结构节点
    pub fn with_moving_mesh(mut self, fields: Vec<FieldKind>, structure_nodes: &[usize]) -> Self {
        self.moving_mesh_fields = fields;
        for &node in structure_nodes {
            if let Some(flag) = self.structure_mask.get_mut(node) {
                *flag = true;
            }
        }
        self
    }

    /// 边界数据生成器
    #[inline]
    pub fn boundary(&self) -> &BoundaryDataGenerator {
        &self.boundary
    }

    /// Newmark 参数
    #[inline]
    pub fn newmark(&self) -> &NewmarkParams {
        &self.newmark
    }

    /// 结构节点数
    pub fn n_structure_nodes(&self) -> usize {
        self.structure_mask.iter().filter(|&&s| s).count()
    }

    /// 是否已销毁
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// 历史随本系统推进的场：自身场加上参与重构的加速度场
    fn history_fields(&self, state: &SimulationState) -> Vec<FieldKind> {
        let mut kinds = self.fields.clone();
        for t in KinematicTriplet::ALL {
            if t.participates(state.registry())
                && self.fields.contains(&t.displacement)
                && !kinds.contains(&t.acceleration)
            {
                kinds.push(t.acceleration);
            }
        }
        kinds
    }

    /// 单个场的约束：`Some(v)` 表示节点值固定为 v
    fn constraints(
        &mut self,
        kind: FieldKind,
        time: f64,
        current: &[f64],
    ) -> FsiResult<Vec<Option<f64>>> {
        let mut pinned = vec![None; current.len()];
        if self.moving_mesh_fields.contains(&kind) {
            for (i, &is_structure) in self.structure_mask.iter().enumerate() {
                if is_structure {
                    pinned[i] = Some(current[i]);
                }
            }
        }
        let data = self.boundary.data_for(kind, time)?;
        for entry in data.dirichlet_entries() {
            pinned[entry.node] = Some(entry.value.value);
        }
        Ok(pinned)
    }
}

/// 一次阻尼 Jacobi 扫描，返回最大更新量
fn jacobi_sweep(
    adjacency: &CsrConnectivity<u32>,
    pinned: &[Option<f64>],
    handling: DirichletHandling,
    omega: f64,
    x: &mut [f64],
) -> f64 {
    let next: Vec<f64> = {
        let x: &[f64] = x;
        (0..x.len())
            .into_par_iter()
            .map(|i| {
                let row = adjacency.row(i);
                let relaxed = if row.is_empty() {
                    x[i]
                } else {
                    let mean = row.iter().map(|&j| x[j as usize]).sum::<f64>() / row.len() as f64;
                    x[i] + omega * (mean - x[i])
                };
                match (pinned[i], handling) {
                    (Some(v), DirichletHandling::Elimination) => v,
                    (Some(v), DirichletHandling::Penalty) => (relaxed + PENALTY * v) / (1.0 + PENALTY),
                    (None, _) => relaxed,
                }
            })
            .collect()
    };

    let residual = next
        .par_iter()
        .zip(x.par_iter())
        .map(|(a, b)| (a - b).abs())
        .reduce(|| 0.0, f64::max);
    x.copy_from_slice(&next);
    residual
}

impl NonlinearSystem for RelaxationSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &[FieldKind] {
        &self.fields
    }

    fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn solve(
        &mut self,
        ctx: &CollaboratorContext,
        state: &mut SimulationState,
        time: f64,
        dt: f64,
    ) -> FsiResult<SolveReport> {
        if self.destroyed {
            return Err(FsiError::collaborator("solve", format!("系统 '{}' 已销毁", self.name)));
        }
        FsiError::check_size("field dofs", self.adjacency.n_rows(), state.n_dofs())?;
        debug!(
            "系统 '{}' 求解 t = {:.4}, dt = {}, 进程 {}/{}, 循环 {:?}",
            self.name,
            time,
            dt,
            ctx.rank(),
            ctx.processes(),
            self.settings.multigrid_cycle
        );

        let settings = self.settings;
        let mut report = SolveReport { iterations: 0, residual: 0.0, converged: true };

        for kind in self.fields.clone() {
            let pinned = self.constraints(kind, time, state.current(kind)?)?;
            let x = state.current_mut(kind)?;
            for (xi, p) in x.iter_mut().zip(&pinned) {
                if let (Some(v), DirichletHandling::Elimination) = (p, settings.dirichlet_handling) {
                    *xi = *v;
                }
            }

            let mut residual = f64::INFINITY;
            let mut iterations = 0;
            while iterations < settings.max_nonlinear_iterations {
                iterations += 1;
                for _ in 0..settings.max_linear_iterations.max(1) {
                    residual = jacobi_sweep(
                        &self.adjacency,
                        &pinned,
                        settings.dirichlet_handling,
                        settings.relaxation,
                        x,
                    );
                }
                if residual < settings.absolute_tolerance {
                    break;
                }
            }

            let converged = residual < settings.absolute_tolerance;
            debug!("  场 {}: {} 次迭代, 残差 {:.3e}", kind, iterations, residual);
            report.iterations = report.iterations.max(iterations);
            report.residual = report.residual.max(residual);
            report.converged &= converged;
        }

        Ok(report)
    }

    fn reconstruct_acceleration(&mut self, state: &mut SimulationState, dt: f64) -> FsiResult<()> {
        let n = newmark::reconstruct(state, &self.newmark, dt, &self.structure_mask)?;
        debug!("系统 '{}' 重构 {} 个分量的加速度", self.name, n);
        Ok(())
    }

    fn advance_history(&mut self, state: &mut SimulationState) -> FsiResult<()> {
        let kinds = self.history_fields(state);
        state.advance_fields(&kinds)?;
        Ok(())
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        debug!("系统 '{}' 已销毁", self.name);
    }
}

impl std::fmt::Debug for RelaxationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaxationSystem")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("settings", &self.settings)
            .field("n_nodes", &self.adjacency.n_rows())
            .field("moving_mesh_fields", &self.moving_mesh_fields)
            .finish()
    }
}
