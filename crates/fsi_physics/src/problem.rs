// crates/fsi_physics/src/problem.rs

//! 流固耦合问题装配
//!
//! [`FsiProblem`] 把配置与网格变成可运行的对象：
//! - 注册场（位移、速度、加速度、压力）并设置历史层数
//! - 标记结构节点与移动网格场
//! - 按细化判据生成多重网格细化计划
//! - 创建非线性系统、初始状态与驱动器

use std::sync::Arc;

use fsi_config::SimulationConfig;
use fsi_foundation::{FsiError, FsiResult};
use fsi_mesh::{GroupRefinement, MeshDescription, RefinementPlan};
use tracing::{debug, info};

use crate::boundary::{BcGenerationMode, BoundaryConditionProvider, BoundaryDataGenerator};
use crate::engine::{RelaxationSystem, SimulationDriver, SolverSettings, SteppedTimeStep};
use crate::fields::{
    FieldDescriptor, FieldError, FieldKind, FieldRegistry, InterpolationFamily, PhysicalMeaning,
};
use crate::material::{Fluid, ReferenceScales, Solid};
use crate::newmark::NewmarkParams;
use crate::state::SimulationState;

/// 流固耦合问题
#[derive(Debug, Clone)]
pub struct FsiProblem {
    mesh: MeshDescription,
    registry: FieldRegistry,
    output_fields: Vec<FieldKind>,
    output_family: InterpolationFamily,
    refinement: RefinementPlan,
    structure_nodes: Vec<usize>,
    moving_mesh_fields: Vec<FieldKind>,
    fluid: Fluid,
    solid: Solid,
    newmark: NewmarkParams,
    settings: SolverSettings,
    config: SimulationConfig,
}

impl FsiProblem {
    /// 耦合系统名称
    pub const SYSTEM_NAME: &'static str = "Fluid-Structure-Interaction";

    /// 耦合系统求解的场
    pub const SYSTEM_FIELDS: [FieldKind; 5] =
        [FieldKind::Dx, FieldKind::Dy, FieldKind::U, FieldKind::V, FieldKind::P];

    /// 标准场集合
    ///
    /// 位移、速度、加速度为双二次元并保留一层历史，压力为间断线性元。
    pub fn standard_registry() -> Result<FieldRegistry, FieldError> {
        use FieldKind::*;
        use InterpolationFamily::*;

        let mut reg = FieldRegistry::new();
        for kind in [Dx, Dy] {
            reg.register(
                FieldDescriptor::new(kind, Biquadratic, 2).with_meaning(PhysicalMeaning::Displacement),
            )?;
        }
        for kind in [U, V, Ax, Ay] {
            reg.register(FieldDescriptor::new(kind, Biquadratic, 2))?;
        }
        reg.register(FieldDescriptor::new(P, DiscLinear, 1).with_meaning(PhysicalMeaning::Pressure))?;
        Ok(reg)
    }

    /// 由配置与网格装配问题
    pub fn build(config: &SimulationConfig, mesh: MeshDescription) -> FsiResult<Self> {
        config.validate()?;
        if mesh.n_nodes() == 0 || mesh.n_elements() == 0 {
            return Err(FsiError::invalid_mesh("网格没有节点或单元"));
        }

        let registry = Self::standard_registry()?;
        let output_fields = FieldKind::parse_list(&config.output.fields)?;
        for &kind in &output_fields {
            registry.require(kind)?;
        }
        let output_family: InterpolationFamily = config.output.family.parse()?;

        let refinement = RefinementPlan::build(
            &mesh,
            &GroupRefinement,
            config.mesh.multigrid_levels,
            config.mesh.selective_levels,
        );
        let structure_nodes = fsi_mesh::structure_nodes(&mesh, &config.mesh.solid_materials);
        let moving_mesh_fields = registry.with_meaning(PhysicalMeaning::Displacement);

        let reference = ReferenceScales::from(&config.materials.reference);
        let fluid = Fluid::from_config(&config.materials.fluid, reference);
        let solid = Solid::from_config(&config.materials.solid, reference);

        info!(
            "问题装配完成: {} 节点, {} 单元, {} 个结构节点, {} 层网格",
            mesh.n_nodes(),
            mesh.n_elements(),
            structure_nodes.len(),
            refinement.levels
        );
        debug!("输出场 {:?}, 插值族 {}", output_fields, output_family);

        Ok(Self {
            mesh,
            registry,
            output_fields,
            output_family,
            refinement,
            structure_nodes,
            moving_mesh_fields,
            fluid,
            solid,
            newmark: NewmarkParams::new(config.time.newmark_beta, config.time.newmark_gamma),
            settings: SolverSettings::from(&config.solver),
            config: config.clone(),
        })
    }

    /// 各场的边界数据生成方式：U 随时间变化，其余定常
    pub fn boundary_modes(&self) -> Vec<(FieldKind, BcGenerationMode)> {
        self.registry
            .kinds()
            .iter()
            .map(|&kind| {
                let mode = if kind == FieldKind::U {
                    BcGenerationMode::TimeDependent
                } else {
                    BcGenerationMode::Steady
                };
                (kind, mode)
            })
            .collect()
    }

    /// 创建全零初始状态
    pub fn create_state(&self) -> SimulationState {
        SimulationState::new(self.registry.clone(), self.mesh.n_nodes())
    }

    /// 创建耦合系统
    pub fn create_system(
        &self,
        provider: Arc<dyn BoundaryConditionProvider>,
    ) -> FsiResult<RelaxationSystem> {
        let mut boundary = BoundaryDataGenerator::from_mesh(provider, &self.mesh, &self.registry)?;
        for (kind, mode) in self.boundary_modes() {
            boundary.set_mode(kind, mode)?;
        }

        let system = RelaxationSystem::new(
            Self::SYSTEM_NAME,
            Self::SYSTEM_FIELDS.to_vec(),
            self.settings,
            fsi_mesh::node_adjacency(&self.mesh),
            boundary,
            self.newmark,
        )
        .with_moving_mesh(self.moving_mesh_fields.clone(), &self.structure_nodes);
        Ok(system)
    }

    /// 创建驱动器
    pub fn driver(&self) -> SimulationDriver {
        SimulationDriver::new(Box::new(SteppedTimeStep::default()))
            .with_convergence_policy(self.config.time.convergence_policy)
            .with_output_fields(self.output_fields.clone())
    }

    /// 输出材料参数摘要
    pub fn log_materials(&self) {
        info!("{}", self.fluid);
        info!("{}", self.solid);
    }

    /// 网格
    #[inline]
    pub fn mesh(&self) -> &MeshDescription {
        &self.mesh
    }

    /// 场注册表
    #[inline]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// 快照包含的场
    #[inline]
    pub fn output_fields(&self) -> &[FieldKind] {
        &self.output_fields
    }

    /// 输出插值族
    #[inline]
    pub fn output_family(&self) -> InterpolationFamily {
        self.output_family
    }

    /// 细化计划
    #[inline]
    pub fn refinement(&self) -> &RefinementPlan {
        &self.refinement
    }

    /// 结构节点
    #[inline]
    pub fn structure_nodes(&self) -> &[usize] {
        &self.structure_nodes
    }

    /// 移动网格场
    #[inline]
    pub fn moving_mesh_fields(&self) -> &[FieldKind] {
        &self.moving_mesh_fields
    }

    /// 流体参数
    #[inline]
    pub fn fluid(&self) -> &Fluid {
        &self.fluid
    }

    /// 固体参数
    #[inline]
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    /// 配置
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_mesh::{Element, ElementGroup, ElementShape};
    use glam::DVec3;

    fn square() -> MeshDescription {
        MeshDescription {
            nodes: vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            elements: vec![Element { shape: ElementShape::Quadrilateral, nodes: vec![0, 1, 2, 3], group: 1 }],
            groups: vec![ElementGroup { id: 1, name: "solid".into(), material: 4, elements: vec![0] }],
            dimension: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_standard_registry() {
        let reg = FsiProblem::standard_registry().unwrap();
        assert_eq!(reg.len(), 7);
        assert_eq!(reg.require(FieldKind::P).unwrap().history_levels, 1);
        assert_eq!(reg.require(FieldKind::Ax).unwrap().history_levels, 2);
        assert_eq!(reg.with_meaning(PhysicalMeaning::Displacement), vec![FieldKind::Dx, FieldKind::Dy]);
        assert!(!reg.contains(FieldKind::Dz));
    }

    #[test]
    fn test_build_marks_structure_nodes() {
        let problem = FsiProblem::build(&SimulationConfig::default(), square()).unwrap();
        assert_eq!(problem.structure_nodes(), &[0, 1, 2, 3]);
        assert_eq!(problem.moving_mesh_fields(), &[FieldKind::Dx, FieldKind::Dy]);
        assert_eq!(problem.refinement().passes.len(), 3);
        assert_eq!(problem.create_state().n_dofs(), 4);
    }

    #[test]
    fn test_unknown_output_field_rejected() {
        let mut config = SimulationConfig::default();
        config.output.fields = vec!["DX".into(), "Q".into()];
        let err = FsiProblem::build(&config, square()).unwrap_err();
        assert!(err.to_string().contains("Q"));
    }

    #[test]
    fn test_boundary_modes() {
        let problem = FsiProblem::build(&SimulationConfig::default(), square()).unwrap();
        for (kind, mode) in problem.boundary_modes() {
            if kind == FieldKind::U {
                assert_eq!(mode, BcGenerationMode::TimeDependent);
            } else {
                assert_eq!(mode, BcGenerationMode::Steady);
            }
        }
    }

    #[test]
    fn test_empty_mesh_rejected() {
        assert!(FsiProblem::build(&SimulationConfig::default(), MeshDescription::default()).is_err());
    }
}
