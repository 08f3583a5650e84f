// crates/fsi_config/src/simulation_config.rs

//! SimulationConfig - 流固耦合瞬态模拟配置
//!
//! 所有数值使用 f64 存储以便 JSON 序列化，缺省值对应 Turek FSI 基准算例
//! （`./input/fsifirst.neu`，4 层多重网格，15 次非线性迭代上限）。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 模拟配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 网格配置
    #[serde(default)]
    pub mesh: MeshConfig,

    /// 材料参数
    #[serde(default)]
    pub materials: MaterialsConfig,

    /// 非线性求解器设置
    #[serde(default)]
    pub solver: SolverSettingsConfig,

    /// 时间推进设置
    #[serde(default)]
    pub time: TimeConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 并行上下文
    #[serde(default)]
    pub parallel: ParallelConfig,
}

// ============================================================
// 网格
// ============================================================

/// 网格配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// 网格文件路径（Gambit 中性文件）
    #[serde(default = "default_mesh_file")]
    pub file: PathBuf,

    /// 多重网格总层数
    #[serde(default = "default_multigrid_levels")]
    pub multigrid_levels: usize,

    /// 选择性细化层数（超出均匀层的部分按细化判据标记）
    #[serde(default)]
    pub selective_levels: usize,

    /// 视为结构区域的单元组材料标签
    #[serde(default = "default_solid_materials")]
    pub solid_materials: Vec<u32>,
}

fn default_mesh_file() -> PathBuf { PathBuf::from("./input/fsifirst.neu") }
fn default_multigrid_levels() -> usize { 4 }
fn default_solid_materials() -> Vec<u32> { vec![4] }

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            file: default_mesh_file(),
            multigrid_levels: default_multigrid_levels(),
            selective_levels: 0,
            solid_materials: default_solid_materials(),
        }
    }
}

impl MeshConfig {
    /// 均匀细化层数
    pub fn uniform_levels(&self) -> usize {
        self.multigrid_levels.saturating_sub(self.selective_levels)
    }
}

// ============================================================
// 材料
// ============================================================

/// 流体本构模型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FluidModel {
    /// 牛顿流体
    #[default]
    Newtonian,
}

/// 固体本构模型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SolidModel {
    /// 线弹性
    LinearElastic,
    /// Neo-Hookean 超弹性
    #[default]
    NeoHookean,
    /// Mooney-Rivlin 超弹性
    MooneyRivlin,
}

/// 材料参数配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialsConfig {
    /// 流体
    #[serde(default)]
    pub fluid: FluidConfig,
    /// 固体
    #[serde(default)]
    pub solid: SolidConfig,
    /// 无量纲化参考尺度
    #[serde(default)]
    pub reference: ReferenceConfig,
}

/// 流体参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidConfig {
    /// 密度 [kg/m³]
    #[serde(default = "default_density")]
    pub density: f64,
    /// 动力黏度 [Pa·s]
    #[serde(default = "default_viscosity")]
    pub viscosity: f64,
    /// 本构模型
    #[serde(default)]
    pub model: FluidModel,
}

/// 固体参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolidConfig {
    /// 密度 [kg/m³]
    #[serde(default = "default_density")]
    pub density: f64,
    /// 杨氏模量 [Pa]
    #[serde(default = "default_young_modulus")]
    pub young_modulus: f64,
    /// 泊松比
    #[serde(default = "default_poisson_ratio")]
    pub poisson_ratio: f64,
    /// 本构模型
    #[serde(default)]
    pub model: SolidModel,
}

/// 参考尺度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// 参考长度 [m]
    #[serde(default = "default_unit")]
    pub length: f64,
    /// 参考速度 [m/s]
    #[serde(default = "default_unit")]
    pub velocity: f64,
}

fn default_density() -> f64 { 1000.0 }
fn default_viscosity() -> f64 { 1.0 }
fn default_young_modulus() -> f64 { 5.6e6 }
fn default_poisson_ratio() -> f64 { 0.4 }
fn default_unit() -> f64 { 1.0 }

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            viscosity: default_viscosity(),
            model: FluidModel::default(),
        }
    }
}

impl Default for SolidConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            young_modulus: default_young_modulus(),
            poisson_ratio: default_poisson_ratio(),
            model: SolidModel::default(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            length: default_unit(),
            velocity: default_unit(),
        }
    }
}

// ============================================================
// 求解器
// ============================================================

/// 多重网格循环类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MultigridCycle {
    /// V 循环
    #[default]
    VCycle,
    /// F 循环
    FCycle,
    /// W 循环
    WCycle,
}

/// Dirichlet 边界处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DirichletHandling {
    /// 消元法
    #[default]
    Elimination,
    /// 罚函数法
    Penalty,
}

/// 非线性求解器设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSettingsConfig {
    /// 每次非线性迭代内的最大线性迭代次数
    #[serde(default = "default_max_linear_iterations")]
    pub max_linear_iterations: usize,
    /// 绝对收敛容差
    #[serde(default = "default_absolute_tolerance")]
    pub absolute_tolerance: f64,
    /// 多重网格循环类型
    #[serde(default)]
    pub multigrid_cycle: MultigridCycle,
    /// 非线性迭代上限
    #[serde(default = "default_max_nonlinear_iterations")]
    pub max_nonlinear_iterations: usize,
    /// Dirichlet 处理策略
    #[serde(default)]
    pub dirichlet_handling: DirichletHandling,
    /// 松弛因子（参考松弛求解器使用）
    #[serde(default = "default_relaxation")]
    pub relaxation: f64,
}

fn default_max_linear_iterations() -> usize { 1 }
fn default_absolute_tolerance() -> f64 { 1e-8 }
fn default_max_nonlinear_iterations() -> usize { 15 }
fn default_relaxation() -> f64 { 1.0 }

impl Default for SolverSettingsConfig {
    fn default() -> Self {
        Self {
            max_linear_iterations: default_max_linear_iterations(),
            absolute_tolerance: default_absolute_tolerance(),
            multigrid_cycle: MultigridCycle::default(),
            max_nonlinear_iterations: default_max_nonlinear_iterations(),
            dirichlet_handling: DirichletHandling::default(),
            relaxation: default_relaxation(),
        }
    }
}

// ============================================================
// 时间推进
// ============================================================

/// 非线性迭代达到上限而未收敛时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConvergencePolicy {
    /// 记录警告并继续推进
    #[default]
    LogAndContinue,
    /// 立即终止模拟
    Abort,
}

/// 时间推进设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// 时间步数
    #[serde(default = "default_num_steps")]
    pub num_steps: usize,
    /// 输出间隔（步）
    #[serde(default = "default_write_interval")]
    pub write_interval: usize,
    /// Newmark β
    #[serde(default = "default_newmark_beta")]
    pub newmark_beta: f64,
    /// Newmark γ
    #[serde(default = "default_newmark_gamma")]
    pub newmark_gamma: f64,
    /// 未收敛处理策略
    #[serde(default)]
    pub convergence_policy: ConvergencePolicy,
}

fn default_num_steps() -> usize { 5 }
fn default_write_interval() -> usize { 1 }
fn default_newmark_beta() -> f64 { 0.25 }
fn default_newmark_gamma() -> f64 { 0.5 }

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            num_steps: default_num_steps(),
            write_interval: default_write_interval(),
            newmark_beta: default_newmark_beta(),
            newmark_gamma: default_newmark_gamma(),
            convergence_policy: ConvergencePolicy::default(),
        }
    }
}

// ============================================================
// 输出
// ============================================================

/// VTU 数据编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    /// ASCII 文本
    #[default]
    Ascii,
    /// base64 附加二进制
    Binary,
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// 输出插值族名称
    #[serde(default = "default_output_family")]
    pub family: String,
    /// 输出的场名称
    #[serde(default = "default_output_fields")]
    pub fields: Vec<String>,
    /// 数据编码
    #[serde(default)]
    pub encoding: OutputEncoding,
    /// 是否写出 PVD 时间序列索引
    #[serde(default = "default_write_pvd")]
    pub write_pvd: bool,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_output_family() -> String { "biquadratic".to_string() }
fn default_output_fields() -> Vec<String> {
    ["DX", "DY", "U", "V", "P"].iter().map(|s| s.to_string()).collect()
}
fn default_write_pvd() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            family: default_output_family(),
            fields: default_output_fields(),
            encoding: OutputEncoding::default(),
            write_pvd: default_write_pvd(),
        }
    }
}

/// 并行上下文配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// 协作进程数
    #[serde(default = "default_processes")]
    pub processes: usize,
}

fn default_processes() -> usize { 1 }

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { processes: default_processes() }
    }
}

// ============================================================
// 加载与校验
// ============================================================

impl SimulationConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: SimulationConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_mesh()?;
        self.validate_materials()?;
        self.validate_solver()?;
        self.validate_time()?;

        if self.output.fields.is_empty() {
            return Err(ConfigError::Missing("output.fields".to_string()));
        }
        if self.parallel.processes == 0 {
            return Err(ConfigError::invalid("parallel.processes", 0, "进程数必须为正"));
        }
        Ok(())
    }

    fn validate_mesh(&self) -> Result<(), ConfigError> {
        let mesh = &self.mesh;
        if mesh.multigrid_levels == 0 {
            return Err(ConfigError::invalid("mesh.multigrid_levels", 0, "至少需要一层网格"));
        }
        if mesh.selective_levels > mesh.multigrid_levels {
            return Err(ConfigError::invalid(
                "mesh.selective_levels",
                mesh.selective_levels,
                "不能超过多重网格总层数",
            ));
        }
        Ok(())
    }

    fn validate_materials(&self) -> Result<(), ConfigError> {
        let m = &self.materials;
        positive("materials.fluid.density", m.fluid.density)?;
        positive("materials.fluid.viscosity", m.fluid.viscosity)?;
        positive("materials.solid.density", m.solid.density)?;
        positive("materials.solid.young_modulus", m.solid.young_modulus)?;
        positive("materials.reference.length", m.reference.length)?;
        positive("materials.reference.velocity", m.reference.velocity)?;

        let nu = m.solid.poisson_ratio;
        if !(nu > -1.0 && nu < 0.5) {
            return Err(ConfigError::invalid(
                "materials.solid.poisson_ratio",
                nu,
                "泊松比必须在 (-1, 0.5) 范围内",
            ));
        }
        Ok(())
    }

    fn validate_solver(&self) -> Result<(), ConfigError> {
        let s = &self.solver;
        if s.max_linear_iterations == 0 {
            return Err(ConfigError::invalid("solver.max_linear_iterations", 0, "必须为正"));
        }
        if s.max_nonlinear_iterations == 0 {
            return Err(ConfigError::invalid("solver.max_nonlinear_iterations", 0, "必须为正"));
        }
        positive("solver.absolute_tolerance", s.absolute_tolerance)?;
        if !(s.relaxation > 0.0 && s.relaxation <= 1.0) {
            return Err(ConfigError::invalid(
                "solver.relaxation",
                s.relaxation,
                "松弛因子必须在 (0, 1] 范围内",
            ));
        }
        Ok(())
    }

    fn validate_time(&self) -> Result<(), ConfigError> {
        let t = &self.time;
        if t.write_interval == 0 {
            return Err(ConfigError::invalid("time.write_interval", 0, "输出间隔必须为正"));
        }
        positive("time.newmark_beta", t.newmark_beta)?;
        positive("time.newmark_gamma", t.newmark_gamma)?;
        Ok(())
    }
}

fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, value, "必须为有限正数"))
    }
}
