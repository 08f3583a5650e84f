// apps/fsi_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 验证配置文件和 Gambit 网格文件的正确性。

use anyhow::{bail, Result};
use clap::Args;
use fsi_config::SimulationConfig;
use fsi_mesh::{GroupRefinement, NeutralLoader, RefinementPlan};
use fsi_physics::FaceId;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 网格文件路径
    #[arg(short, long)]
    pub mesh: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== FsiKit 配置验证 ===");

    if args.config.is_none() && args.mesh.is_none() {
        println!("用法: fsi_cli validate --config <配置文件> [--mesh <网格文件>]");
        println!("      fsi_cli validate --mesh <网格文件>");
        return Ok(());
    }

    let mut result = ValidationResult::default();
    let mut config = None;

    if let Some(config_path) = &args.config {
        config = validate_config(config_path, &mut result);
    }

    // 未单独给出网格时检查配置中的网格
    let mesh_path = args
        .mesh
        .clone()
        .or_else(|| config.as_ref().map(|c| c.mesh.file.clone()));
    if let Some(mesh_path) = &mesh_path {
        let config = config.unwrap_or_default();
        validate_mesh(mesh_path, &config, &mut result);
    }

    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) -> Option<SimulationConfig> {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return None;
    }

    let config = match SimulationConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("配置解析错误: {}", e));
            return None;
        }
    };

    if let Err(e) = config.validate() {
        result.add_error(e.to_string());
        return None;
    }

    if config.solver.relaxation > 1.0 {
        result.add_warning(format!("松弛因子 {} 大于 1，迭代可能发散", config.solver.relaxation));
    }
    if config.time.write_interval > config.time.num_steps {
        result.add_warning(format!(
            "输出间隔 {} 大于总步数 {}，只会写出初始快照",
            config.time.write_interval, config.time.num_steps
        ));
    }

    println!("  ✓ 配置文件有效");
    Some(config)
}

fn validate_mesh(path: &Path, config: &SimulationConfig, result: &mut ValidationResult) {
    println!("\n检查网格文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("网格文件不存在: {}", path.display()));
        return;
    }

    let mesh = match NeutralLoader::load(path) {
        Ok(m) => m,
        Err(e) => {
            result.add_error(format!("网格解析错误: {}", e));
            return;
        }
    };

    println!("  节点数: {}", mesh.n_nodes());
    println!("  单元数: {}", mesh.n_elements());
    println!("  单元组: {}", mesh.groups.len());

    if mesh.n_elements() == 0 {
        result.add_error("网格不含单元");
    }

    let face_ids = mesh.face_ids();
    println!("  边界面: {:?}", face_ids);
    for id in &face_ids {
        if u8::try_from(*id).ok().and_then(FaceId::from_u8).is_none() {
            result.add_warning(format!("边界面 {} 没有对应的边界条件", id));
        }
    }

    for material in &config.mesh.solid_materials {
        if !mesh.groups.iter().any(|g| g.material == *material) {
            result.add_warning(format!("网格中没有材料 {} 的单元组", material));
        }
    }

    let plan = RefinementPlan::build(
        &mesh,
        &GroupRefinement,
        config.mesh.multigrid_levels,
        config.mesh.selective_levels,
    );
    for pass in &plan.passes {
        println!(
            "  细化层 {}: {} / {} 单元{}",
            pass.level,
            pass.n_marked(),
            pass.flags.len(),
            if pass.uniform { " (均匀)" } else { "" }
        );
    }

    println!("  ✓ Gambit 中性文件格式有效");
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
