// apps/fsi_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示系统、配置、材料与场注册信息。

use anyhow::{Context, Result};
use clap::Args;
use fsi_config::SimulationConfig;
use fsi_physics::{
    Fluid, FsiProblem, ReferenceScales, Solid, SteppedTimeStep, TimeStepPolicy,
};
use std::path::PathBuf;
use tracing::info;

use super::load_config;

/// 信息显示参数
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== FsiKit 信息 ===");

    if args.system {
        print_system_info();
    }

    if args.defaults {
        print_config(&SimulationConfig::default())?;
    }

    if let Some(path) = &args.config {
        let config = load_config(Some(path))?;
        print_config(&config)?;
    }

    if args.config.is_none() && !args.system && !args.defaults {
        print_system_info();
        println!();
        print_config(&SimulationConfig::default())?;
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("FsiKit CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!(
        "可用并行度: {}",
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    );
}

fn print_config(config: &SimulationConfig) -> Result<()> {
    println!("=== 配置 ===");
    let json = serde_json::to_string_pretty(config).context("配置序列化失败")?;
    println!("{}", json);

    let m = &config.materials;
    let reference = ReferenceScales::from(&m.reference);
    println!("\n=== 材料 ===");
    println!("{}", Fluid::from_config(&m.fluid, reference));
    println!("{}", Solid::from_config(&m.solid, reference));

    let policy = SteppedTimeStep::default();
    println!("\n=== 时间步长 ({}) ===", policy.name());
    println!("  t < {}: dt = {}", policy.switch_time, policy.coarse);
    println!("  t >= {}: dt = {}", policy.switch_time, policy.fine);
    println!(
        "  Newmark: beta = {}, gamma = {}",
        config.time.newmark_beta, config.time.newmark_gamma
    );

    println!("\n=== 场 ===");
    let registry = FsiProblem::standard_registry().context("场注册失败")?;
    for d in registry.iter() {
        let meaning = d.meaning.map(|m| format!("{:?}", m)).unwrap_or_default();
        println!(
            "  {:<3} {:<12} 时间层 {}  {}",
            d.kind.name(),
            d.family.name(),
            d.history_levels,
            meaning
        );
    }
    println!("  输出: {} ({})", config.output.fields.join(", "), config.output.family);

    Ok(())
}
