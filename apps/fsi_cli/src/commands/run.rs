// apps/fsi_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! 读取 Gambit 网格，装配流固耦合问题，在会话内执行时间推进并写出 VTU 快照。
//! 会话在所有退出路径上先销毁系统再释放协作者上下文。

use anyhow::{Context, Result};
use clap::Args;
use fsi_config::ConvergencePolicy;
use fsi_io::VtuSnapshotWriter;
use fsi_mesh::NeutralLoader;
use fsi_physics::{
    ChannelFsiBoundary, CollaboratorContext, FsiProblem, Session, SnapshotWriter,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::load_config;

/// 运行模拟参数
#[derive(Args, Debug)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 网格文件路径（覆盖配置）
    #[arg(short, long)]
    pub mesh: Option<PathBuf>,

    /// 输出目录（覆盖配置）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 时间步数（覆盖配置）
    #[arg(short = 'n', long)]
    pub steps: Option<usize>,

    /// 每隔多少步写出快照（覆盖配置）
    #[arg(short = 'w', long)]
    pub write_interval: Option<usize>,

    /// 非线性迭代未收敛时终止模拟
    #[arg(long)]
    pub abort_on_divergence: bool,

    /// 节点坐标按位移场移动后输出
    #[arg(long)]
    pub moving_mesh: bool,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== FsiKit 模拟启动 ===");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(mesh) = args.mesh {
        config.mesh.file = mesh;
    }
    if let Some(output) = args.output {
        config.output.directory = output;
    }
    if let Some(steps) = args.steps {
        config.time.num_steps = steps;
    }
    if let Some(interval) = args.write_interval {
        config.time.write_interval = interval;
    }
    if args.abort_on_divergence {
        config.time.convergence_policy = ConvergencePolicy::Abort;
    }
    config.validate().context("配置无效")?;

    let mesh = NeutralLoader::load(&config.mesh.file)
        .with_context(|| format!("无法读取网格 {}", config.mesh.file.display()))?;

    let problem = FsiProblem::build(&config, mesh).context("问题装配失败")?;
    problem.log_materials();
    for pass in &problem.refinement().passes {
        info!(
            "细化层 {}: {} / {} 单元{}",
            pass.level,
            pass.n_marked(),
            pass.flags.len(),
            if pass.uniform { " (均匀)" } else { "" }
        );
    }

    let context = CollaboratorContext::init(config.parallel.processes)
        .context("协作者上下文初始化失败")?;
    let mut session = Session::new(context);
    let system = problem
        .create_system(Arc::new(ChannelFsiBoundary::new()))
        .context("创建非线性系统失败")?;
    session.add_system(Box::new(system));

    let mut state = problem.create_state();
    let mut writer =
        VtuSnapshotWriter::from_config(&config.output, problem.output_family(), problem.mesh())
            .context("创建输出失败")?
            .with_moving_mesh(args.moving_mesh);

    let start = Instant::now();
    let summary = problem
        .driver()
        .run(
            &mut session,
            &mut state,
            &mut writer,
            config.time.num_steps,
            config.time.write_interval,
        )
        .context("时间推进失败")?;
    writer.finish().context("写出时间序列索引失败")?;
    session.teardown();

    info!("=== 模拟完成 ===");
    info!("总步数: {}", summary.steps);
    info!("结束时间: {:.4} s", summary.final_time);
    info!("非线性迭代总数: {}", summary.total_nonlinear_iterations);
    info!("输出文件数: {}", summary.snapshots.len());
    info!("计算时间: {:.2} s", start.elapsed().as_secs_f64());
    if !summary.all_converged() {
        warn!("{} 步未达到收敛容差: {:?}", summary.unconverged_steps.len(), summary.unconverged_steps);
    }

    Ok(())
}
