// apps/fsi_cli/src/main.rs

//! FsiKit 命令行界面
//!
//! 流固耦合瞬态模拟的命令行入口：
//!
//! - `run`: 读取网格、装配问题并执行时间推进
//! - `info`: 显示默认配置与材料参数
//! - `validate`: 校验配置与网格，报告各层细化标记

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// FsiKit 流固耦合瞬态驱动器
#[derive(Parser, Debug)]
#[command(name = "fsi_cli", author = "FsiKit Team", version, long_about = None)]
#[command(about = "FsiKit transient fluid-structure interaction driver")]
struct Cli {
    /// 日志级别
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

/// 可选日志级别，其他取值由 clap 拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 运行瞬态模拟
    Run(commands::run::RunArgs),
    /// 显示配置、材料与场信息
    Info(commands::info::InfoArgs),
    /// 校验配置与网格
    Validate(commands::validate::ValidateArgs),
}

impl Command {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Command::Run(args) => commands::run::execute(args),
            Command::Info(args) => commands::info::execute(args),
            Command::Validate(args) => commands::validate::execute(args),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(Level::from(cli.log_level))
            .with_target(false)
            .finish(),
    )?;

    cli.command.execute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsed() {
        let cli = Cli::try_parse_from(["fsi_cli", "--log-level", "debug", "info"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(Level::from(cli.log_level), Level::DEBUG);
    }

    #[test]
    fn test_log_level_defaults_to_info() {
        let cli = Cli::try_parse_from(["fsi_cli", "info"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        assert!(Cli::try_parse_from(["fsi_cli", "--log-level", "verbose", "info"]).is_err());
    }

    #[test]
    fn test_log_level_after_subcommand() {
        let cli = Cli::try_parse_from(["fsi_cli", "validate", "-l", "warn"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
    }
}
