// apps/fsi_cli/src/commands/mod.rs

//! 子命令实现

pub mod info;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use fsi_config::SimulationConfig;

/// 读取配置文件，未给出时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(p) => SimulationConfig::from_file(p)
            .with_context(|| format!("无法加载配置文件 {}", p.display())),
        None => Ok(SimulationConfig::default()),
    }
}
