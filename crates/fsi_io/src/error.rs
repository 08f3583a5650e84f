// crates/fsi_io/src/error.rs
//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举。
//! 所有错误最终可转换为 FsiError 以实现跨层错误传递。

use std::path::PathBuf;

use fsi_foundation::FsiError;
use fsi_physics::FieldError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件读写失败
    #[error("文件读写失败: {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 场数据长度与网格节点数不一致
    #[error("场 {field} 长度为 {actual}，网格有 {expected} 个节点")]
    FieldLength {
        /// 场名称
        field: String,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 单元类型无法导出
    #[error("无法导出 {nodes} 节点的 {shape} 单元")]
    UnsupportedCell {
        /// 单元形状
        shape: &'static str,
        /// 单元节点数
        nodes: usize,
    },

    /// 场访问错误
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl IoError {
    /// 附带路径的 IO 错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Io { path: path.into(), source }
    }
}

impl From<IoError> for FsiError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io { path, source } => {
                FsiError::io_with_source(format!("写出 {} 失败", path.display()), source)
            }
            IoError::Field(e) => e.into(),
            other => FsiError::invalid_input(other.to_string()),
        }
    }
}
