// crates/fsi_mesh/src/error.rs
//! 网格处理错误类型
//!
//! 包含网格文件格式、拓扑等错误定义
//! 所有错误可转换为 `fsi_foundation::FsiError` 向上传播

use fsi_foundation::FsiError;
use std::path::PathBuf;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 打开或读取网格文件失败
    #[error("无法读取网格文件 {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 网格格式错误
    #[error("网格格式错误: {format}, {file}, 行 {line}: {message}")]
    MeshFormatError {
        /// 格式名称
        format: &'static str,
        /// 文件标识
        file: String,
        /// 行号（从 1 开始）
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        /// 操作名
        operation: &'static str,
        /// 详细信息
        details: String,
    },

    /// 不支持的单元形状
    #[error("单元形状 {shape} 不支持 {operation}")]
    UnsupportedShape {
        /// 形状名称
        shape: &'static str,
        /// 操作名
        operation: &'static str,
    },
}

/// 便捷构造函数
impl MeshError {
    /// 拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    /// 格式错误
    pub fn mesh_format_error(
        format: &'static str,
        file: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::MeshFormatError {
            format,
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// 转换到 Foundation 层错误
impl From<MeshError> for FsiError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                FsiError::file_not_found(path)
            }
            MeshError::Io { path, source } => {
                FsiError::io_with_source(format!("无法读取网格文件 {}", path.display()), source)
            }
            MeshError::MeshFormatError { format, file, line, message } => {
                FsiError::parse(file, line, format!("[{}] {}", format, message))
            }
            MeshError::InvalidTopology { operation, details } => {
                FsiError::invalid_mesh(format!("网格拓扑错误 [{}]: {}", operation, details))
            }
            other @ MeshError::UnsupportedShape { .. } => FsiError::invalid_mesh(other.to_string()),
        }
    }
}
