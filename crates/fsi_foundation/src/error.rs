// crates/fsi_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `FsiError` 枚举和 `FsiResult` 类型别名，作为跨层传递的错误载体。
//!
//! # 分层
//!
//! 各层（配置、网格、物理、IO）定义自己的细粒度错误，并实现
//! `From<XxxError> for FsiError`，协作者接口统一返回 `FsiResult`。
//!
//! # 示例
//!
//! ```
//! use fsi_foundation::error::{FsiError, FsiResult};
//!
//! fn read_config() -> FsiResult<()> {
//!     Err(FsiError::config("配置文件格式错误"))
//! }
//! assert!(read_config().is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type FsiResult<T> = Result<T, FsiError>;

/// FsiKit 错误类型
#[derive(Error, Debug)]
pub enum FsiError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 文件解析错误
    #[error("文件解析错误: {file} 第{line}行: {message}")]
    ParseError {
        /// 文件路径
        file: PathBuf,
        /// 行号
        line: usize,
        /// 错误信息
        message: String,
    },

    // ========================================================================
    // 输入与配置
    // ========================================================================

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 无效网格
    #[error("无效的网格: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 计算与协作者
    // ========================================================================

    /// 协作者调用失败（非线性求解、快照输出等）
    #[error("协作者 {operation} 失败: {message}")]
    Collaborator {
        /// 失败的操作名
        operation: &'static str,
        /// 失败原因
        message: String,
    },

    /// 协作者上下文已释放
    #[error("协作者上下文已释放，无法执行 {operation}")]
    ContextReleased {
        /// 试图执行的操作
        operation: &'static str,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl FsiError {
    /// 从描述创建 IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从 IO 错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 协作者失败
    pub fn collaborator(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            operation,
            message: message.into(),
        }
    }

    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> FsiResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for FsiError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FsiError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
    }

    #[test]
    fn test_file_not_found() {
        let err = FsiError::file_not_found("./input/fsifirst.neu");
        assert!(err.to_string().contains("fsifirst.neu"));
    }

    #[test]
    fn test_collaborator_error() {
        let err = FsiError::collaborator("solve", "矩阵奇异");
        let text = err.to_string();
        assert!(text.contains("solve"));
        assert!(text.contains("矩阵奇异"));
    }

    #[test]
    fn test_check_size() {
        assert!(FsiError::check_size("DX", 10, 10).is_ok());
        assert!(matches!(
            FsiError::check_size("DX", 10, 5),
            Err(FsiError::SizeMismatch { expected: 10, actual: 5, .. })
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: FsiError = io_err.into();
        assert!(matches!(err, FsiError::Io { source: Some(_), .. }));
    }
}
