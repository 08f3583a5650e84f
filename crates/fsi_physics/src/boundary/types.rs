// crates/fsi_physics/src/boundary/types.rs

//! 边界条件类型定义
//!
//! 本模块定义边界条件计算所需的基本类型，包括：
//! - BoundaryMode / BoundaryValue: 边界模式与取值
//! - FaceId: 边界面编号 {1, 2, 3, 4}
//! - BcGenerationMode: 边界数据生成方式（定常 / 时变）
//! - InflowProfile: 入口带斜坡启动的抛物线速度剖面

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::BoundaryError;

// ============================================================
// 边界模式与取值
// ============================================================

/// 边界模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BoundaryMode {
    /// 本质边界：强制给定值
    Dirichlet = 0,
    /// 自然边界：不约束，由控制方程决定边界通量
    Natural = 1,
}

impl std::fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Dirichlet => "Dirichlet",
            Self::Natural => "Natural",
        };
        write!(f, "{}", name)
    }
}

/// 边界取值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryValue {
    /// 边界模式
    pub mode: BoundaryMode,
    /// 边界值（自然边界时为通量值）
    pub value: f64,
}

impl BoundaryValue {
    /// 本质边界
    #[inline]
    pub const fn dirichlet(value: f64) -> Self {
        Self { mode: BoundaryMode::Dirichlet, value }
    }

    /// 自然边界
    #[inline]
    pub const fn natural(value: f64) -> Self {
        Self { mode: BoundaryMode::Natural, value }
    }

    /// 是否为本质边界
    #[inline]
    pub fn is_dirichlet(&self) -> bool {
        self.mode == BoundaryMode::Dirichlet
    }
}

// ============================================================
// 边界面编号
// ============================================================

/// 边界面编号
///
/// 几何含义固定：1 入口、2 出口、3 主域壁面、4 界面壁面。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum FaceId {
    /// 入口
    Inflow = 1,
    /// 出口
    Outflow = 2,
    /// 主域壁面
    PrimaryWall = 3,
    /// 界面壁面
    InterfaceWall = 4,
}

impl FaceId {
    /// 所有面
    pub const ALL: [FaceId; 4] = [
        Self::Inflow,
        Self::Outflow,
        Self::PrimaryWall,
        Self::InterfaceWall,
    ];

    /// 从 u8 值转换
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Inflow),
            2 => Some(Self::Outflow),
            3 => Some(Self::PrimaryWall),
            4 => Some(Self::InterfaceWall),
            _ => None,
        }
    }

    /// 转换为 u8 值
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u32> for FaceId {
    type Error = BoundaryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::from_u8)
            .ok_or(BoundaryError::UnknownFace(value))
    }
}

impl std::fmt::Display for FaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inflow => "Inflow",
            Self::Outflow => "Outflow",
            Self::PrimaryWall => "PrimaryWall",
            Self::InterfaceWall => "InterfaceWall",
        };
        write!(f, "{}({})", name, self.as_u8())
    }
}

// ============================================================
// 生成方式
// ============================================================

/// 边界数据生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BcGenerationMode {
    /// 定常：在 t = 0 计算一次并缓存
    #[default]
    Steady,
    /// 时变：每次请求时按当前时间重新计算
    TimeDependent,
}

// ============================================================
// 入口速度剖面
// ============================================================

/// 入口抛物线速度剖面，带余弦斜坡启动
///
/// ```text
/// u(y, t) = 1.5 · um · 4 / H² · y (H − y) · r(t)
/// r(t)    = 0.5 (1 − cos(0.5 π t))   (t < ramp_time)
///         = 1                         (t ≥ ramp_time)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflowProfile {
    /// 峰值参数 um
    pub peak: f64,
    /// 归一化常数 H²
    pub normalisation: f64,
    /// 通道高度 H
    pub channel_height: f64,
    /// 斜坡启动时长
    pub ramp_time: f64,
}

impl Default for InflowProfile {
    fn default() -> Self {
        Self {
            peak: 2.0,
            normalisation: 0.1681,
            channel_height: 0.41,
            ramp_time: 2.0,
        }
    }
}

impl InflowProfile {
    /// 稳态剖面值
    #[inline]
    pub fn steady(&self, y: f64) -> f64 {
        1.5 * self.peak * 4.0 / self.normalisation * y * (self.channel_height - y)
    }

    /// 斜坡系数
    #[inline]
    pub fn ramp(&self, time: f64) -> f64 {
        if time < self.ramp_time {
            0.5 * (1.0 - (0.5 * PI * time).cos())
        } else {
            1.0
        }
    }

    /// 给定高度与时间的入口速度
    #[inline]
    pub fn value(&self, y: f64, time: f64) -> f64 {
        self.steady(y) * self.ramp(time)
    }
}
