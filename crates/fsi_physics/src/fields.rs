// crates/fsi_physics/src/fields.rs

//! 场类型与注册表
//!
//! 提供流固耦合求解所涉及物理场的元数据管理和注册机制。
//!
//! # 设计原则
//!
//! 1. **封闭枚举**：场类型是固定集合 [`FieldKind`]，未知名称在解析时即报错，
//!    不会以默认值进入边界条件计算
//! 2. **元数据驱动**：场携带插值族、历史层数与物理含义
//! 3. **注册顺序**：注册表保持注册顺序，保证迭代与输出的一致性
//!
//! # 示例
//!
//! ```rust
//! use fsi_physics::fields::{FieldDescriptor, FieldKind, FieldRegistry, InterpolationFamily, PhysicalMeaning};
//!
//! let mut registry = FieldRegistry::new();
//! registry.register(
//!     FieldDescriptor::new(FieldKind::Dx, InterpolationFamily::Biquadratic, 2)
//!         .with_meaning(PhysicalMeaning::Displacement),
//! ).unwrap();
//! assert!(registry.contains(FieldKind::Dx));
//! ```

use fsi_foundation::FsiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

// ============================================================
// 场类型
// ============================================================

/// 场类型（封闭集合）
///
/// 位移分量、速度分量、加速度分量与压力。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldKind {
    /// x 向位移
    Dx,
    /// y 向位移
    Dy,
    /// z 向位移
    Dz,
    /// x 向速度
    U,
    /// y 向速度
    V,
    /// z 向速度
    W,
    /// x 向加速度
    Ax,
    /// y 向加速度
    Ay,
    /// z 向加速度
    Az,
    /// 压力
    P,
}

/// 向量分量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// x 分量
    X,
    /// y 分量
    Y,
    /// z 分量
    Z,
}

impl FieldKind {
    /// 所有场类型
    pub const ALL: [FieldKind; 10] = [
        Self::Dx,
        Self::Dy,
        Self::Dz,
        Self::U,
        Self::V,
        Self::W,
        Self::Ax,
        Self::Ay,
        Self::Az,
        Self::P,
    ];

    /// 规范名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dx => "DX",
            Self::Dy => "DY",
            Self::Dz => "DZ",
            Self::U => "U",
            Self::V => "V",
            Self::W => "W",
            Self::Ax => "AX",
            Self::Ay => "AY",
            Self::Az => "AZ",
            Self::P => "P",
        }
    }

    /// 是否为位移分量
    #[inline]
    pub fn is_displacement(&self) -> bool {
        matches!(self, Self::Dx | Self::Dy | Self::Dz)
    }

    /// 是否为速度分量
    #[inline]
    pub fn is_velocity(&self) -> bool {
        matches!(self, Self::U | Self::V | Self::W)
    }

    /// 是否为加速度分量
    #[inline]
    pub fn is_acceleration(&self) -> bool {
        matches!(self, Self::Ax | Self::Ay | Self::Az)
    }

    /// 向量分量，压力返回 None
    pub fn component(&self) -> Option<Component> {
        match self {
            Self::Dx | Self::U | Self::Ax => Some(Component::X),
            Self::Dy | Self::V | Self::Ay => Some(Component::Y),
            Self::Dz | Self::W | Self::Az => Some(Component::Z),
            Self::P => None,
        }
    }

    /// 批量解析场名称
    ///
    /// # 返回
    /// - `Ok(Vec<FieldKind>)`: 按输入顺序的场类型
    /// - `Err(FieldError::UnknownKind)`: 第一个无法识别的名称
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<FieldKind>, FieldError> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl FromStr for FieldKind {
    type Err = FieldError;

    /// 不区分大小写匹配规范名称
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FieldError::UnknownKind(s.to_string()))
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================
// 插值族与物理含义
// ============================================================

/// 有限元插值族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationFamily {
    /// 线性
    Linear,
    /// 二次（serendipity）
    Quadratic,
    /// 双二次
    Biquadratic,
    /// 间断常数
    DiscConstant,
    /// 间断线性
    DiscLinear,
}

impl InterpolationFamily {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Biquadratic => "biquadratic",
            Self::DiscConstant => "disc_constant",
            Self::DiscLinear => "disc_linear",
        }
    }

    /// 是否为间断族
    #[inline]
    pub fn is_discontinuous(&self) -> bool {
        matches!(self, Self::DiscConstant | Self::DiscLinear)
    }
}

impl FromStr for InterpolationFamily {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "quadratic" => Ok(Self::Quadratic),
            "biquadratic" => Ok(Self::Biquadratic),
            "disc_constant" => Ok(Self::DiscConstant),
            "disc_linear" => Ok(Self::DiscLinear),
            _ => Err(FieldError::UnknownFamily(s.to_string())),
        }
    }
}

impl std::fmt::Display for InterpolationFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 场的物理含义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalMeaning {
    /// 位移（动网格）
    Displacement,
    /// 压力 / Lagrange 乘子
    Pressure,
}

// ============================================================
// 错误
// ============================================================

/// 场注册与访问错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// 场类型未在状态中注册
    #[error("场 {0} 未注册")]
    NotRegistered(FieldKind),

    /// 无法识别的场名称
    #[error("未知场类型 '{0}'")]
    UnknownKind(String),

    /// 无法识别的插值族名称
    #[error("未知插值族 '{0}'")]
    UnknownFamily(String),

    /// 历史层数不合法
    #[error("场 {kind} 的历史层数 {levels} 无效，至少需要 1 层")]
    InvalidHistoryLevels {
        /// 场类型
        kind: FieldKind,
        /// 给定层数
        levels: usize,
    },

    /// 历史层数不足
    #[error("场 {kind} 需要 {required} 层历史，仅有 {available} 层")]
    InsufficientHistory {
        /// 场类型
        kind: FieldKind,
        /// 需要的层数
        required: usize,
        /// 实际层数
        available: usize,
    },
}

impl From<FieldError> for FsiError {
    fn from(err: FieldError) -> Self {
        FsiError::config(err.to_string())
    }
}

// ============================================================
// 描述与注册表
// ============================================================

/// 场描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// 场类型
    pub kind: FieldKind,
    /// 插值族
    pub family: InterpolationFamily,
    /// 保留的时间层数（第 0 层为当前值）
    pub history_levels: usize,
    /// 物理含义
    #[serde(default)]
    pub meaning: Option<PhysicalMeaning>,
}

impl FieldDescriptor {
    /// 创建场描述
    #[inline]
    pub fn new(kind: FieldKind, family: InterpolationFamily, history_levels: usize) -> Self {
        Self {
            kind,
            family,
            history_levels,
            meaning: None,
        }
    }

    /// 附加物理含义
    #[inline]
    pub fn with_meaning(mut self, meaning: PhysicalMeaning) -> Self {
        self.meaning = Some(meaning);
        self
    }
}

/// 场注册表
///
/// 管理所有已注册场的描述，注册表本身不存储数据。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldRegistry {
    /// 场描述映射
    descriptors: HashMap<FieldKind, FieldDescriptor>,
    /// 注册顺序
    order: Vec<FieldKind>,
}

impl FieldRegistry {
    /// 创建空注册表
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册场
    ///
    /// # 参数
    /// - `descriptor`: 场描述
    ///
    /// # 返回
    /// - `Ok(())`: 注册成功
    /// - `Err(FieldError::InvalidHistoryLevels)`: 历史层数为 0
    ///
    /// 重复注册同一场类型时原地更新描述，保留原注册顺序。
    pub fn register(&mut self, descriptor: FieldDescriptor) -> Result<(), FieldError> {
        if descriptor.history_levels == 0 {
            return Err(FieldError::InvalidHistoryLevels {
                kind: descriptor.kind,
                levels: 0,
            });
        }
        if self.descriptors.insert(descriptor.kind, descriptor).is_none() {
            self.order.push(descriptor.kind);
        }
        Ok(())
    }

    /// 为已注册场附加物理含义
    pub fn associate_meaning(
        &mut self,
        kind: FieldKind,
        meaning: PhysicalMeaning,
    ) -> Result<(), FieldError> {
        let desc = self
            .descriptors
            .get_mut(&kind)
            .ok_or(FieldError::NotRegistered(kind))?;
        desc.meaning = Some(meaning);
        Ok(())
    }

    /// 获取场描述
    #[inline]
    pub fn get(&self, kind: FieldKind) -> Option<&FieldDescriptor> {
        self.descriptors.get(&kind)
    }

    /// 获取场描述，未注册时报错
    #[inline]
    pub fn require(&self, kind: FieldKind) -> Result<&FieldDescriptor, FieldError> {
        self.get(kind).ok_or(FieldError::NotRegistered(kind))
    }

    /// 检查场是否已注册
    #[inline]
    pub fn contains(&self, kind: FieldKind) -> bool {
        self.descriptors.contains_key(&kind)
    }

    /// 所有场类型（按注册顺序）
    #[inline]
    pub fn kinds(&self) -> &[FieldKind] {
        &self.order
    }

    /// 按注册顺序迭代场描述
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.order.iter().filter_map(|k| self.descriptors.get(k))
    }

    /// 场数量
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 检查注册表是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 具有指定物理含义的场（按注册顺序）
    pub fn with_meaning(&self, meaning: PhysicalMeaning) -> Vec<FieldKind> {
        self.iter()
            .filter(|d| d.meaning == Some(meaning))
            .map(|d| d.kind)
            .collect()
    }
}
