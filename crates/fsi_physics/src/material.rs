// crates/fsi_physics/src/material.rs

//! 材料参数容器
//!
//! 只保存本构参数及其派生量，不实现本构模型本身。

use fsi_config::{FluidConfig, FluidModel, ReferenceConfig, SolidConfig, SolidModel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 参考尺度（无量纲化）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceScales {
    /// 参考长度 [m]
    pub length: f64,
    /// 参考速度 [m/s]
    pub velocity: f64,
}

impl Default for ReferenceScales {
    fn default() -> Self {
        Self { length: 1.0, velocity: 1.0 }
    }
}

impl From<&ReferenceConfig> for ReferenceScales {
    fn from(c: &ReferenceConfig) -> Self {
        Self { length: c.length, velocity: c.velocity }
    }
}

/// 流体参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fluid {
    /// 密度 [kg/m³]
    pub density: f64,
    /// 动力黏度 [Pa·s]
    pub viscosity: f64,
    /// 本构模型
    pub model: FluidModel,
    /// 参考尺度
    pub reference: ReferenceScales,
}

impl Fluid {
    /// 从配置创建
    pub fn from_config(c: &FluidConfig, reference: ReferenceScales) -> Self {
        Self {
            density: c.density,
            viscosity: c.viscosity,
            model: c.model,
            reference,
        }
    }

    /// 运动黏度 ν = μ / ρ
    #[inline]
    pub fn kinematic_viscosity(&self) -> f64 {
        self.viscosity / self.density
    }

    /// 雷诺数 Re = U L / ν
    #[inline]
    pub fn reynolds_number(&self) -> f64 {
        self.reference.velocity * self.reference.length / self.kinematic_viscosity()
    }
}

impl fmt::Display for Fluid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "流体: 模型 {:?}, 密度 {:.4e} kg/m³, 黏度 {:.4e} Pa·s, 运动黏度 {:.4e} m²/s, Re {:.4e}",
            self.model,
            self.density,
            self.viscosity,
            self.kinematic_viscosity(),
            self.reynolds_number()
        )
    }
}

/// 固体参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    /// 密度 [kg/m³]
    pub density: f64,
    /// 杨氏模量 [Pa]
    pub young_modulus: f64,
    /// 泊松比
    pub poisson_ratio: f64,
    /// 本构模型
    pub model: SolidModel,
    /// 参考尺度
    pub reference: ReferenceScales,
}

impl Solid {
    /// 从配置创建
    pub fn from_config(c: &SolidConfig, reference: ReferenceScales) -> Self {
        Self {
            density: c.density,
            young_modulus: c.young_modulus,
            poisson_ratio: c.poisson_ratio,
            model: c.model,
            reference,
        }
    }

    /// 剪切模量（Lamé μ）
    #[inline]
    pub fn shear_modulus(&self) -> f64 {
        self.young_modulus / (2.0 * (1.0 + self.poisson_ratio))
    }

    /// Lamé λ
    #[inline]
    pub fn lame_lambda(&self) -> f64 {
        let nu = self.poisson_ratio;
        self.young_modulus * nu / ((1.0 + nu) * (1.0 - 2.0 * nu))
    }
}

impl fmt::Display for Solid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "固体: 模型 {:?}, 密度 {:.4e} kg/m³, 杨氏模量 {:.4e} Pa, 泊松比 {}, λ {:.4e}, μ {:.4e}",
            self.model,
            self.density,
            self.young_modulus,
            self.poisson_ratio,
            self.lame_lambda(),
            self.shear_modulus()
        )
    }
}
