// crates/fsi_physics/src/boundary/provider.rs

//! 边界条件求值器
//!
//! [`BoundaryConditionProvider`] 是边界数据生成器调用的求值接口，
//! [`ChannelFsiBoundary`] 实现带弹性结构的通道流固耦合算例的决策表：
//!
//! | 场 | 面 1 入口 | 面 2 出口 | 面 3 主域壁面 | 面 4 界面壁面 |
//! |---|---|---|---|---|
//! | U | 本质, 斜坡抛物线 | 自然 | 本质 0 | 本质 0 |
//! | V | 本质 0 | 自然 | 本质 0 | 本质 0 |
//! | W | 本质 0 | 本质 0 | 本质 0 | 本质 0 |
//! | P | 自然 0 | 自然 0 | 自然 0 | 自然 0 |
//! | DX | 本质 0 | 本质 0 | 自然 0 | 本质 0 |
//! | DY | 自然 0 | 自然 0 | 本质 0 | 本质 0 |
//! | DZ | 本质 0 | 本质 0 | 本质 0 | 本质 0 |
//! | AX, AY, AZ | 自然 0（不依赖面） ||||

use glam::DVec3;

use super::types::{BoundaryValue, FaceId, InflowProfile};
use crate::fields::FieldKind;

/// 边界条件求值接口
///
/// 实现必须是全函数、确定性且无副作用。
pub trait BoundaryConditionProvider: Send + Sync {
    /// 求值器名称
    fn name(&self) -> &str;

    /// 计算场 `kind` 在面 `face` 上点 `point` 处、时刻 `time` 的边界条件
    fn evaluate(&self, kind: FieldKind, point: DVec3, face: FaceId, time: f64) -> BoundaryValue;
}

/// 通道流固耦合算例的边界条件
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelFsiBoundary {
    inflow: InflowProfile,
}

impl ChannelFsiBoundary {
    /// 使用默认入口剖面 (um = 2.0, H = 0.41, 斜坡 2.0)
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定入口剖面
    pub fn with_inflow(inflow: InflowProfile) -> Self {
        Self { inflow }
    }

    /// 入口剖面
    pub fn inflow(&self) -> &InflowProfile {
        &self.inflow
    }
}

impl BoundaryConditionProvider for ChannelFsiBoundary {
    fn name(&self) -> &str {
        "channel-fsi"
    }

    fn evaluate(&self, kind: FieldKind, point: DVec3, face: FaceId, time: f64) -> BoundaryValue {
        use FaceId::*;
        use FieldKind::*;

        match (kind, face) {
            (U, Inflow) => BoundaryValue::dirichlet(self.inflow.value(point.y, time)),
            (U | V, Outflow) => BoundaryValue::natural(0.0),
            (U | V, _) => BoundaryValue::dirichlet(0.0),
            (W, _) => BoundaryValue::dirichlet(0.0),

            (P, _) => BoundaryValue::natural(0.0),

            (Dx, PrimaryWall) => BoundaryValue::natural(0.0),
            (Dx, _) => BoundaryValue::dirichlet(0.0),
            (Dy, Inflow | Outflow) => BoundaryValue::natural(0.0),
            (Dy, _) => BoundaryValue::dirichlet(0.0),
            (Dz, _) => BoundaryValue::dirichlet(0.0),

            (Ax | Ay | Az, _) => BoundaryValue::natural(0.0),
        }
    }
}
