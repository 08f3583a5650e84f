// crates/fsi_physics/src/newmark.rs

//! Newmark 加速度重构
//!
//! 结构节点上，非线性求解得到新位移后按 Newmark 关系重构新加速度与新速度：
//!
//! ```text
//! a₁ = (d₁ − d₀) / (β dt²) − v₀ / (β dt) − (1/(2β) − 1) a₀
//! v₁ = v₀ + dt ((1 − γ) a₀ + γ a₁)
//! ```
//!
//! 两者对固定 dt 均为 (d₁, d₀, v₀, a₀) 的仿射函数。
//!
//! 流体节点上位移只是网格运动，速度由求解直接给出并保留，
//! 加速度由速度关系反推：
//!
//! ```text
//! a₁ = (v₁ − v₀) / (γ dt) − (1 − γ)/γ · a₀
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fields::{FieldError, FieldKind, FieldRegistry};
use crate::state::SimulationState;

/// Newmark 参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewmarkParams {
    /// β
    pub beta: f64,
    /// γ
    pub gamma: f64,
}

impl Default for NewmarkParams {
    /// 平均加速度法 (β = 1/4, γ = 1/2)
    fn default() -> Self {
        Self { beta: 0.25, gamma: 0.5 }
    }
}

impl NewmarkParams {
    /// 创建参数
    pub fn new(beta: f64, gamma: f64) -> Self {
        Self { beta, gamma }
    }

    /// 新加速度
    #[inline]
    pub fn acceleration(&self, d1: f64, d0: f64, v0: f64, a0: f64, dt: f64) -> f64 {
        let b = self.beta;
        (d1 - d0) / (b * dt * dt) - v0 / (b * dt) - (0.5 / b - 1.0) * a0
    }

    /// 新速度
    #[inline]
    pub fn velocity(&self, v0: f64, a0: f64, a1: f64, dt: f64) -> f64 {
        v0 + dt * ((1.0 - self.gamma) * a0 + self.gamma * a1)
    }

    /// 由已求得的新速度反推新加速度
    #[inline]
    pub fn acceleration_from_velocity(&self, v1: f64, v0: f64, a0: f64, dt: f64) -> f64 {
        let g = self.gamma;
        (v1 - v0) / (g * dt) - (1.0 - g) / g * a0
    }

    /// 返回 (a₁, v₁)
    #[inline]
    pub fn update(&self, d1: f64, d0: f64, v0: f64, a0: f64, dt: f64) -> (f64, f64) {
        let a1 = self.acceleration(d1, d0, v0, a0, dt);
        (a1, self.velocity(v0, a0, a1, dt))
    }
}

// ============================================================
// 运动学三元组
// ============================================================

/// 同一分量的 位移/速度/加速度 场
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KinematicTriplet {
    /// 位移场
    pub displacement: FieldKind,
    /// 速度场
    pub velocity: FieldKind,
    /// 加速度场
    pub acceleration: FieldKind,
}

impl KinematicTriplet {
    /// x、y、z 三个分量
    pub const ALL: [KinematicTriplet; 3] = [
        Self { displacement: FieldKind::Dx, velocity: FieldKind::U, acceleration: FieldKind::Ax },
        Self { displacement: FieldKind::Dy, velocity: FieldKind::V, acceleration: FieldKind::Ay },
        Self { displacement: FieldKind::Dz, velocity: FieldKind::W, acceleration: FieldKind::Az },
    ];

    /// 三个场均已注册时参与重构
    pub fn participates(&self, registry: &FieldRegistry) -> bool {
        registry.contains(self.displacement)
            && registry.contains(self.velocity)
            && registry.contains(self.acceleration)
    }
}

/// 对所有参与的三元组重构加速度与速度，写入当前层
///
/// `structure[i]` 为真的节点按位移重构加速度和速度；其余节点保留当前速度，
/// 只重构加速度。超出 `structure` 长度的节点视为流体节点。
/// 返回参与重构的三元组数。
pub fn reconstruct(
    state: &mut SimulationState,
    params: &NewmarkParams,
    dt: f64,
    structure: &[bool],
) -> Result<usize, FieldError> {
    let triplets: Vec<KinematicTriplet> = KinematicTriplet::ALL
        .into_iter()
        .filter(|t| t.participates(state.registry()))
        .collect();

    for t in &triplets {
        let (a1, v1): (Vec<f64>, Vec<f64>) = {
            let d1 = state.current(t.displacement)?;
            let d0 = state.previous(t.displacement)?;
            let v0 = state.previous(t.velocity)?;
            let a0 = state.previous(t.acceleration)?;
            let v1 = state.current(t.velocity)?;
            (0..d1.len())
                .into_par_iter()
                .map(|i| {
                    if structure.get(i).copied().unwrap_or(false) {
                        params.update(d1[i], d0[i], v0[i], a0[i], dt)
                    } else {
                        (params.acceleration_from_velocity(v1[i], v0[i], a0[i], dt), v1[i])
                    }
                })
                .unzip()
        };
        state.current_mut(t.acceleration)?.copy_from_slice(&a1);
        state.current_mut(t.velocity)?.copy_from_slice(&v1);
    }

    Ok(triplets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDescriptor, InterpolationFamily};

    fn kinematic_state(kinds: &[FieldKind]) -> SimulationState {
        let mut reg = FieldRegistry::new();
        for &k in kinds {
            reg.register(FieldDescriptor::new(k, InterpolationFamily::Biquadratic, 2)).unwrap();
        }
        SimulationState::new(reg, 2)
    }

    #[test]
    fn test_scalar_update() {
        let p = NewmarkParams::default();
        // d1=0.01, d0=0, v0=0, a0=0, dt=0.1 -> a1 = 0.01/(0.25*0.01) = 4
        let (a1, v1) = p.update(0.01, 0.0, 0.0, 0.0, 0.1);
        assert!((a1 - 4.0).abs() < 1e-12);
        assert!((v1 - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_constant_acceleration_is_reproduced() {
        // 匀加速运动 d = a t²/2 满足平均加速度法
        let p = NewmarkParams::default();
        let (a, dt, t0) = (3.0, 0.05, 0.4);
        let d0 = 0.5 * a * t0 * t0;
        let d1 = 0.5 * a * (t0 + dt) * (t0 + dt);
        let v0 = a * t0;
        let (a1, v1) = p.update(d1, d0, v0, a, dt);
        assert!((a1 - a).abs() < 1e-9);
        assert!((v1 - a * (t0 + dt)).abs() < 1e-9);
    }

    #[test]
    fn test_reconstruct_writes_current_levels() {
        let mut s = kinematic_state(&[FieldKind::Dx, FieldKind::U, FieldKind::Ax]);
        s.current_mut(FieldKind::Dx).unwrap().copy_from_slice(&[0.01, 0.02]);

        let n = reconstruct(&mut s, &NewmarkParams::default(), 0.1, &[true, true]).unwrap();
        assert_eq!(n, 1);
        let ax = s.current(FieldKind::Ax).unwrap();
        assert!((ax[0] - 4.0).abs() < 1e-12);
        assert!((ax[1] - 8.0).abs() < 1e-12);
        let u = s.current(FieldKind::U).unwrap();
        assert!((u[1] - 0.4).abs() < 1e-12);
        // 上一层保持不变
        assert_eq!(s.previous(FieldKind::Ax).unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_acceleration_from_velocity() {
        // 匀加速时 v₁ = v₀ + a dt
        let p = NewmarkParams::default();
        let (a, dt, v0) = (3.0, 0.05, 1.2);
        assert!((p.acceleration_from_velocity(v0 + a * dt, v0, a, dt) - a).abs() < 1e-9);
    }

    #[test]
    fn test_fluid_nodes_keep_solved_velocity() {
        let mut s = kinematic_state(&[FieldKind::Dx, FieldKind::U, FieldKind::Ax]);
        s.current_mut(FieldKind::Dx).unwrap().copy_from_slice(&[0.0, 0.01]);
        s.current_mut(FieldKind::U).unwrap().copy_from_slice(&[0.3, 0.0]);

        reconstruct(&mut s, &NewmarkParams::default(), 0.1, &[false, true]).unwrap();
        let u = s.current(FieldKind::U).unwrap();
        let ax = s.current(FieldKind::Ax).unwrap();
        // 节点 0 为流体：速度不变，a₁ = 0.3 / (0.5 * 0.1)
        assert_eq!(u[0], 0.3);
        assert!((ax[0] - 6.0).abs() < 1e-12);
        // 节点 1 为结构：按位移重构
        assert!((ax[1] - 4.0).abs() < 1e-12);
        assert!((u[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_triplet_skipped() {
        let mut s = kinematic_state(&[FieldKind::Dx, FieldKind::U]);
        assert_eq!(reconstruct(&mut s, &NewmarkParams::default(), 0.1, &[]).unwrap(), 0);
    }

    #[test]
    fn test_single_level_acceleration_is_error() {
        let mut reg = FieldRegistry::new();
        reg.register(FieldDescriptor::new(FieldKind::Dy, InterpolationFamily::Biquadratic, 2)).unwrap();
        reg.register(FieldDescriptor::new(FieldKind::V, InterpolationFamily::Biquadratic, 2)).unwrap();
        reg.register(FieldDescriptor::new(FieldKind::Ay, InterpolationFamily::Biquadratic, 1)).unwrap();
        let mut s = SimulationState::new(reg, 1);
        assert!(matches!(
            reconstruct(&mut s, &NewmarkParams::default(), 0.1, &[]),
            Err(FieldError::InsufficientHistory { kind: FieldKind::Ay, .. })
        ));
    }
}
