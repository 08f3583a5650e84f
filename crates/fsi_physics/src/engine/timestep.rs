// crates/fsi_physics/src/engine/timestep.rs

//! 时间步长策略
//!
//! 时间步长只依赖当前模拟时间：初始瞬态阶段用较粗的步长，
//! 入口斜坡完全启动之后切换到较细的步长。

use serde::{Deserialize, Serialize};

/// 时间步长策略
pub trait TimeStepPolicy: Send + Sync {
    /// 当前时间下的步长
    fn dt(&self, time: f64) -> f64;

    /// 策略名称
    fn name(&self) -> &str;
}

/// 分段常数步长
///
/// `time < switch_time` 时返回 `coarse`，否则返回 `fine`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteppedTimeStep {
    /// 切换时刻
    pub switch_time: f64,
    /// 切换前的步长
    pub coarse: f64,
    /// 切换后的步长
    pub fine: f64,
}

impl Default for SteppedTimeStep {
    fn default() -> Self {
        Self {
            switch_time: 4.0,
            coarse: 0.01,
            fine: 0.001,
        }
    }
}

impl TimeStepPolicy for SteppedTimeStep {
    #[inline]
    fn dt(&self, time: f64) -> f64 {
        if time < self.switch_time {
            self.coarse
        } else {
            self.fine
        }
    }

    fn name(&self) -> &str {
        "stepped"
    }
}

/// 固定步长
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantTimeStep(pub f64);

impl TimeStepPolicy for ConstantTimeStep {
    #[inline]
    fn dt(&self, _time: f64) -> f64 {
        self.0
    }

    fn name(&self) -> &str {
        "constant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepped_values() {
        let p = SteppedTimeStep::default();
        assert_eq!(p.dt(0.0), 0.01);
        assert_eq!(p.dt(3.9), 0.01);
        assert_eq!(p.dt(4.0), 0.001);
        assert_eq!(p.dt(100.0), 0.001);
    }

    #[test]
    fn test_stepped_is_non_increasing() {
        let p = SteppedTimeStep::default();
        let mut last = f64::INFINITY;
        for i in 0..1000 {
            let dt = p.dt(i as f64 * 0.01);
            assert!(dt <= last);
            last = dt;
        }
    }

    #[test]
    fn test_constant() {
        assert_eq!(ConstantTimeStep(0.05).dt(12.0), 0.05);
    }
}
