// crates/fsi_physics/src/engine/context.rs

//! 协作者上下文与会话
//!
//! - [`CollaboratorContext`]: 进程启动时构造一次的并行协作上下文，
//!   以引用传入每次协作者调用
//! - [`Session`]: 持有上下文与全部非线性系统，保证释放顺序
//!   （先销毁系统，再释放上下文），所有退出路径上都恰好执行一次

use fsi_foundation::{FsiError, FsiResult};
use tracing::{debug, info};

use super::system::NonlinearSystem;

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// 协作者上下文
pub struct CollaboratorContext {
    processes: usize,
    rank: usize,
    release_hooks: Vec<ReleaseHook>,
}

impl CollaboratorContext {
    /// 初始化上下文
    pub fn init(processes: usize) -> FsiResult<Self> {
        if processes == 0 {
            return Err(FsiError::invalid_input("协作进程数必须为正"));
        }
        debug!("协作者上下文初始化: {} 个进程", processes);
        Ok(Self {
            processes,
            rank: 0,
            release_hooks: Vec::new(),
        })
    }

    /// 协作进程数
    #[inline]
    pub fn processes(&self) -> usize {
        self.processes
    }

    /// 本进程编号
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// 注册释放时执行的回调（按注册逆序执行）
    pub fn on_release(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.release_hooks.push(Box::new(hook));
    }

    /// 释放上下文
    pub fn release(mut self) {
        while let Some(hook) = self.release_hooks.pop() {
            hook();
        }
    }
}

impl std::fmt::Debug for CollaboratorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaboratorContext")
            .field("processes", &self.processes)
            .field("rank", &self.rank)
            .field("release_hooks", &self.release_hooks.len())
            .finish()
    }
}

// ============================================================
// 会话
// ============================================================

/// 模拟会话
///
/// 上下文在会话创建时取得，在 `teardown` 或 drop 时释放。
pub struct Session {
    context: Option<CollaboratorContext>,
    systems: Vec<Box<dyn NonlinearSystem>>,
}

impl Session {
    /// 以已初始化的上下文创建会话
    pub fn new(context: CollaboratorContext) -> Self {
        Self {
            context: Some(context),
            systems: Vec::new(),
        }
    }

    /// 添加系统，返回其序号
    pub fn add_system(&mut self, system: Box<dyn NonlinearSystem>) -> usize {
        info!("创建非线性瞬态系统 '{}' (场 {:?})", system.name(), system.fields());
        self.systems.push(system);
        self.systems.len() - 1
    }

    /// 系统数量
    #[inline]
    pub fn n_systems(&self) -> usize {
        self.systems.len()
    }

    /// 上下文是否仍可用
    #[inline]
    pub fn is_active(&self) -> bool {
        self.context.is_some()
    }

    /// 上下文
    pub fn context(&self) -> FsiResult<&CollaboratorContext> {
        self.context
            .as_ref()
            .ok_or(FsiError::ContextReleased { operation: "context" })
    }

    /// 同时借出上下文与全部系统
    pub fn parts_mut(
        &mut self,
    ) -> FsiResult<(&CollaboratorContext, &mut [Box<dyn NonlinearSystem>])> {
        let ctx = self
            .context
            .as_ref()
            .ok_or(FsiError::ContextReleased { operation: "solve" })?;
        Ok((ctx, self.systems.as_mut_slice()))
    }

    /// 释放资源：先销毁所有系统，再释放上下文
    ///
    /// 重复调用无副作用。
    pub fn teardown(&mut self) {
        if !self.systems.is_empty() {
            for system in self.systems.iter_mut() {
                system.destroy();
            }
            let n = self.systems.len();
            self.systems.clear();
            info!("已销毁 {} 个非线性系统", n);
        }
        if let Some(ctx) = self.context.take() {
            ctx.release();
            info!("协作者上下文已释放");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::system::{SolveReport, SolverSettings};
    use crate::fields::FieldKind;
    use crate::state::SimulationState;
    use std::sync::{Arc, Mutex};

    struct Probe {
        log: Arc<Mutex<Vec<String>>>,
        settings: SolverSettings,
    }

    impl NonlinearSystem for Probe {
        fn name(&self) -> &str {
            "probe"
        }
        fn fields(&self) -> &[FieldKind] {
            &[]
        }
        fn settings(&self) -> &SolverSettings {
            &self.settings
        }
        fn solve(
            &mut self,
            _ctx: &CollaboratorContext,
            _state: &mut SimulationState,
            _time: f64,
            _dt: f64,
        ) -> FsiResult<SolveReport> {
            Ok(SolveReport { iterations: 0, residual: 0.0, converged: true })
        }
        fn reconstruct_acceleration(&mut self, _: &mut SimulationState, _: f64) -> FsiResult<()> {
            Ok(())
        }
        fn advance_history(&mut self, _: &mut SimulationState) -> FsiResult<()> {
            Ok(())
        }
        fn destroy(&mut self) {
            self.log.lock().unwrap().push("destroy".into());
        }
    }

    fn session(log: &Arc<Mutex<Vec<String>>>) -> Session {
        let mut ctx = CollaboratorContext::init(1).unwrap();
        let l = Arc::clone(log);
        ctx.on_release(move || l.lock().unwrap().push("release".into()));
        let mut s = Session::new(ctx);
        s.add_system(Box::new(Probe { log: Arc::clone(log), settings: SolverSettings::default() }));
        s
    }

    #[test]
    fn test_zero_processes_rejected() {
        assert!(CollaboratorContext::init(0).is_err());
    }

    #[test]
    fn test_teardown_order_and_idempotence() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut s = session(&log);
        s.teardown();
        s.teardown();
        assert!(!s.is_active());
        assert!(matches!(s.context(), Err(FsiError::ContextReleased { .. })));
        drop(s);
        assert_eq!(*log.lock().unwrap(), vec!["destroy", "release"]);
    }

    #[test]
    fn test_drop_releases_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let _s = session(&log);
        }
        assert_eq!(*log.lock().unwrap(), vec!["destroy", "release"]);
    }
}
