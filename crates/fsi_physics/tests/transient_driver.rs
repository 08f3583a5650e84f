// crates/fsi_physics/tests/transient_driver.rs

//! 瞬态驱动器端到端测试
//!
//! 验证时间步内的调用顺序、快照节奏与会话释放顺序。

use std::sync::{Arc, Mutex};

use fsi_config::SimulationConfig;
use fsi_foundation::{FsiError, FsiResult};
use fsi_mesh::{BoundarySide, Element, ElementGroup, ElementShape, MeshDescription};
use fsi_physics::{
    BoundaryConditionProvider, ChannelFsiBoundary, CollaboratorContext, DriverError, FaceId,
    FieldKind, FsiProblem, NonlinearSystem,
    Session, SimulationDriver, SimulationState, SnapshotWriter, SolveReport, SolverSettings,
    SteppedTimeStep,
};
use glam::DVec3;

type Log = Arc<Mutex<Vec<String>>>;

/// 记录每次调用的系统
struct Recording {
    log: Log,
    settings: SolverSettings,
}

impl NonlinearSystem for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn fields(&self) -> &[FieldKind] {
        &FsiProblem::SYSTEM_FIELDS
    }

    fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn solve(
        &mut self,
        _ctx: &CollaboratorContext,
        state: &mut SimulationState,
        _time: f64,
        _dt: f64,
    ) -> FsiResult<SolveReport> {
        self.log.lock().unwrap().push(format!("solve {}", state.step));
        Ok(SolveReport { iterations: 1, residual: 0.0, converged: true })
    }

    fn reconstruct_acceleration(&mut self, state: &mut SimulationState, _dt: f64) -> FsiResult<()> {
        self.log.lock().unwrap().push(format!("reconstruct {}", state.step));
        Ok(())
    }

    fn advance_history(&mut self, state: &mut SimulationState) -> FsiResult<()> {
        self.log.lock().unwrap().push(format!("advance {}", state.step));
        Ok(())
    }

    fn destroy(&mut self) {
        self.log.lock().unwrap().push("destroy".into());
    }
}

/// 记录快照的输出
struct Snapshots {
    log: Log,
    written: Vec<(usize, Vec<FieldKind>)>,
    fail_at: Option<usize>,
}

impl SnapshotWriter for Snapshots {
    fn write_snapshot(
        &mut self,
        _state: &SimulationState,
        fields: &[FieldKind],
        step: usize,
    ) -> FsiResult<()> {
        if self.fail_at == Some(step) {
            return Err(FsiError::io("磁盘已满"));
        }
        self.log.lock().unwrap().push(format!("snapshot {step}"));
        self.written.push((step, fields.to_vec()));
        Ok(())
    }
}

fn recording_session(log: &Log) -> Session {
    let mut ctx = CollaboratorContext::init(1).unwrap();
    let l = Arc::clone(log);
    ctx.on_release(move || l.lock().unwrap().push("release".into()));
    let mut session = Session::new(ctx);
    session.add_system(Box::new(Recording {
        log: Arc::clone(log),
        settings: SolverSettings::default(),
    }));
    session
}

fn output_fields() -> Vec<FieldKind> {
    vec![FieldKind::Dx, FieldKind::Dy, FieldKind::U, FieldKind::V, FieldKind::P]
}

fn position(log: &[String], entry: &str) -> usize {
    log.iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("missing log entry '{entry}'"))
}

#[test]
fn test_five_steps_five_snapshots() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut session = recording_session(&log);
    let mut state = SimulationState::new(FsiProblem::standard_registry().unwrap(), 4);
    let mut out = Snapshots { log: Arc::clone(&log), written: Vec::new(), fail_at: None };

    let driver = SimulationDriver::new(Box::new(SteppedTimeStep::default()))
        .with_output_fields(output_fields());
    let summary = driver.run(&mut session, &mut state, &mut out, 5, 1).unwrap();

    let steps: Vec<usize> = out.written.iter().map(|(s, _)| *s).collect();
    assert_eq!(steps, vec![0, 1, 2, 3, 4]);
    for (_, fields) in &out.written {
        assert_eq!(fields, &output_fields());
    }
    assert_eq!(summary.steps, 5);
    assert_eq!(state.step, 5);
    assert!((state.time - 0.05).abs() < 1e-12);

    let log = log.lock().unwrap().clone();
    for step in 0..5 {
        let solve = position(&log, &format!("solve {step}"));
        let reconstruct = position(&log, &format!("reconstruct {step}"));
        let advance = position(&log, &format!("advance {step}"));
        let snapshot = position(&log, &format!("snapshot {step}"));
        assert!(solve < reconstruct);
        assert!(reconstruct < advance);
        assert!(advance < snapshot);
        if step + 1 < 5 {
            assert!(snapshot < position(&log, &format!("solve {}", step + 1)));
        }
    }
}

#[test]
fn test_snapshot_failure_is_fatal_with_context() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut session = recording_session(&log);
    let mut state = SimulationState::new(FsiProblem::standard_registry().unwrap(), 4);
    let mut out = Snapshots { log: Arc::clone(&log), written: Vec::new(), fail_at: Some(2) };

    let driver = SimulationDriver::new(Box::new(SteppedTimeStep::default()));
    let err = driver.run(&mut session, &mut state, &mut out, 5, 1).unwrap_err();
    match err {
        DriverError::Snapshot { step, time, .. } => {
            assert_eq!(step, 2);
            assert!((time - 0.02).abs() < 1e-12);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!log.lock().unwrap().iter().any(|e| e == "solve 3"));
}

#[test]
fn test_session_teardown_after_failure() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    {
        let mut session = recording_session(&log);
        let mut state = SimulationState::new(FsiProblem::standard_registry().unwrap(), 4);
        let mut out = Snapshots { log: Arc::clone(&log), written: Vec::new(), fail_at: Some(0) };
        let driver = SimulationDriver::new(Box::new(SteppedTimeStep::default()));
        assert!(driver.run(&mut session, &mut state, &mut out, 1, 1).is_err());
    }
    let log = log.lock().unwrap();
    let destroy = position(&log, "destroy");
    let release = position(&log, "release");
    assert!(destroy < release);
    assert_eq!(log.iter().filter(|e| *e == "release").count(), 1);
}

// ============================================================
// 使用参考松弛系统的完整问题
// ============================================================

/// 2x2 通道，x 方向左列为流体、右列为结构
///
/// 左侧入口（面 1）、右侧出口（面 2）、上下壁面（面 3）。节点 3 位于入口中点。
fn channel() -> MeshDescription {
    let mut nodes = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            nodes.push(DVec3::new(0.2 * col as f64, 0.205 * row as f64, 0.0));
        }
    }
    let quad = |nodes: Vec<usize>, group| Element { shape: ElementShape::Quadrilateral, nodes, group };
    let side = |element, local_face, face_id| BoundarySide { element, local_face, face_id };
    MeshDescription {
        nodes,
        elements: vec![
            quad(vec![0, 1, 4, 3], 1),
            quad(vec![1, 2, 5, 4], 2),
            quad(vec![3, 4, 7, 6], 1),
            quad(vec![4, 5, 8, 7], 2),
        ],
        groups: vec![
            ElementGroup { id: 1, name: "fluid".into(), material: 1, elements: vec![0, 2] },
            ElementGroup { id: 2, name: "beam".into(), material: 4, elements: vec![1, 3] },
        ],
        boundary_sides: vec![
            side(0, 3, 1),
            side(2, 3, 1),
            side(1, 1, 2),
            side(3, 1, 2),
            side(0, 0, 3),
            side(1, 0, 3),
            side(2, 2, 3),
            side(3, 2, 3),
        ],
        dimension: 2,
        ..Default::default()
    }
}

/// 记录每个快照中某节点的 U 值
struct VelocityTrace {
    node: usize,
    samples: Vec<(usize, f64, f64)>,
}

impl SnapshotWriter for VelocityTrace {
    fn write_snapshot(
        &mut self,
        state: &SimulationState,
        _fields: &[FieldKind],
        step: usize,
    ) -> FsiResult<()> {
        let u = state.current(FieldKind::U)?[self.node];
        self.samples.push((step, state.time, u));
        Ok(())
    }
}

#[test]
fn test_channel_problem_keeps_inflow_velocity() {
    let mesh = channel();
    let inflow_point = mesh.nodes[3];
    let problem = FsiProblem::build(&SimulationConfig::default(), mesh).unwrap();
    let mut session = Session::new(CollaboratorContext::init(1).unwrap());
    let system = problem.create_system(Arc::new(ChannelFsiBoundary::new())).unwrap();
    session.add_system(Box::new(system));

    let mut state = problem.create_state();
    let mut trace = VelocityTrace { node: 3, samples: Vec::new() };
    let summary = problem.driver().run(&mut session, &mut state, &mut trace, 5, 1).unwrap();
    assert_eq!(summary.snapshots, vec![0, 1, 2, 3, 4]);

    // 每个快照中入口节点的 U 等于该步求解时刻的入口剖面
    let bc = ChannelFsiBoundary::new();
    for &(step, time, u) in &trace.samples {
        let expected = bc.evaluate(FieldKind::U, inflow_point, FaceId::Inflow, time);
        assert!(expected.is_dirichlet());
        assert!(
            (u - expected.value).abs() < 1e-12,
            "step {step}: U = {u}, expected {}",
            expected.value
        );
    }
    let (_, _, last) = trace.samples[4];
    assert!(last > 0.0);

    // 位移处处为零；V 全部受约束为零
    for kind in [FieldKind::Dx, FieldKind::Dy, FieldKind::V, FieldKind::Ay] {
        assert!(state.current(kind).unwrap().iter().all(|v| v.abs() < 1e-12));
    }
    // 入口流体节点的加速度由速度变化反推
    assert!(state.current(FieldKind::Ax).unwrap()[3] > 0.0);
    for v in state.current(FieldKind::P).unwrap() {
        assert!(v.is_finite());
    }
    session.teardown();
    assert!(!session.is_active());
}

#[test]
fn test_channel_problem_snapshot_cadence() {
    let problem = FsiProblem::build(&SimulationConfig::default(), channel()).unwrap();
    let mut session = Session::new(CollaboratorContext::init(1).unwrap());
    let system = problem.create_system(Arc::new(ChannelFsiBoundary::new())).unwrap();
    session.add_system(Box::new(system));

    let mut state = problem.create_state();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut out = Snapshots { log, written: Vec::new(), fail_at: None };
    let summary = problem.driver().run(&mut session, &mut state, &mut out, 5, 2).unwrap();

    assert_eq!(summary.snapshots, vec![0, 2, 4]);
    assert_eq!(summary.final_step, 5);
}
