// crates/fsi_io/tests/vtu_writer.rs

//! 快照输出集成测试

use std::sync::Arc;

use fsi_config::{OutputEncoding, SimulationConfig};
use fsi_io::VtuSnapshotWriter;
use fsi_mesh::{BoundarySide, Element, ElementGroup, ElementShape, MeshDescription};
use fsi_physics::{
    ChannelFsiBoundary, CollaboratorContext, FieldKind, FsiProblem, InterpolationFamily, Session,
    SnapshotWriter,
};
use glam::DVec3;

fn unit_square() -> MeshDescription {
    MeshDescription {
        nodes: vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
        elements: vec![Element { shape: ElementShape::Quadrilateral, nodes: vec![0, 1, 2, 3], group: 1 }],
        groups: vec![ElementGroup { id: 1, name: "fluid".into(), material: 1, elements: vec![0] }],
        boundary_sides: vec![
            BoundarySide { element: 0, local_face: 3, face_id: 1 },
            BoundarySide { element: 0, local_face: 1, face_id: 2 },
        ],
        dimension: 2,
        ..Default::default()
    }
}

#[test]
fn test_run_writes_one_file_per_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SimulationConfig::default();
    config.output.directory = dir.path().join("out");

    let problem = FsiProblem::build(&config, unit_square()).unwrap();
    let mut session = Session::new(CollaboratorContext::init(1).unwrap());
    session.add_system(Box::new(problem.create_system(Arc::new(ChannelFsiBoundary::new())).unwrap()));
    let mut state = problem.create_state();
    let mut writer =
        VtuSnapshotWriter::from_config(&config.output, problem.output_family(), problem.mesh()).unwrap();

    let summary = problem.driver().run(&mut session, &mut state, &mut writer, 5, 1).unwrap();
    writer.finish().unwrap();
    session.teardown();

    assert_eq!(summary.snapshots, vec![0, 1, 2, 3, 4]);
    for step in 0..5 {
        let path = config.output.directory.join(format!("sol.biquadratic.{step}.vtu"));
        let text = std::fs::read_to_string(&path).unwrap();
        for name in ["DX", "DY", "U", "V", "P"] {
            assert!(text.contains(&format!(r#"Name="{name}""#)), "{name} missing in step {step}");
        }
    }
    let pvd = std::fs::read_to_string(config.output.directory.join("sol.biquadratic.pvd")).unwrap();
    assert_eq!(pvd.matches("<DataSet").count(), 5);
}

#[test]
fn test_binary_moving_mesh_output() {
    let dir = tempfile::tempdir().unwrap();
    let problem = FsiProblem::build(&SimulationConfig::default(), unit_square()).unwrap();
    let mut state = problem.create_state();
    state.current_mut(FieldKind::Dx).unwrap()[2] = 0.5;

    let mut writer = VtuSnapshotWriter::new(dir.path(), InterpolationFamily::Linear, problem.mesh())
        .unwrap()
        .with_encoding(OutputEncoding::Binary)
        .with_moving_mesh(true)
        .with_pvd(false);
    writer.write_snapshot(&state, &[FieldKind::Dx], 7).unwrap();
    writer.finish().unwrap();

    let text = std::fs::read_to_string(dir.path().join("sol.linear.7.vtu")).unwrap();
    assert!(text.contains("AppendedData"));
    assert!(!dir.path().join("sol.linear.pvd").exists());
    assert_eq!(writer.written().len(), 1);
}

#[test]
fn test_unregistered_snapshot_field_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let problem = FsiProblem::build(&SimulationConfig::default(), unit_square()).unwrap();
    let state = problem.create_state();
    let mut writer =
        VtuSnapshotWriter::new(dir.path(), InterpolationFamily::Biquadratic, problem.mesh()).unwrap();
    assert!(writer.write_snapshot(&state, &[FieldKind::W], 0).is_err());
}
