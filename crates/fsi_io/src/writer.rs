// crates/fsi_io/src/writer.rs

//! 驱动器快照输出
//!
//! [`VtuSnapshotWriter`] 把驱动器请求的快照写成 `sol.<族>.<步号>.vtu`，
//! 结束时写出 `sol.<族>.pvd` 时间序列索引。

use std::path::{Path, PathBuf};

use fsi_config::{OutputConfig, OutputEncoding};
use fsi_foundation::FsiResult;
use fsi_mesh::MeshDescription;
use fsi_physics::{FieldKind, InterpolationFamily, SimulationState, SnapshotWriter};
use tracing::info;

use crate::error::{IoError, IoResult};
use crate::exporters::VtuExporter;
use crate::snapshot::{FieldSnapshot, MeshSnapshot};

/// 输出文件前缀
const PREFIX: &str = "sol";

/// VTU 快照输出
#[derive(Debug)]
pub struct VtuSnapshotWriter {
    directory: PathBuf,
    family: InterpolationFamily,
    mesh: MeshSnapshot,
    exporter: VtuExporter,
    moving_mesh: bool,
    write_pvd: bool,
    written: Vec<(String, f64)>,
}

impl VtuSnapshotWriter {
    /// 创建输出，必要时创建输出目录
    pub fn new(
        directory: impl Into<PathBuf>,
        family: InterpolationFamily,
        mesh: &MeshDescription,
    ) -> IoResult<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|e| IoError::io(&directory, e))?;
        Ok(Self {
            directory,
            family,
            mesh: MeshSnapshot::from_mesh(mesh)?,
            exporter: VtuExporter::new(),
            moving_mesh: false,
            write_pvd: true,
            written: Vec::new(),
        })
    }

    /// 按输出配置创建
    pub fn from_config(
        config: &OutputConfig,
        family: InterpolationFamily,
        mesh: &MeshDescription,
    ) -> IoResult<Self> {
        Ok(Self::new(&config.directory, family, mesh)?
            .with_encoding(config.encoding)
            .with_pvd(config.write_pvd))
    }

    /// 设置编码
    pub fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.exporter = self.exporter.encoding(encoding);
        self
    }

    /// 是否写出 PVD 索引
    pub fn with_pvd(mut self, write_pvd: bool) -> Self {
        self.write_pvd = write_pvd;
        self
    }

    /// 节点坐标是否按 DX/DY/DZ 移动
    pub fn with_moving_mesh(mut self, moving_mesh: bool) -> Self {
        self.moving_mesh = moving_mesh;
        self
    }

    /// 输出目录
    #[inline]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 第 `step` 步的文件名
    pub fn file_name(&self, step: usize) -> String {
        format!("{}.{}.{}.vtu", PREFIX, self.family.name(), step)
    }

    /// PVD 索引路径
    pub fn pvd_path(&self) -> PathBuf {
        self.directory.join(format!("{}.{}.pvd", PREFIX, self.family.name()))
    }

    /// 已写出的文件与时间
    #[inline]
    pub fn written(&self) -> &[(String, f64)] {
        &self.written
    }

    fn write(&mut self, state: &SimulationState, fields: &[FieldKind], step: usize) -> IoResult<()> {
        let snapshot = FieldSnapshot::capture(state, fields, self.family, step)?;
        let file_name = self.file_name(step);
        let path = self.directory.join(&file_name);

        if self.moving_mesh {
            let mesh = self.mesh.displaced(
                state.current(FieldKind::Dx).ok(),
                state.current(FieldKind::Dy).ok(),
                state.current(FieldKind::Dz).ok(),
            )?;
            self.exporter.export(&path, &mesh, &snapshot)?;
        } else {
            self.exporter.export(&path, &self.mesh, &snapshot)?;
        }

        info!("已写出快照 {} (第 {} 步, t = {:.4})", path.display(), step, state.time);
        self.written.push((file_name, state.time));
        Ok(())
    }
}

impl SnapshotWriter for VtuSnapshotWriter {
    fn write_snapshot(
        &mut self,
        state: &SimulationState,
        fields: &[FieldKind],
        step: usize,
    ) -> FsiResult<()> {
        self.write(state, fields, step)?;
        Ok(())
    }

    fn finish(&mut self) -> FsiResult<()> {
        if self.write_pvd && !self.written.is_empty() {
            let path = self.pvd_path();
            VtuExporter::write_pvd(&path, &self.written)?;
            info!("已写出时间序列索引 {} ({} 帧)", path.display(), self.written.len());
        }
        Ok(())
    }
}
