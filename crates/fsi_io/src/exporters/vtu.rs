// crates/fsi_io/src/exporters/vtu.rs

//! VTU 格式导出器
//!
//! 导出 VTK Unstructured Grid 格式，用于 ParaView 可视化。
//!
//! # 功能
//!
//! - 单帧 VTU 导出（每个请求的场一个 PointData 数组）
//! - 时间序列索引 (PVD)
//! - ASCII 和 base64 附加二进制格式

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use fsi_config::OutputEncoding;

use crate::error::{IoError, IoResult};
use crate::snapshot::{FieldSnapshot, MeshSnapshot};
use crate::vtu::binary::BinaryEncoder;

/// VTU 导出器
#[derive(Debug, Clone, Copy, Default)]
pub struct VtuExporter {
    encoding: OutputEncoding,
}

impl VtuExporter {
    /// 创建 ASCII 导出器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置编码
    pub fn encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// 导出单帧
    pub fn export(
        &self,
        path: impl AsRef<Path>,
        mesh: &MeshSnapshot,
        snapshot: &FieldSnapshot,
    ) -> IoResult<()> {
        snapshot.check_length(mesh.n_points())?;
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| IoError::io(path, e))?;
        let mut w = BufWriter::new(file);
        self.write_to(&mut w, mesh, snapshot)
            .and_then(|_| w.flush())
            .map_err(|e| IoError::io(path, e))
    }

    /// 写出 VTU 文档
    pub fn write_to<W: Write>(
        &self,
        w: &mut W,
        mesh: &MeshSnapshot,
        snapshot: &FieldSnapshot,
    ) -> io::Result<()> {
        let mut encoder = BinaryEncoder::new();

        writeln!(w, r#"<?xml version="1.0"?>"#)?;
        match self.encoding {
            OutputEncoding::Ascii => writeln!(
                w,
                r#"<VTKFile type="UnstructuredGrid" version="0.1" byte_order="LittleEndian">"#
            )?,
            OutputEncoding::Binary => writeln!(
                w,
                r#"<VTKFile type="UnstructuredGrid" version="0.1" byte_order="LittleEndian" header_type="UInt32">"#
            )?,
        }
        writeln!(w, r#"  <UnstructuredGrid>"#)?;
        writeln!(w, r#"    <FieldData>"#)?;
        writeln!(
            w,
            r#"      <DataArray type="Float64" Name="TimeValue" NumberOfTuples="1" format="ascii">{}</DataArray>"#,
            snapshot.time
        )?;
        writeln!(
            w,
            r#"      <DataArray type="Int64" Name="Step" NumberOfTuples="1" format="ascii">{}</DataArray>"#,
            snapshot.step
        )?;
        writeln!(w, r#"    </FieldData>"#)?;
        writeln!(
            w,
            r#"    <Piece NumberOfPoints="{}" NumberOfCells="{}">"#,
            mesh.n_points(),
            mesh.n_cells()
        )?;

        // 节点
        writeln!(w, r#"      <Points>"#)?;
        let coords: Vec<f64> = mesh.points.iter().flatten().copied().collect();
        self.write_f64(w, &mut encoder, r#"NumberOfComponents="3""#, &coords)?;
        writeln!(w, r#"      </Points>"#)?;

        // 单元
        writeln!(w, r#"      <Cells>"#)?;
        let connectivity: Vec<i64> = mesh.connectivity.iter().flatten().map(|&n| n as i64).collect();
        let offsets: Vec<i64> = mesh.offsets().into_iter().map(|o| o as i64).collect();
        let types: Vec<u8> = mesh.cell_types.iter().map(|&t| t as u8).collect();
        self.write_i64(w, &mut encoder, r#"Name="connectivity""#, &connectivity)?;
        self.write_i64(w, &mut encoder, r#"Name="offsets""#, &offsets)?;
        self.write_u8(w, &mut encoder, r#"Name="types""#, &types)?;
        writeln!(w, r#"      </Cells>"#)?;

        // 场
        writeln!(w, r#"      <PointData>"#)?;
        for (kind, values) in &snapshot.fields {
            let attrs = format!(r#"Name="{}""#, kind.name());
            self.write_f64(w, &mut encoder, &attrs, values)?;
        }
        writeln!(w, r#"      </PointData>"#)?;

        writeln!(w, r#"    </Piece>"#)?;
        writeln!(w, r#"  </UnstructuredGrid>"#)?;
        if self.encoding == OutputEncoding::Binary {
            encoder.write_appended(w)?;
        }
        writeln!(w, r#"</VTKFile>"#)?;
        Ok(())
    }

    fn write_f64<W: Write>(
        &self,
        w: &mut W,
        encoder: &mut BinaryEncoder,
        attrs: &str,
        data: &[f64],
    ) -> io::Result<()> {
        match self.encoding {
            OutputEncoding::Ascii => {
                writeln!(w, r#"        <DataArray type="Float64" {} format="ascii">"#, attrs)?;
                write_ascii_rows(w, data, |v| format!("{:.10e}", v))?;
                writeln!(w, r#"        </DataArray>"#)
            }
            OutputEncoding::Binary => {
                let offset = encoder.push_f64(data)?;
                writeln!(
                    w,
                    r#"        <DataArray type="Float64" {} format="appended" offset="{}"/>"#,
                    attrs, offset
                )
            }
        }
    }

    fn write_i64<W: Write>(
        &self,
        w: &mut W,
        encoder: &mut BinaryEncoder,
        attrs: &str,
        data: &[i64],
    ) -> io::Result<()> {
        match self.encoding {
            OutputEncoding::Ascii => {
                writeln!(w, r#"        <DataArray type="Int64" {} format="ascii">"#, attrs)?;
                write_ascii_rows(w, data, |v| v.to_string())?;
                writeln!(w, r#"        </DataArray>"#)
            }
            OutputEncoding::Binary => {
                let offset = encoder.push_i64(data)?;
                writeln!(
                    w,
                    r#"        <DataArray type="Int64" {} format="appended" offset="{}"/>"#,
                    attrs, offset
                )
            }
        }
    }

    fn write_u8<W: Write>(
        &self,
        w: &mut W,
        encoder: &mut BinaryEncoder,
        attrs: &str,
        data: &[u8],
    ) -> io::Result<()> {
        match self.encoding {
            OutputEncoding::Ascii => {
                writeln!(w, r#"        <DataArray type="UInt8" {} format="ascii">"#, attrs)?;
                write_ascii_rows(w, data, |v| v.to_string())?;
                writeln!(w, r#"        </DataArray>"#)
            }
            OutputEncoding::Binary => {
                let offset = encoder.push_u8(data)?;
                writeln!(
                    w,
                    r#"        <DataArray type="UInt8" {} format="appended" offset="{}"/>"#,
                    attrs, offset
                )
            }
        }
    }

    /// 写出 PVD 时间序列索引
    pub fn write_pvd(path: impl AsRef<Path>, files: &[(String, f64)]) -> IoResult<()> {
        let path = path.as_ref();
        let write = || -> io::Result<()> {
            let mut w = BufWriter::new(File::create(path)?);
            writeln!(w, r#"<?xml version="1.0"?>"#)?;
            writeln!(
                w,
                r#"<VTKFile type="Collection" version="0.1" byte_order="LittleEndian">"#
            )?;
            writeln!(w, r#"  <Collection>"#)?;
            for (filename, time) in files {
                writeln!(
                    w,
                    r#"    <DataSet timestep="{}" group="" part="0" file="{}"/>"#,
                    time, filename
                )?;
            }
            writeln!(w, r#"  </Collection>"#)?;
            writeln!(w, r#"</VTKFile>"#)?;
            w.flush()
        };
        write().map_err(|e| IoError::io(path, e))
    }
}

/// 每行最多 6 个值
fn write_ascii_rows<W: Write, T: Copy>(
    w: &mut W,
    data: &[T],
    fmt: impl Fn(T) -> String,
) -> io::Result<()> {
    for chunk in data.chunks(6) {
        let row: Vec<String> = chunk.iter().map(|&v| fmt(v)).collect();
        writeln!(w, "          {}", row.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::VtkCellType;
    use fsi_physics::{FieldKind, InterpolationFamily};

    fn triangle() -> (MeshSnapshot, FieldSnapshot) {
        let mesh = MeshSnapshot {
            points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            connectivity: vec![vec![0, 1, 2]],
            cell_types: vec![VtkCellType::Triangle],
        };
        let snap = FieldSnapshot {
            step: 3,
            time: 0.03,
            family: InterpolationFamily::Biquadratic,
            fields: vec![(FieldKind::U, vec![1.0, 2.0, 3.0]), (FieldKind::P, vec![0.0; 3])],
        };
        (mesh, snap)
    }

    #[test]
    fn test_ascii_document() {
        let (mesh, snap) = triangle();
        let mut out = Vec::new();
        VtuExporter::new().write_to(&mut out, &mesh, &snap).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"Name="TimeValue""#));
        assert!(text.contains(r#"NumberOfPoints="3" NumberOfCells="1""#));
        assert!(text.contains(r#"Name="U""#));
        assert!(text.contains(r#"Name="P""#));
        assert!(!text.contains("AppendedData"));
    }

    #[test]
    fn test_binary_document() {
        let (mesh, snap) = triangle();
        let mut out = Vec::new();
        VtuExporter::new()
            .encoding(OutputEncoding::Binary)
            .write_to(&mut out, &mesh, &snap)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"format="appended" offset="0""#));
        assert!(text.contains(r#"<AppendedData encoding="base64">"#));
    }

    #[test]
    fn test_field_length_checked() {
        let (mesh, mut snap) = triangle();
        snap.fields[0].1.pop();
        let dir = tempfile::tempdir().unwrap();
        let err = VtuExporter::new().export(dir.path().join("x.vtu"), &mesh, &snap);
        assert!(matches!(err, Err(IoError::FieldLength { .. })));
    }

    #[test]
    fn test_pvd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sol.pvd");
        VtuExporter::write_pvd(&path, &[("a.vtu".into(), 0.0), ("b.vtu".into(), 0.01)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#"timestep="0.01""#));
        assert!(text.contains(r#"file="b.vtu""#));
    }
}
