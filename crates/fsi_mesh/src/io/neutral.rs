// crates/fsi_mesh/src/io/neutral.rs

//! Gambit 中性文件 (.neu) 读取
//!
//! 支持的分节：
//!
//! - `CONTROL INFO`: 节点/单元/组/边界集数量与坐标维数
//! - `NODAL COORDINATES`: 节点坐标
//! - `ELEMENTS/CELLS`: 单元（节点列表可跨行续写）
//! - `ELEMENT GROUP`: 单元组与材料标签
//! - `BOUNDARY CONDITIONS`: 边界集，集合名即边界面编号
//!
//! # 示例
//!
//! ```ignore
//! use fsi_mesh::io::NeutralLoader;
//!
//! let mesh = NeutralLoader::load("./input/fsifirst.neu")?;
//! println!("{} 节点, {} 单元", mesh.n_nodes(), mesh.n_elements());
//! ```

use glam::DVec3;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{BoundarySide, Element, ElementGroup, ElementShape, MeshDescription};

const FORMAT: &str = "gambit";
const END_OF_SECTION: &str = "ENDOFSECTION";

/// Gambit 中性文件加载器
pub struct NeutralLoader;

impl NeutralLoader {
    /// 加载中性文件
    pub fn load<P: AsRef<Path>>(path: P) -> MeshResult<MeshDescription> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MeshError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// 从 reader 加载，`file` 仅用于错误信息
    pub fn load_from_reader<R: BufRead>(reader: R, file: &str) -> MeshResult<MeshDescription> {
        let lines = reader
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| MeshError::Io {
                path: file.into(),
                source,
            })?;
        Self::parse_lines(&lines, file)
    }

    /// 从字符串解析
    pub fn parse_str(content: &str, file: &str) -> MeshResult<MeshDescription> {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        Self::parse_lines(&lines, file)
    }

    fn parse_lines(lines: &[String], file: &str) -> MeshResult<MeshDescription> {
        let mut cursor = Cursor { lines, pos: 0, file };
        let mut state = ParseState::default();

        while let Some((line_no, line)) = cursor.next_line() {
            let header = line.trim().to_ascii_uppercase();
            if header.starts_with("CONTROL INFO") {
                let body = cursor.section_body(line_no)?;
                state.parse_control(&cursor, &body)?;
            } else if header.starts_with("NODAL COORDINATES") {
                let body = cursor.section_body(line_no)?;
                state.parse_nodes(&cursor, &body)?;
            } else if header.starts_with("ELEMENTS/CELLS") {
                let body = cursor.section_body(line_no)?;
                state.parse_elements(&cursor, &body)?;
            } else if header.starts_with("ELEMENT GROUP") {
                let body = cursor.section_body(line_no)?;
                state.parse_group(&cursor, line_no, &body)?;
            } else if header.starts_with("BOUNDARY CONDITIONS") {
                let body = cursor.section_body(line_no)?;
                state.parse_boundary(&cursor, line_no, &body)?;
            }
        }

        state.finish(&cursor)
    }
}

// ============================================================
// 行游标
// ============================================================

struct Cursor<'a> {
    lines: &'a [String],
    pos: usize,
    file: &'a str,
}

type Line<'a> = (usize, &'a str);

impl<'a> Cursor<'a> {
    fn next_line(&mut self) -> Option<Line<'a>> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some((self.pos, line.as_str()))
    }

    /// 读取到 ENDOFSECTION 为止的所有非空行
    fn section_body(&mut self, header_line: usize) -> MeshResult<Vec<Line<'a>>> {
        let mut body = Vec::new();
        while let Some((no, line)) = self.next_line() {
            let t = line.trim();
            if t.eq_ignore_ascii_case(END_OF_SECTION) {
                return Ok(body);
            }
            if !t.is_empty() {
                body.push((no, t));
            }
        }
        Err(self.error(header_line, "分节缺少 ENDOFSECTION"))
    }

    fn error(&self, line: usize, message: impl Into<String>) -> MeshError {
        MeshError::mesh_format_error(FORMAT, self.file, line, message)
    }

    fn parse<T: FromStr>(&self, line: usize, token: &str, what: &str) -> MeshResult<T> {
        token
            .parse::<T>()
            .map_err(|_| self.error(line, format!("无法解析{}: '{}'", what, token)))
    }
}

fn tokens<'a>(body: &[Line<'a>]) -> Vec<(usize, &'a str)> {
    body.iter()
        .flat_map(|&(no, line)| line.split_whitespace().map(move |t| (no, t)))
        .collect()
}

// ============================================================
// 解析状态
// ============================================================

#[derive(Default)]
struct ParseState {
    dimension: Option<usize>,
    nodes: Vec<DVec3>,
    node_map: HashMap<usize, usize>,
    elements: Vec<Element>,
    element_map: HashMap<usize, usize>,
    groups: Vec<ElementGroup>,
    boundary_sides: Vec<BoundarySide>,
    boundary_node_sets: Vec<(usize, u32)>,
}

impl ParseState {
    fn parse_control(&mut self, cur: &Cursor<'_>, body: &[Line<'_>]) -> MeshResult<()> {
        let idx = body
            .iter()
            .position(|(_, l)| l.to_ascii_uppercase().contains("NUMNP"))
            .ok_or_else(|| cur.error(body.first().map_or(0, |l| l.0), "CONTROL INFO 缺少 NUMNP 行"))?;
        let (no, counts) = body
            .get(idx + 1)
            .copied()
            .ok_or_else(|| cur.error(body[idx].0, "CONTROL INFO 缺少计数行"))?;
        let values: Vec<&str> = counts.split_whitespace().collect();
        if values.len() < 5 {
            return Err(cur.error(no, "CONTROL INFO 计数行字段不足"));
        }
        self.dimension = Some(cur.parse(no, values[4], "坐标维数 NDFCD")?);
        debug!("Gambit 控制信息: NUMNP={} NELEM={} NDFCD={}", values[0], values[1], values[4]);
        Ok(())
    }

    fn parse_nodes(&mut self, cur: &Cursor<'_>, body: &[Line<'_>]) -> MeshResult<()> {
        self.nodes.reserve(body.len());
        self.node_map.reserve(body.len());

        for &(no, line) in body {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return Err(cur.error(no, "节点行至少需要编号与两个坐标"));
            }
            let id: usize = cur.parse(no, parts[0], "节点编号")?;
            let x: f64 = cur.parse(no, parts[1], "x 坐标")?;
            let y: f64 = cur.parse(no, parts[2], "y 坐标")?;
            let z: f64 = match parts.get(3) {
                Some(t) => cur.parse(no, t, "z 坐标")?,
                None => 0.0,
            };
            if self.node_map.insert(id, self.nodes.len()).is_some() {
                return Err(cur.error(no, format!("节点编号 {} 重复", id)));
            }
            self.nodes.push(DVec3::new(x, y, z));
        }
        Ok(())
    }

    fn parse_elements(&mut self, cur: &Cursor<'_>, body: &[Line<'_>]) -> MeshResult<()> {
        if self.nodes.is_empty() {
            let no = body.first().map_or(0, |l| l.0);
            return Err(cur.error(no, "ELEMENTS/CELLS 出现在 NODAL COORDINATES 之前"));
        }

        let toks = tokens(body);
        let mut it = toks.into_iter();
        while let Some((no, t)) = it.next() {
            let id: usize = cur.parse(no, t, "单元编号")?;
            let (no, t) = it.next().ok_or_else(|| cur.error(no, "单元缺少 NTYPE"))?;
            let ntype: u8 = cur.parse(no, t, "单元类型 NTYPE")?;
            let shape = ElementShape::from_gambit(ntype)
                .ok_or_else(|| cur.error(no, format!("未知单元类型 {}", ntype)))?;
            let (no, t) = it.next().ok_or_else(|| cur.error(no, "单元缺少 NDP"))?;
            let ndp: usize = cur.parse(no, t, "单元节点数 NDP")?;

            let mut nodes = Vec::with_capacity(ndp);
            let mut last = no;
            for _ in 0..ndp {
                let (no, t) = it
                    .next()
                    .ok_or_else(|| cur.error(last, format!("单元 {} 节点列表不完整", id)))?;
                let node_id: usize = cur.parse(no, t, "单元节点编号")?;
                let idx = *self
                    .node_map
                    .get(&node_id)
                    .ok_or_else(|| cur.error(no, format!("单元 {} 引用了不存在的节点 {}", id, node_id)))?;
                nodes.push(idx);
                last = no;
            }

            if self.element_map.insert(id, self.elements.len()).is_some() {
                return Err(cur.error(no, format!("单元编号 {} 重复", id)));
            }
            self.elements.push(Element { shape, nodes, group: 0 });
        }
        Ok(())
    }

    fn parse_group(&mut self, cur: &Cursor<'_>, header: usize, body: &[Line<'_>]) -> MeshResult<()> {
        let (no, line) = body
            .first()
            .copied()
            .ok_or_else(|| cur.error(header, "ELEMENT GROUP 为空"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let token_of = |key: &str| {
            fields
                .iter()
                .position(|f| f.eq_ignore_ascii_case(key))
                .ok_or_else(|| cur.error(no, format!("组头缺少 {}", key)))
                .and_then(|pos| {
                    fields
                        .get(pos + 1)
                        .copied()
                        .ok_or_else(|| cur.error(no, format!("组头 {} 缺少数值", key)))
                })
        };
        let id: u32 = cur.parse(no, token_of("GROUP:")?, "组编号")?;
        let count: usize = cur.parse(no, token_of("ELEMENTS:")?, "组单元数")?;
        let material: u32 = cur.parse(no, token_of("MATERIAL:")?, "材料编号")?;
        let nflags: usize = cur.parse(no, token_of("NFLAGS:")?, "NFLAGS")?;

        let name = body.get(1).map(|l| l.1.to_string()).unwrap_or_default();
        let toks = tokens(body.get(2..).unwrap_or(&[]));
        if toks.len() < nflags + count {
            return Err(cur.error(no, format!("组 {} 声明 {} 个单元, 实际不足", id, count)));
        }

        let mut elements = Vec::with_capacity(count);
        for &(no, t) in &toks[nflags..nflags + count] {
            let elem_id: usize = cur.parse(no, t, "组内单元编号")?;
            let idx = *self
                .element_map
                .get(&elem_id)
                .ok_or_else(|| cur.error(no, format!("组 {} 引用了不存在的单元 {}", id, elem_id)))?;
            self.elements[idx].group = id;
            elements.push(idx);
        }

        self.groups.push(ElementGroup { id, name, material, elements });
        Ok(())
    }

    fn parse_boundary(&mut self, cur: &Cursor<'_>, header: usize, body: &[Line<'_>]) -> MeshResult<()> {
        let (no, line) = body
            .first()
            .copied()
            .ok_or_else(|| cur.error(header, "BOUNDARY CONDITIONS 为空"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(cur.error(no, "边界集头部字段不足"));
        }
        let face_id: u32 = fields[0]
            .parse()
            .map_err(|_| cur.error(no, format!("边界集名称 '{}' 不是面编号", fields[0])))?;
        let itype: u8 = cur.parse(no, fields[1], "边界集类型 ITYPE")?;
        let nentry: usize = cur.parse(no, fields[2], "边界集条目数")?;

        let entries = body.get(1..).unwrap_or(&[]);
        if entries.len() < nentry {
            return Err(cur.error(no, format!("边界集 {} 声明 {} 个条目, 实际 {}", face_id, nentry, entries.len())));
        }

        for &(no, line) in &entries[..nentry] {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match itype {
                0 => {
                    let token = parts.first().ok_or_else(|| cur.error(no, "节点条目为空"))?;
                    let node_id: usize = cur.parse(no, token, "边界节点编号")?;
                    let node = *self
                        .node_map
                        .get(&node_id)
                        .ok_or_else(|| cur.error(no, format!("边界集引用了不存在的节点 {}", node_id)))?;
                    self.boundary_node_sets.push((node, face_id));
                }
                1 => {
                    if parts.len() < 3 {
                        return Err(cur.error(no, "单元边条目需要 单元 类型 边号"));
                    }
                    let elem_id: usize = cur.parse(no, parts[0], "边界单元编号")?;
                    let local: usize = cur.parse(no, parts[2], "局部边号")?;
                    let element = *self
                        .element_map
                        .get(&elem_id)
                        .ok_or_else(|| cur.error(no, format!("边界集引用了不存在的单元 {}", elem_id)))?;
                    if local == 0 {
                        return Err(cur.error(no, "局部边号从 1 开始"));
                    }
                    self.boundary_sides.push(BoundarySide {
                        element,
                        local_face: local - 1,
                        face_id,
                    });
                }
                other => return Err(cur.error(no, format!("不支持的边界集类型 {}", other))),
            }
        }
        Ok(())
    }

    fn finish(self, cur: &Cursor<'_>) -> MeshResult<MeshDescription> {
        if self.nodes.is_empty() {
            return Err(cur.error(cur.pos, "文件中没有节点"));
        }
        if self.elements.is_empty() {
            return Err(cur.error(cur.pos, "文件中没有单元"));
        }

        let dimension = self
            .dimension
            .unwrap_or_else(|| self.elements.iter().map(|e| e.shape.dimension()).max().unwrap_or(2));

        info!(
            "读取 Gambit 网格 {}: {} 节点, {} 单元, {} 组, {} 条边界边",
            cur.file,
            self.nodes.len(),
            self.elements.len(),
            self.groups.len(),
            self.boundary_sides.len()
        );

        Ok(MeshDescription {
            nodes: self.nodes,
            elements: self.elements,
            groups: self.groups,
            boundary_sides: self.boundary_sides,
            boundary_node_sets: self.boundary_node_sets,
            dimension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_QUADS: &str = "\
        CONTROL INFO 2.4.6
** GAMBIT NEUTRAL FILE
channel
PROGRAM:                Gambit     VERSION:  2.4.6
     NUMNP     NELEM     NGRPS    NBSETS     NDFCD     NDFVL
         6         2         2         2         2         2
ENDOFSECTION
   NODAL COORDINATES 2.4.6
         1  0.0  0.0
         2  1.0  0.0
         3  2.0  0.0
         4  0.0  0.41
         5  1.0  0.41
         6  2.0  0.41
ENDOFSECTION
      ELEMENTS/CELLS 2.4.6
       1  2  4        1       2       5       4
       2  2  4        2       3
                      6       5
ENDOFSECTION
       ELEMENT GROUP 2.4.6
GROUP:          1 ELEMENTS:          1 MATERIAL:          2 NFLAGS:          1
                           fluid
       0
       1
ENDOFSECTION
       ELEMENT GROUP 2.4.6
GROUP:          5 ELEMENTS:          1 MATERIAL:          4 NFLAGS:          1
                           solid
       0
       2
ENDOFSECTION
 BOUNDARY CONDITIONS 2.4.6
                       1       1       1       0       6
       1       2       4
ENDOFSECTION
 BOUNDARY CONDITIONS 2.4.6
                       3       1       2       0       6
       1       2       1
       2       2       1
ENDOFSECTION
";

    #[test]
    fn test_parse_two_quads() {
        let mesh = NeutralLoader::parse_str(TWO_QUADS, "two_quads.neu").unwrap();
        assert_eq!(mesh.n_nodes(), 6);
        assert_eq!(mesh.n_elements(), 2);
        assert_eq!(mesh.dimension, 2);
        assert_eq!(mesh.elements[1].nodes, vec![1, 2, 5, 4]);
        assert_eq!(mesh.elements[1].group, 5);
        assert_eq!(mesh.group(5).map(|g| g.material), Some(4));
        assert_eq!(mesh.face_ids(), vec![1, 3]);
        assert_eq!(mesh.boundary_sides[0].local_face, 3);
        assert_eq!(mesh.side_nodes(0, 3).unwrap(), vec![3, 0]);
    }

    #[test]
    fn test_missing_end_of_section() {
        let text = "   NODAL COORDINATES 2.4.6\n 1 0.0 0.0\n";
        let err = NeutralLoader::parse_str(text, "bad.neu").unwrap_err();
        assert!(matches!(err, MeshError::MeshFormatError { line: 1, .. }));
    }

    #[test]
    fn test_unknown_node_reports_line() {
        let text = "\
   NODAL COORDINATES 2.4.6
 1 0.0 0.0
 2 1.0 0.0
ENDOFSECTION
      ELEMENTS/CELLS 2.4.6
 1 3 3 1 2 9
ENDOFSECTION
";
        let err = NeutralLoader::parse_str(text, "bad.neu").unwrap_err();
        match err {
            MeshError::MeshFormatError { line, message, .. } => {
                assert_eq!(line, 6);
                assert!(message.contains('9'));
            }
            other => panic!("意外错误: {other}"),
        }
    }

    #[test]
    fn test_oversized_material_rejected() {
        let text = TWO_QUADS.replace("MATERIAL:          4", "MATERIAL: 4294967296");
        match NeutralLoader::parse_str(&text, "bad.neu").unwrap_err() {
            MeshError::MeshFormatError { message, .. } => {
                assert!(message.contains("材料编号"));
                assert!(message.contains("4294967296"));
            }
            other => panic!("意外错误: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_set_name_rejected() {
        let text = TWO_QUADS.replace("                       3       1       2", "                   wall       1       2");
        assert!(NeutralLoader::parse_str(&text, "bad.neu").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsifirst.neu");
        std::fs::write(&path, TWO_QUADS).unwrap();

        let mesh = NeutralLoader::load(&path).unwrap();
        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.boundary_sides.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = NeutralLoader::load("/nonexistent/fsifirst.neu").unwrap_err();
        assert!(matches!(err, MeshError::Io { .. }));
        let err: fsi_foundation::FsiError = err.into();
        assert!(matches!(err, fsi_foundation::FsiError::FileNotFound { .. }));
    }
}
