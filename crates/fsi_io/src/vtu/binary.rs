// crates/fsi_io/src/vtu/binary.rs

//! 二进制 VTU 编码器 (Base64 + AppendedData)
//!
//! VTK 附加数据格式：
//! - 每个数据块：Header (u32 小端, 数据字节数) + Data (原始小端二进制)
//! - 每个块单独 base64 编码后依次拼接
//! - `<DataArray format="appended" offset="N">` 中的 N 为块在编码串中的起始位置

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::io::{self, Write};

/// 二进制编码器
#[derive(Debug, Default)]
pub struct BinaryEncoder {
    encoded: String,
}

impl BinaryEncoder {
    /// 创建编码器
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个数据块，返回其偏移
    fn push_block(&mut self, data: &[u8]) -> io::Result<usize> {
        let header = block_header(data.len())?;
        let offset = self.encoded.len();
        let mut block = Vec::with_capacity(4 + data.len());
        block.extend_from_slice(&header);
        block.extend_from_slice(data);
        self.encoded.push_str(&BASE64.encode(&block));
        Ok(offset)
    }

    /// 追加 f64 数组，返回偏移
    pub fn push_f64(&mut self, data: &[f64]) -> io::Result<usize> {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_block(&bytes)
    }

    /// 追加 i64 数组，返回偏移
    pub fn push_i64(&mut self, data: &[i64]) -> io::Result<usize> {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_block(&bytes)
    }

    /// 追加 u8 数组，返回偏移
    pub fn push_u8(&mut self, data: &[u8]) -> io::Result<usize> {
        self.push_block(data)
    }

    /// 当前编码长度
    #[inline]
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// 写出 AppendedData 节
    pub fn write_appended<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, r#"  <AppendedData encoding="base64">"#)?;
        writeln!(writer, "   _{}", self.encoded)?;
        writeln!(writer, "  </AppendedData>")?;
        Ok(())
    }
}

/// UInt32 块头：数据字节数超出 u32 时报错
fn block_header(len: usize) -> io::Result<[u8; 4]> {
    u32::try_from(len).map(u32::to_le_bytes).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("数据块 {} 字节超出 UInt32 块头上限", len),
        )
    })
}
