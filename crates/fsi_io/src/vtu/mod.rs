// crates/fsi_io/src/vtu/mod.rs
//! VTU 格式支持模块
//!
//! 提供 VTK Unstructured Grid 二进制附加数据的编码。

pub mod binary;
