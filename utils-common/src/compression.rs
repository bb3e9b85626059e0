use std::io::{Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use thiserror::Error;

use crate::models::CatalogSnapshot;

/// 魔数常量 - 用于标识目录快照文件
pub const MAGIC_BYTES: &[u8] = b"RKCAT";

/// 当前快照格式版本
pub const SNAPSHOT_VERSION: [u8; 2] = [1, 0];

/// 头部长度：魔数 + 版本号 + 原始数据长度
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 快照编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("序列化失败: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("反序列化失败: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("数据太短，无法解析: {0} 字节")]
    TooShort(usize),
    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,
    #[error("不支持的版本: {0}.{1}")]
    UnsupportedVersion(u8, u8),
    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("压缩流读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(obj, bincode::config::standard())?)
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    let (value, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(value)
}

/// 将对象序列化为压缩的二进制格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, CodecError> {
    let binary = to_binary(obj)?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&(binary.len() as u32).to_le_bytes());

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&binary)?;
    output.extend_from_slice(&encoder.finish()?);

    Ok(output)
}

/// 从压缩的二进制格式反序列化对象，允许指定支持的最大主版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, CodecError> {
    let (_, original_size) = read_header(data, max_version)?;

    // 头部的大小不可信：预分配按压缩数据大小封顶，读取最多多读一个字节用于判断超长
    let compressed = &data[HEADER_LEN..];
    let mut decompressed = Vec::with_capacity(original_size.min(compressed.len().saturating_mul(4)));
    GzDecoder::new(compressed)
        .take(original_size as u64 + 1)
        .read_to_end(&mut decompressed)?;

    if decompressed.len() != original_size {
        return Err(CodecError::SizeMismatch {
            expected: original_size,
            actual: decompressed.len(),
        });
    }

    from_binary(&decompressed)
}

/// 验证压缩数据头部，返回版本号
pub fn validate_compressed_data(data: &[u8], max_version: u8) -> Result<[u8; 2], CodecError> {
    read_header(data, max_version).map(|(version, _)| version)
}

/// 编码目录快照
pub fn encode_snapshot(snapshot: &CatalogSnapshot) -> Result<Vec<u8>, CodecError> {
    to_compressed(snapshot, SNAPSHOT_VERSION)
}

/// 解码目录快照，只接受当前主版本及以下
pub fn decode_snapshot(data: &[u8]) -> Result<CatalogSnapshot, CodecError> {
    from_compressed_with_max_version(data, SNAPSHOT_VERSION[0])
}

// 解析头部：魔数、版本号、原始数据大小
fn read_header(data: &[u8], max_version: u8) -> Result<([u8; 2], usize), CodecError> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::TooShort(data.len()));
    }

    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CodecError::BadMagic);
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(CodecError::UnsupportedVersion(version[0], version[1]));
    }

    let size_offset = version_offset + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..size_offset + 4]);

    Ok((version, u32::from_le_bytes(size_bytes) as usize))
}
