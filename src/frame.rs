//! # 帧编解码模块
//!
//! 载体中的帧结构 (以载体字节为单位)：
//!
//! ```text
//! ┌────────────────────┬──────────────────────────┬──────────────────────────┐
//! │ 模式标记 (可选)     │ 负载长度                  │ 负载                      │
//! │ 2 个载体字节        │ u64 小端序, 8 字节         │ len 字节                  │
//! │ 每字节 1 位         │ 按位块宽度打包             │ 按位块宽度打包             │
//! └────────────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! 模式标记总是用 1 位宽度写入，因此无论负载使用哪种宽度，提取时都能先恢复出宽度本身。

use crate::bits::{ChunkWidth, write_chunk};
use crate::constants::{LENGTH_PREFIX_BYTES, MARKER_SLOTS};
use crate::error::{Result, StegoError};

/// 把位块宽度映射为 2 位的模式值：{1, 2, 4, 8} -> {0, 1, 2, 3}。
pub fn encode_mode_marker(width: ChunkWidth) -> u8 {
    width.bits().trailing_zeros() as u8
}

/// 从载体的前两个字节的最低位恢复位块宽度。
///
/// 第 0 个载体字节存放模式值的第 0 位，第 1 个载体字节存放第 1 位。
///
/// # Errors
///
/// 载体不足两个字节时返回 [`StegoError::BoundsViolation`]。
pub fn decode_mode_marker(carrier: &[u8]) -> Result<ChunkWidth> {
    let [low, high, ..] = carrier else {
        return Err(StegoError::BoundsViolation {
            required: MARKER_SLOTS,
            available: carrier.len(),
        });
    };

    let mode = (low & 1) | ((high & 1) << 1);
    ChunkWidth::new(1 << mode)
}

/// 把模式标记写入载体的前两个字节，只改动它们的最低位。
///
/// # Errors
///
/// 载体不足两个字节时返回 [`StegoError::Capacity`]。
pub fn write_mode_marker(carrier: &mut [u8], width: ChunkWidth) -> Result<()> {
    let available = carrier.len();
    let [low, high, ..] = carrier else {
        return Err(StegoError::Capacity {
            required: MARKER_SLOTS,
            available,
        });
    };

    let mode = encode_mode_marker(width);
    *low = write_chunk(*low, ChunkWidth::ONE, mode & 1);
    *high = write_chunk(*high, ChunkWidth::ONE, (mode >> 1) & 1);
    Ok(())
}

/// 把负载长度序列化为固定 8 字节的小端序整数。
pub fn build_length_prefix(payload_len: u64) -> [u8; LENGTH_PREFIX_BYTES] {
    payload_len.to_le_bytes()
}

/// [`build_length_prefix`] 的逆操作。
///
/// # Errors
///
/// `bytes` 长度不是 8 时返回 [`StegoError::BoundsViolation`]。
pub fn parse_length_prefix(bytes: &[u8]) -> Result<u64> {
    let prefix: [u8; LENGTH_PREFIX_BYTES] =
        bytes.try_into().map_err(|_| StegoError::BoundsViolation {
            required: LENGTH_PREFIX_BYTES,
            available: bytes.len(),
        })?;
    Ok(u64::from_le_bytes(prefix))
}

/// 一次嵌入或提取所使用的帧布局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub width: ChunkWidth,
    pub marker: bool,
}

impl FrameLayout {
    pub fn new(width: ChunkWidth, marker: bool) -> Self {
        Self { width, marker }
    }

    /// 长度前缀开始的载体下标。
    pub fn prefix_offset(&self) -> usize {
        if self.marker { MARKER_SLOTS } else { 0 }
    }

    /// 模式标记与长度前缀共占用的载体字节数。
    pub fn header_slots(&self) -> usize {
        self.prefix_offset() + self.width.slots_for(LENGTH_PREFIX_BYTES)
    }

    /// 嵌入 `payload_len` 字节负载所需的载体字节总数。
    pub fn required_slots(&self, payload_len: usize) -> usize {
        self.header_slots()
            .saturating_add(self.width.slots_for(payload_len))
    }

    /// 长度为 `carrier_len` 的载体最多能容纳的负载字节数。
    pub fn capacity(&self, carrier_len: usize) -> usize {
        carrier_len.saturating_sub(self.header_slots()) / self.width.chunks_per_byte()
    }
}

/// 嵌入/提取过程中游标所处的阶段。只会向前推进。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FrameStage {
    AtMarker,
    AtLengthPrefix,
    AtPayload,
    Done,
}

impl FrameStage {
    /// 进入下一个阶段。`Done` 是终止状态。
    pub fn advance(self) -> Self {
        match self {
            Self::AtMarker => Self::AtLengthPrefix,
            Self::AtLengthPrefix => Self::AtPayload,
            Self::AtPayload | Self::Done => Self::Done,
        }
    }
}
