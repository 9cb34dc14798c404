//! # 隐写核心模块
//!
//! 在内存中的载体字节序列上嵌入和提取负载。载体通常是图像的像素通道字节，
//! 但这里只把它当作一段扁平的字节序列，不关心像素几何结构。
//!
//! 嵌入和提取都按 [`FrameStage`] 的顺序推进：模式标记、长度前缀、负载，最后结束。

use crate::bits::{ChunkReader, ChunkWidth, ChunkWriter};
use crate::constants::LENGTH_PREFIX_BYTES;
use crate::error::{Result, StegoError};
use crate::frame::{
    FrameLayout, FrameStage, build_length_prefix, decode_mode_marker, parse_length_prefix,
    write_mode_marker,
};
use tracing::{debug, trace};

/// 从载体中提取出的帧内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// 嵌入时使用的位块宽度。
    pub width: ChunkWidth,
    pub payload: Vec<u8>,
}

/// 把 `payload` 写入 `carrier`，返回实际占用的载体字节数。
///
/// 写入前会完整检查容量：失败时载体不会被修改。被写入的载体字节只有低 `width` 位会改变。
///
/// # Errors
///
/// 载体容纳不下模式标记、长度前缀和负载时返回 [`StegoError::Capacity`]。
pub fn embed(carrier: &mut [u8], payload: &[u8], width: ChunkWidth, marker: bool) -> Result<usize> {
    let layout = FrameLayout::new(width, marker);
    let required = layout.required_slots(payload.len());
    if carrier.len() < required {
        return Err(StegoError::Capacity {
            required,
            available: carrier.len(),
        });
    }

    debug!(
        chunk_width = width.bits(),
        marker,
        payload_len = payload.len(),
        required,
        available = carrier.len(),
        "embedding payload"
    );

    let mut stage = FrameStage::AtMarker;
    let mut slot = 0;
    while stage != FrameStage::Done {
        trace!(?stage, slot, "frame stage");
        slot = match stage {
            FrameStage::AtMarker => {
                if marker {
                    write_mode_marker(carrier, width)?;
                }
                layout.prefix_offset()
            }
            FrameStage::AtLengthPrefix => {
                let mut writer = ChunkWriter::new(&mut *carrier, width, slot);
                writer.write_bytes(&build_length_prefix(payload.len() as u64))?;
                writer.slot()
            }
            FrameStage::AtPayload => {
                let mut writer = ChunkWriter::new(&mut *carrier, width, slot);
                writer.write_bytes(payload)?;
                writer.slot()
            }
            FrameStage::Done => slot,
        };
        stage = stage.advance();
    }

    Ok(slot)
}

/// 确定提取时使用的位块宽度：有模式标记时从载体读取，否则使用调用方给定的宽度。
///
/// # Errors
///
/// 既没有模式标记也没有给定宽度时返回 [`StegoError::Configuration`]；
/// 载体不足两个字节时返回 [`StegoError::BoundsViolation`]。
pub fn detect_width(carrier: &[u8], marker: bool, fixed: Option<ChunkWidth>) -> Result<ChunkWidth> {
    if marker {
        return decode_mode_marker(carrier);
    }

    fixed.ok_or_else(|| {
        StegoError::Configuration(
            "a chunk width is required when the carrier has no mode marker".to_string(),
        )
    })
}

/// 从 `carrier` 中读出帧，同时返回使用的位块宽度和负载。
///
/// 有模式标记时忽略 `fixed`。载体不会被修改，因此对同一载体重复提取结果相同。
///
/// # Errors
///
/// * 宽度无法确定时返回 [`StegoError::Configuration`]。
/// * 长度前缀指向载体末尾之外时返回 [`StegoError::BoundsViolation`]。
pub fn extract_frame(carrier: &[u8], marker: bool, fixed: Option<ChunkWidth>) -> Result<Recovered> {
    let mut stage = FrameStage::AtMarker;
    let mut width = ChunkWidth::ONE;
    let mut slot = 0;
    let mut payload_len = 0;
    let mut payload = Vec::new();

    while stage != FrameStage::Done {
        trace!(?stage, slot, "frame stage");
        match stage {
            FrameStage::AtMarker => {
                width = detect_width(carrier, marker, fixed)?;
                slot = FrameLayout::new(width, marker).prefix_offset();
            }
            FrameStage::AtLengthPrefix => {
                let mut reader = ChunkReader::new(carrier, width, slot);
                let prefix = parse_length_prefix(&reader.read_bytes(LENGTH_PREFIX_BYTES)?)?;
                debug!(
                    chunk_width = width.bits(),
                    marker,
                    payload_len = prefix,
                    available = carrier.len(),
                    "extracting payload"
                );

                payload_len = usize::try_from(prefix).map_err(|_| StegoError::BoundsViolation {
                    required: usize::MAX,
                    available: carrier.len(),
                })?;
                slot = reader.slot();
            }
            FrameStage::AtPayload => {
                let mut reader = ChunkReader::new(carrier, width, slot);
                payload = reader.read_bytes(payload_len)?;
                slot = reader.slot();
            }
            FrameStage::Done => {}
        }
        stage = stage.advance();
    }

    Ok(Recovered { width, payload })
}

/// 从 `carrier` 中读出之前嵌入的负载。参见 [`extract_frame`]。
///
/// # Errors
///
/// 与 [`extract_frame`] 相同。
pub fn extract(carrier: &[u8], marker: bool, fixed: Option<ChunkWidth>) -> Result<Vec<u8>> {
    extract_frame(carrier, marker, fixed).map(|recovered| recovered.payload)
}
