//! # 位块编解码模块
//!
//! 把字节缓冲区拆分成固定宽度 (1、2、4 或 8 位) 的位块，或把位块重新拼回字节。
//! 每个位块写入一个载体字节的低位，载体字节的其余高位保持不变。
//!
//! 游标状态由调用方显式持有 ([`BitCursor`])，或封装在调用方拥有的
//! [`ChunkWriter`] / [`ChunkReader`] 中，因此互相独立的编解码操作不会互相干扰。

use crate::error::{Result, StegoError};
use std::fmt;

/// 每个载体字节中用于存放负载数据的低位数量。
///
/// 取值只能是 8 的约数：1、2、4 或 8。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkWidth(u8);

impl ChunkWidth {
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const FOUR: Self = Self(4);
    pub const EIGHT: Self = Self(8);

    /// 所有合法的位块宽度，从小到大排列。
    pub const ALL: [Self; 4] = [Self::ONE, Self::TWO, Self::FOUR, Self::EIGHT];

    /// 校验并构造一个位块宽度。
    ///
    /// # Errors
    ///
    /// 如果 `bits` 不是 8 的约数，返回 [`StegoError::Configuration`]。
    pub fn new(bits: u8) -> Result<Self> {
        if bits == 0 || bits > 8 || 8 % bits != 0 {
            return Err(StegoError::Configuration(format!(
                "chunk width must be a divisor of 8, but found {bits}"
            )));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// 覆盖低 `bits` 位的掩码，例如宽度 4 对应 `0b0000_1111`。
    pub fn mask(self) -> u8 {
        ((1u16 << self.0) - 1) as u8
    }

    /// 表示一个完整字节所需的载体字节数。
    pub fn chunks_per_byte(self) -> usize {
        8 / self.0 as usize
    }

    /// 存放 `byte_count` 个字节所需的载体字节数。溢出时饱和到 `usize::MAX`。
    pub fn slots_for(self, byte_count: usize) -> usize {
        byte_count.saturating_mul(self.chunks_per_byte())
    }
}

impl TryFrom<u8> for ChunkWidth {
    type Error = StegoError;

    fn try_from(bits: u8) -> Result<Self> {
        Self::new(bits)
    }
}

impl fmt::Display for ChunkWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 字节缓冲区中的位置：字节下标加上字节内的位偏移 (从最高位开始计数)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitCursor {
    pub byte: usize,
    pub bit: u8,
}

impl BitCursor {
    /// 前进 `width` 位，到达 8 时进入下一个字节。
    pub fn advance(self, width: ChunkWidth) -> Self {
        let bit = self.bit.saturating_add(width.bits());
        if bit >= 8 {
            Self {
                byte: self.byte.saturating_add(1),
                bit: 0,
            }
        } else {
            Self {
                byte: self.byte,
                bit,
            }
        }
    }

    /// 当前位块在字节内需要右移 (或左移) 的位数。
    ///
    /// # Errors
    ///
    /// 位偏移不小于 8 或没有按 `width` 对齐时返回 [`StegoError::Configuration`]。
    fn shift(self, width: ChunkWidth) -> Result<u8> {
        if self.bit >= 8 || self.bit % width.bits() != 0 {
            return Err(StegoError::Configuration(format!(
                "bit offset {} is not aligned to chunk width {width}",
                self.bit
            )));
        }
        Ok(8 - self.bit - width.bits())
    }
}

/// 从 `source` 的 `cursor` 位置取出下一个位块 (高位优先)，并返回前进后的游标。
///
/// # Errors
///
/// * 游标的位偏移没有按 `width` 对齐时返回 [`StegoError::Configuration`]。
/// * 游标已越过 `source` 的末尾时返回 [`StegoError::BoundsViolation`]。
pub fn pack(source: &[u8], width: ChunkWidth, cursor: BitCursor) -> Result<(u8, BitCursor)> {
    let shift = cursor.shift(width)?;
    let byte = *source
        .get(cursor.byte)
        .ok_or(StegoError::BoundsViolation {
            required: cursor.byte.saturating_add(1),
            available: source.len(),
        })?;

    Ok(((byte >> shift) & width.mask(), cursor.advance(width)))
}

/// [`pack`] 的逆操作：把位块按高位优先的顺序合并进 `destination` 的 `cursor` 位置。
///
/// # Errors
///
/// * 游标的位偏移没有按 `width` 对齐时返回 [`StegoError::Configuration`]。
/// * 游标已越过 `destination` 的末尾时返回 [`StegoError::BoundsViolation`]。
pub fn unpack(
    destination: &mut [u8],
    width: ChunkWidth,
    chunk: u8,
    cursor: BitCursor,
) -> Result<BitCursor> {
    let shift = cursor.shift(width)?;
    let available = destination.len();
    let byte = destination
        .get_mut(cursor.byte)
        .ok_or(StegoError::BoundsViolation {
            required: cursor.byte.saturating_add(1),
            available,
        })?;

    *byte |= (chunk & width.mask()) << shift;
    Ok(cursor.advance(width))
}

/// 清除 `destination` 的低 `width` 位并写入 `chunk`，高位原样保留。
pub fn write_chunk(destination: u8, width: ChunkWidth, chunk: u8) -> u8 {
    (destination & !width.mask()) | (chunk & width.mask())
}

/// 返回 `source` 的低 `width` 位。
pub fn read_chunk(source: u8, width: ChunkWidth) -> u8 {
    source & width.mask()
}

/// 顺序地把字节写入载体，每个载体字节存放一个位块。
#[derive(Debug)]
pub struct ChunkWriter<'a> {
    carrier: &'a mut [u8],
    width: ChunkWidth,
    slot: usize,
}

impl<'a> ChunkWriter<'a> {
    pub fn new(carrier: &'a mut [u8], width: ChunkWidth, start: usize) -> Self {
        Self {
            carrier,
            width,
            slot: start,
        }
    }

    /// 下一个将被写入的载体字节下标。
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// 写入 `bytes` 的全部内容。
    ///
    /// 写入前先检查剩余空间，空间不足时不修改载体。
    ///
    /// # Errors
    ///
    /// 剩余载体字节不足时返回 [`StegoError::Capacity`]。
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let required = self.slot.saturating_add(self.width.slots_for(bytes.len()));
        if required > self.carrier.len() {
            return Err(StegoError::Capacity {
                required,
                available: self.carrier.len(),
            });
        }

        let mut cursor = BitCursor::default();
        while cursor.byte < bytes.len() {
            let (chunk, next) = pack(bytes, self.width, cursor)?;
            let slot = &mut self.carrier[self.slot];
            *slot = write_chunk(*slot, self.width, chunk);
            self.slot += 1;
            cursor = next;
        }

        Ok(())
    }
}

/// 顺序地从载体中读出字节，每个载体字节贡献一个位块。
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    carrier: &'a [u8],
    width: ChunkWidth,
    slot: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(carrier: &'a [u8], width: ChunkWidth, start: usize) -> Self {
        Self {
            carrier,
            width,
            slot: start,
        }
    }

    /// 下一个将被读取的载体字节下标。
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// 读出 `count` 个字节。
    ///
    /// # Errors
    ///
    /// 如果读取会越过载体末尾，返回 [`StegoError::BoundsViolation`]，且不分配输出缓冲区。
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let required = self.slot.saturating_add(self.width.slots_for(count));
        if required > self.carrier.len() {
            return Err(StegoError::BoundsViolation {
                required,
                available: self.carrier.len(),
            });
        }

        let mut bytes = vec![0u8; count];
        let mut cursor = BitCursor::default();
        while cursor.byte < count {
            let chunk = read_chunk(self.carrier[self.slot], self.width);
            cursor = unpack(&mut bytes, self.width, chunk, cursor)?;
            self.slot += 1;
        }

        Ok(bytes)
    }
}
