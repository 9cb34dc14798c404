//! # 错误类型模块
//!
//! 定义核心隐写逻辑 (位块编解码、帧编解码、嵌入与提取) 可能返回的所有错误。
//! 命令处理层会用 `anyhow` 为这些错误附加上下文信息。

use std::path::PathBuf;

/// 核心隐写流程中可能出现的错误。
///
/// 所有错误都是致命的：操作立即失败并同步返回给调用方，不做重试，也不会留下部分写入的结果。
#[derive(Debug, thiserror::Error)]
pub enum StegoError {
    /// 位块宽度不是 8 的约数，或缺少必需的配置项。
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// 载体太小，无法容纳模式标记、长度前缀和负载。
    #[error("not enough space in the carrier: required {required} slots, available {available}")]
    Capacity { required: usize, available: usize },

    /// 无法从外部获取载体图像或负载文件。
    #[error("unable to read source: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 长度前缀要求读取超出载体末尾的数据。
    #[error("read past the end of the carrier: required {required} slots, available {available}")]
    BoundsViolation { required: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, StegoError>;
