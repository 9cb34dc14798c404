//! # chunk_hide 库
//!
//! 本库包含低位替换隐写工具的核心逻辑：位块编解码、自描述帧格式、
//! 负载的嵌入与提取，以及命令行外壳所需的图像读写和命令处理。

// 声明库包含的所有模块。

pub mod bits;
pub mod carrier;
pub mod cli;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handler;
pub mod logging;
pub mod steganography;

pub use bits::ChunkWidth;
pub use error::StegoError;
pub use steganography::{embed, extract};
