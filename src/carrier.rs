//! # 载体图像模块
//!
//! 借助 `image` 库把图像文件读成扁平的像素通道字节序列 (载体)，
//! 并在嵌入完成后把它重新写成无损的 PNG 文件。

use crate::error::{Result, StegoError};
use clap::ValueEnum;
use image::{ColorType, ImageError, ImageFormat};
use std::io;
use std::path::Path;

/// 参与隐写的颜色通道。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Channels {
    /// 红、绿、蓝三个通道。
    #[default]
    Rgb,
    /// 红、绿、蓝加透明度通道。
    Rgba,
}

impl Channels {
    pub fn count(self) -> u8 {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }

    fn color_type(self) -> ColorType {
        match self {
            Channels::Rgb => ColorType::Rgb8,
            Channels::Rgba => ColorType::Rgba8,
        }
    }
}

/// 已解码的载体图像：尺寸信息加上 `width * height * channels` 个通道字节。
#[derive(Debug, Clone)]
pub struct CarrierImage {
    width: u32,
    height: u32,
    native_channels: u8,
    channels: Channels,
    bytes: Vec<u8>,
}

impl CarrierImage {
    /// 读取并解码图像文件，按 `channels` 转换为 8 位通道字节。
    ///
    /// # Errors
    ///
    /// 文件无法读取或无法解码时返回 [`StegoError::SourceUnavailable`]。
    pub fn open(path: &Path, channels: Channels) -> Result<Self> {
        let image = image::open(path).map_err(|err| StegoError::SourceUnavailable {
            path: path.to_path_buf(),
            source: into_io_error(err),
        })?;

        let (width, height) = (image.width(), image.height());
        let native_channels = image.color().channel_count();
        let bytes = match channels {
            Channels::Rgb => image.into_rgb8().into_raw(),
            Channels::Rgba => image.into_rgba8().into_raw(),
        };

        Ok(Self {
            width,
            height,
            native_channels,
            channels,
            bytes,
        })
    }

    /// 以 PNG 格式保存，与目标路径的扩展名无关。
    pub fn save_png(&self, path: &Path) -> image::ImageResult<()> {
        image::save_buffer_with_format(
            path,
            &self.bytes,
            self.width,
            self.height,
            self.channels.color_type(),
            ImageFormat::Png,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 原始图像文件中的通道数。
    pub fn native_channels(&self) -> u8 {
        self.native_channels
    }

    /// 参与隐写的通道。
    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

fn into_io_error(err: ImageError) -> io::Error {
    match err {
        ImageError::IoError(err) => err,
        other => io::Error::other(other),
    }
}
