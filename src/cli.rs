//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::carrier::Channels;
use crate::constants::DEFAULT_CHUNK_BITS;
use crate::logging::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// 一款基于低位替换的隐写工具，可以把任意文件藏进无损格式图像 (如 PNG, BMP) 的像素中。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于低位替换的隐写工具，可以把任意文件藏进无损格式图像 (如 PNG, BMP) 的像素通道低位中，并在之后原样恢复。"
)]
pub struct Cli {
    /// 写到标准错误的最低日志级别。
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 把文件隐藏到图像中。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 查看图像在给定设置下最多能隐藏多少字节。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径。
    #[arg(short, long)]
    pub file: PathBuf,

    /// 结果图像的输出路径，默认为输入图像旁的 `doctored_<名称>.png`。结果总是以 PNG 格式保存。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 每个通道字节使用的低位数量 (1, 2, 4 或 8)。
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_BITS)]
    pub bits: u8,

    /// 不在图像开头写入位块宽度标记；恢复时必须用 `--bits` 指定相同的宽度。
    #[arg(long)]
    pub no_marker: bool,

    /// 参与隐写的颜色通道。
    #[arg(short, long, value_enum, default_value_t = Channels::Rgb)]
    pub channels: Channels,

    /// 覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文件的图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复出的文件的输出路径，默认为图像旁的 `recovered_<名称>.bin`。
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// 隐藏时使用的位块宽度；仅在 `--no-marker` 时需要。
    #[arg(short, long)]
    pub bits: Option<u8>,

    /// 图像开头没有位块宽度标记。
    #[arg(long, requires = "bits")]
    pub no_marker: bool,

    /// 隐藏时使用的颜色通道。
    #[arg(short, long, value_enum, default_value_t = Channels::Rgb)]
    pub channels: Channels,

    /// 覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要查看的图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 每个通道字节使用的低位数量 (1, 2, 4 或 8)。
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_BITS)]
    pub bits: u8,

    /// 不预留位块宽度标记。
    #[arg(long)]
    pub no_marker: bool,

    /// 参与隐写的颜色通道。
    #[arg(short, long, value_enum, default_value_t = Channels::Rgb)]
    pub channels: Channels,
}
