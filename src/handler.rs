//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::bits::ChunkWidth;
use crate::carrier::CarrierImage;
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{HIDDEN_IMAGE_PREFIX, RECOVERED_FILE_EXTENSION, RECOVERED_FILE_PREFIX};
use crate::error::StegoError;
use crate::frame::FrameLayout;
use crate::steganography::{Recovered, embed, extract_frame};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责校验位块宽度、读取图像和负载文件、检查隐写空间是否足够、调用核心函数写入帧，
/// 最后把结果以 PNG 格式写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和隐写设置的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * `--bits` 不是 8 的约数。
/// * 目标文件已存在且没有指定 `--force`。
/// * 无法读取输入的图像或负载文件。
/// * 图像没有足够的空间来隐藏负载 ([`StegoError::Capacity`])。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let width = ChunkWidth::new(args.bits).context("Invalid value for --bits")?;
    let marker = !args.no_marker;

    let dest = args
        .dest
        .unwrap_or_else(|| default_path(&args.image, HIDDEN_IMAGE_PREFIX, "png"));
    ensure_writable(&dest, args.force)?;

    let mut carrier = CarrierImage::open(&args.image, args.channels).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    report_carrier(&args.image, &carrier, "Base image");

    let payload = fs::read(&args.file)
        .map_err(|source| StegoError::SourceUnavailable {
            path: args.file.clone(),
            source,
        })
        .with_context(|| {
            format!(
                "Unable to read file to hide: {}",
                args.file.to_string_lossy().red().bold()
            )
        })?;
    println!();
    println!("Target file: {}", args.file.to_string_lossy().blue());
    println!("Size: {} bytes", payload.len());

    let available = carrier.bytes().len();
    let used = embed(carrier.bytes_mut(), &payload, width, marker).with_context(|| {
        format!(
            "Not enough space in the image to hide {}. \nSlots available: {}",
            args.file.to_string_lossy().red().bold(),
            available.to_string().green().bold()
        )
    })?;
    info!(used, available, "frame written");

    carrier.save_png(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!();
    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像、确定位块宽度、调用核心函数读出负载，
/// 最后把恢复的内容写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和隐写设置的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * `--bits` 不是 8 的约数，或没有标记时未提供 `--bits`。
/// * 图像开头的标记无法读取。
/// * 目标文件已存在且没有指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像中的长度信息超出了图像数据范围。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let fixed = args
        .bits
        .map(ChunkWidth::new)
        .transpose()
        .context("Invalid value for --bits")?;
    let marker = !args.no_marker;

    let dest = args.file.unwrap_or_else(|| {
        default_path(&args.image, RECOVERED_FILE_PREFIX, RECOVERED_FILE_EXTENSION)
    });
    ensure_writable(&dest, args.force)?;

    let carrier = CarrierImage::open(&args.image, args.channels).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    report_carrier(&args.image, &carrier, "Source image");

    let Recovered { width, payload } = extract_frame(carrier.bytes(), marker, fixed)
        .with_context(|| {
            format!(
                "Failed to recover hidden data from '{}'. \nThe image may not contain a hidden file or was written with different settings.",
                args.image.to_string_lossy().red().bold()
            )
        })?;
    println!();
    println!("Chunk width: {} bit", width.to_string().blue());

    fs::write(&dest, &payload).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!();
    println!(
        "The file has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    println!("Size: {} bytes", payload.len());

    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// 报告并返回图像在给定位块宽度和标记设置下最多能隐藏的字节数。
///
/// # Errors
///
/// `--bits` 不合法或无法读取图像时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<usize> {
    let width = ChunkWidth::new(args.bits).context("Invalid value for --bits")?;
    let layout = FrameLayout::new(width, !args.no_marker);

    let carrier = CarrierImage::open(&args.image, args.channels).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    report_carrier(&args.image, &carrier, "Image");

    let capacity = layout.capacity(carrier.bytes().len());
    println!();
    println!(
        "Capacity at {} bit per channel: {} bytes",
        width,
        capacity.to_string().green().bold()
    );

    Ok(capacity)
}

fn report_carrier(path: &Path, carrier: &CarrierImage, label: &str) {
    println!("{label}: {}", path.to_string_lossy().blue());
    println!("Size: {} x {} px", carrier.width(), carrier.height());
    println!(
        "Used channels: {} / {}",
        carrier.channels().count(),
        carrier.native_channels()
    );
}

/// 在 `image` 所在目录下生成 `<prefix><图像名>.<extension>`。
fn default_path(image: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = image.file_stem().unwrap_or_default().to_string_lossy();
    image.with_file_name(format!("{prefix}{stem}.{extension}"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}
