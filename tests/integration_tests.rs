use chunk_hide::{
    StegoError,
    carrier::Channels,
    cli::{CapacityArgs, HideArgs, RecoverArgs},
    handler::{handle_capacity, handle_hide, handle_recover},
};
use image::{ImageBuffer, Rgba};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 4) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(4))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], 255]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 一个辅助函数，用于生成随机的二进制负载
fn random_payload(len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rand::rng().fill_bytes(&mut payload);
    payload
}

fn hide_args(image: &Path, file: &Path, dest: Option<&Path>) -> HideArgs {
    HideArgs {
        image: image.to_path_buf(),
        file: file.to_path_buf(),
        dest: dest.map(Path::to_path_buf),
        bits: 4,
        no_marker: false,
        channels: Channels::Rgb,
        force: false,
    }
}

fn recover_args(image: &Path, file: Option<&Path>) -> RecoverArgs {
    RecoverArgs {
        image: image.to_path_buf(),
        file: file.map(Path::to_path_buf),
        bits: None,
        no_marker: false,
        channels: Channels::Rgb,
        force: false,
    }
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let hidden_image_path = dir.path().join("hidden.png");
    let source_file_path = dir.path().join("source.bin");
    let recovered_file_path = dir.path().join("recovered.bin");

    create_test_image(&original_image_path, 100, 100);
    let original_payload = random_payload(3000);
    fs::write(&source_file_path, &original_payload)?;

    // 2. 测试 handle_hide
    handle_hide(hide_args(
        &original_image_path,
        &source_file_path,
        Some(&hidden_image_path),
    ))?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 3. 测试 handle_recover
    handle_recover(recover_args(&hidden_image_path, Some(&recovered_file_path)))?;
    assert!(
        recovered_file_path.exists(),
        "Recovered file should be created."
    );

    // 4. 验证结果
    let recovered_payload = fs::read(&recovered_file_path)?;
    assert_eq!(
        original_payload, recovered_payload,
        "Recovered file must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let source_file_path = dir.path().join("source.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "Testing default path generation. 测试默认路径生成。";
    fs::write(&source_file_path, original_text)?;

    // 2. 测试 handle_hide，不提供 dest 路径
    handle_hide(hide_args(&original_image_path, &source_file_path, None))?;

    // 验证默认的隐藏图像文件是否已创建
    let expected_hidden_path = dir.path().join("doctored_original.png");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    // 3. 测试 handle_recover，不提供输出路径
    handle_recover(recover_args(&expected_hidden_path, None))?;

    // 验证默认的恢复文件是否已创建
    let expected_recovered_path = dir.path().join("recovered_doctored_original.bin");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered file should be created at: {:?}",
        expected_recovered_path
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&expected_recovered_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text from default file must match the original."
    );

    Ok(())
}

/// 验证每种位块宽度在没有模式标记、使用 RGBA 通道时都能完整往返
#[test]
fn test_every_width_without_marker() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.png");
    let source_path = dir.path().join("payload.bin");
    create_test_image(&image_path, 64, 64);

    let payload = random_payload(500);
    fs::write(&source_path, &payload)?;

    for bits in [1u8, 2, 4, 8] {
        let hidden_path = dir.path().join(format!("hidden_{bits}.png"));
        let recovered_path = dir.path().join(format!("recovered_{bits}.bin"));

        handle_hide(HideArgs {
            bits,
            no_marker: true,
            channels: Channels::Rgba,
            ..hide_args(&image_path, &source_path, Some(&hidden_path))
        })?;
        handle_recover(RecoverArgs {
            bits: Some(bits),
            no_marker: true,
            channels: Channels::Rgba,
            ..recover_args(&hidden_path, Some(&recovered_path))
        })?;

        assert_eq!(fs::read(&recovered_path)?, payload, "width {bits}");
    }

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let file_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 50, 50);
    fs::write(&file_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    // 先创建一个同名的目标文件，模拟“文件已存在”的场景
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    // 执行并断言操作会失败
    let result = handle_hide(hide_args(&image_path, &file_path, Some(&dest_path)));
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let result = handle_hide(HideArgs {
        force: true,
        ..hide_args(&image_path, &file_path, Some(&dest_path))
    });
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    // 验证文件确实被覆盖（内容不再是 "this is a dummy file..."）
    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.png");
    let file_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.png");

    // 创建一个非常小的图片
    create_test_image(&image_path, 10, 10);
    // 创建一个非常大的文件
    fs::write(&file_path, "a".repeat(5000))?;

    // 2. 执行并断言错误
    let err = handle_hide(hide_args(&image_path, &file_path, Some(&dest_path)))
        .expect_err("a 10x10 image cannot hold 5000 bytes");

    // 10 x 10 x 3 = 300 个通道字节；需要 2 + 16 + 5000 * 2 个
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::Capacity {
            required: 10018,
            available: 300
        })
    ));
    assert!(err.to_string().contains("Not enough space"));
    assert!(!dest_path.exists(), "No output should be written on failure.");

    Ok(())
}

/// 验证非法的位块宽度在任何文件 I/O 之前就被拒绝
#[test]
fn test_invalid_bits_is_rejected_before_io() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let dest_path = dir.path().join("dest.png");

    // 输入文件并不存在：如果先做 I/O，错误会是 SourceUnavailable
    let result = handle_hide(HideArgs {
        bits: 3,
        ..hide_args(
            &dir.path().join("missing.png"),
            &dir.path().join("missing.bin"),
            Some(&dest_path),
        )
    });

    let err = result.expect_err("bits = 3 must be rejected");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::Configuration(_))
    ));
    assert!(!dest_path.exists());

    Ok(())
}

/// 验证缺失的输入文件被报告为无法读取的来源
#[test]
fn test_missing_payload_is_source_unavailable() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    create_test_image(&image_path, 20, 20);

    let result = handle_hide(hide_args(
        &image_path,
        &dir.path().join("missing.bin"),
        Some(&dir.path().join("dest.png")),
    ));

    let err = result.expect_err("missing payload must fail");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::SourceUnavailable { .. })
    ));

    Ok(())
}

/// 验证从不含隐藏数据的图像中恢复时报告越界，而不是输出垃圾数据
#[test]
fn test_recover_from_plain_image_fails() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("white.png");
    let recovered_path = dir.path().join("out.bin");

    // 全白像素：模式标记读作 8 位宽度，长度前缀读作 u64::MAX
    ImageBuffer::from_pixel(16, 16, Rgba([255u8, 255, 255, 255])).save(&image_path)?;

    let err = handle_recover(recover_args(&image_path, Some(&recovered_path)))
        .expect_err("plain image has no valid frame");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::BoundsViolation { .. })
    ));
    assert!(!recovered_path.exists());

    Ok(())
}

/// 验证容量查询命令
#[test]
fn test_handle_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    create_test_image(&image_path, 30, 30);

    // 30 x 30 x 3 = 2700 个通道字节，标记 2 个，长度前缀 8 x 4 = 32 个
    let capacity = handle_capacity(CapacityArgs {
        image: image_path.clone(),
        bits: 2,
        no_marker: false,
        channels: Channels::Rgb,
    })?;
    assert_eq!(capacity, (2700 - 34) / 4);

    // 无标记、RGBA、8 位：3600 - 8
    let capacity = handle_capacity(CapacityArgs {
        image: image_path.clone(),
        bits: 8,
        no_marker: true,
        channels: Channels::Rgba,
    })?;
    assert_eq!(capacity, 3592);

    // 容量恰好用满时隐藏成功
    let file_path = dir.path().join("exact.bin");
    fs::write(&file_path, random_payload(capacity))?;
    handle_hide(HideArgs {
        bits: 8,
        no_marker: true,
        channels: Channels::Rgba,
        ..hide_args(&image_path, &file_path, Some(&dir.path().join("full.png")))
    })?;

    Ok(())
}
