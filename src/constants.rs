/// 长度前缀占用的字节数。
/// 负载长度以 `u64` (小端序) 存储，这是载体格式的一部分，编码端和解码端必须一致。
pub const LENGTH_PREFIX_BYTES: usize = 8;

/// 模式标记占用的载体字节数。
/// 2 位的模式值以 1 位宽度写入，因此需要 2 个载体字节。
pub const MARKER_SLOTS: usize = 2;

/// 未指定 `--bits` 时使用的位块宽度。
/// 每个载体字节存放 4 位，即每两个像素通道存放一个负载字节。
pub const DEFAULT_CHUNK_BITS: u8 = 4;

/// 隐写结果图像的默认文件名前缀。
pub const HIDDEN_IMAGE_PREFIX: &str = "doctored_";

/// 恢复出的负载文件的默认文件名前缀。
pub const RECOVERED_FILE_PREFIX: &str = "recovered_";

/// 恢复出的负载文件的默认扩展名。
pub const RECOVERED_FILE_EXTENSION: &str = "bin";
