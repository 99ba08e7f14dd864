//! 内容指纹 - 流式 MD5 摘要，与 S3 单次 PUT 的 ETag 可比

use anyhow::Result;
use md5::{Digest, Md5};
use tokio::io::{AsyncRead, AsyncReadExt};

/// 摘要读取块大小
pub const DIGEST_CHUNK_SIZE: usize = 10 * 1024;

/// 以固定块大小流式读取并计算 MD5，返回十六进制字符串
///
/// 不把整个文件载入内存；读取器被消费到末尾。
pub async fn digest_reader(reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String> {
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; DIGEST_CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// 计算一段内存数据的 MD5 十六进制字符串
pub fn digest_bytes(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
