//! 错误类型 - 每种错误都会中止整个同步运行

use thiserror::Error;

/// 同步运行的致命错误
///
/// 核心不做任何重试：任何一种错误都立即中止本次运行，
/// 并保证高水位标记停留在上一次确认的值上。
#[derive(Debug, Error)]
pub enum SyncError {
    /// 配置缺失或不合法
    #[error("配置错误: {0}")]
    Config(String),

    /// SFTP 或 S3 端点不可达 / 认证被拒绝
    #[error("连接失败: {0}")]
    Connection(String),

    /// 同步标记存在但无法读取或解析（损坏的标记不能静默触发全量重传）
    #[error("读取同步标记失败: {0}")]
    MarkerRead(String),

    /// head-object 探测因 NotFound 以外的原因失败
    #[error("查询对象元数据失败: {0}")]
    MetadataProbe(String),

    /// 读取远程内容或写入对象存储失败
    #[error("传输失败: {0}")]
    Transfer(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
