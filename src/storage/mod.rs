pub mod s3;
pub mod sftp;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncRead;

pub use s3::S3ObjectStore;
pub use sftp::SftpStorage;

// ============ 公共常量 ============

/// 非 IO 操作超时（秒）- stat, list 等
pub const OP_TIMEOUT_SECS: u64 = 60;
/// IO 操作超时（秒）- read, write 等
pub const IO_TIMEOUT_SECS: u64 = 300;

/// 远程文件信息（一次列举过程中的临时对象）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// 服务器根下的路径，正斜杠分隔
    pub path: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 修改时间（Unix 秒）
    pub mtime: i64,
}

/// 远程文件内容的异步读取器
pub type RemoteReader = Box<dyn AsyncRead + Send + Unpin>;

/// 远程文件源抽象接口（SFTP 等）
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// 递归列出根目录下所有普通文件（不包含目录，顺序不保证）
    async fn list_files(&self) -> Result<Vec<RemoteFile>>;

    /// 打开文件内容读取流
    async fn open(&self, path: &str) -> Result<RemoteReader>;

    /// 获取源名称（用于日志）
    fn name(&self) -> &str;
}

/// 对象存储抽象接口（S3 等）
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 读取对象全部内容，对象不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 写入对象，附带用户元数据
    async fn put(&self, key: &str, data: Vec<u8>, metadata: &[(&str, String)]) -> Result<()>;

    /// 仅查询元数据，返回对象的内容指纹（ETag），不存在时返回 None
    async fn head_fingerprint(&self, key: &str) -> Result<Option<String>>;

    /// 获取存储名称（用于日志）
    fn name(&self) -> &str;
}
