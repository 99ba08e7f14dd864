use super::{RemoteFile, RemoteReader, RemoteSource, IO_TIMEOUT_SECS, OP_TIMEOUT_SECS};
use crate::config::SftpConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use opendal::{layers::TimeoutLayer, Metakey, Operator};
use std::time::Duration;
use tokio_util::compat::FuturesAsyncReadCompatExt;

pub struct SftpStorage {
    operator: Operator,
    name: String,
}

impl SftpStorage {
    pub async fn new(config: &SftpConfig) -> Result<Self> {
        use opendal::services::Sftp;

        let endpoint = format!("ssh://{}:{}", config.hostname, config.port);

        let mut builder = Sftp::default()
            .endpoint(&endpoint)
            .user(&config.username)
            // 跳过 known_hosts 严格校验（与原部署环境一致，首次连接即可用）
            .known_hosts_strategy("accept");

        if let Some(ref key) = config.key {
            builder = builder.key(key);
        }

        if let Some(ref root) = config.root {
            builder = builder.root(root);
        }

        // 添加超时层
        let operator = Operator::new(builder)?
            .layer(
                TimeoutLayer::default()
                    .with_timeout(Duration::from_secs(OP_TIMEOUT_SECS))
                    .with_io_timeout(Duration::from_secs(IO_TIMEOUT_SECS)),
            )
            .finish();

        // 提前验证连接，认证失败或不可达在同步开始前暴露
        operator
            .check()
            .await
            .with_context(|| format!("无法连接 SFTP 服务器 {}", endpoint))?;

        let name = format!(
            "sftp://{}@{}:{}{}",
            config.username,
            config.hostname,
            config.port,
            config.root.as_deref().unwrap_or("")
        );

        tracing::info!("SFTP 已连接: {}", name);

        Ok(Self { operator, name })
    }
}

#[async_trait]
impl RemoteSource for SftpStorage {
    async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        let mut files = Vec::new();

        // 使用 lister_with 进行递归列表
        let mut lister = self
            .operator
            .lister_with("")
            .recursive(true)
            .metakey(Metakey::ContentLength | Metakey::LastModified | Metakey::Mode)
            .await?;

        while let Some(entry) = lister.try_next().await? {
            let path_str = entry.path().to_string();

            // 跳过根目录
            if path_str.is_empty() || path_str == "/" {
                continue;
            }

            let meta = entry.metadata();

            // 目录只用于遍历，不向上层产出
            if meta.is_dir() {
                continue;
            }

            files.push(RemoteFile {
                path: path_str.trim_start_matches('/').to_string(),
                size: meta.content_length(),
                mtime: meta.last_modified().map_or(0, |t| t.timestamp()),
            });
        }

        Ok(files)
    }

    async fn open(&self, path: &str) -> Result<RemoteReader> {
        let meta = self.operator.stat(path).await?;
        let reader = self.operator.reader(path).await?;
        let reader = reader
            .into_futures_async_read(0..meta.content_length())
            .await?;
        Ok(Box::new(reader.compat()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
