//! 同步决策引擎 - 对每个远程文件判定"跳过"还是"上传"，并维护高水位标记

use crate::core::fingerprint;
use crate::core::marker::MarkerStore;
use crate::error::SyncError;
use crate::storage::{ObjectStore, RemoteFile, RemoteSource};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// 同步选项
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// 对象键前缀（bucket 内的命名空间），允许为空
    pub key_prefix: String,
    /// 高水位标记的对象键；不配置则关闭增量模式，每次全量扫描
    pub marker_key: Option<String>,
}

/// 同步报告（单次运行的临时聚合，打印后即丢弃）
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// 远程列举到的文件总数
    pub files_listed: u64,
    /// 实际上传的文件数
    pub files_uploaded: u64,
    /// 边界指纹比对后跳过的文件数
    pub files_skipped: u64,
    /// 上传的累计字节数（取列举时的文件大小，不在传输后复测）
    pub bytes_uploaded: u64,
    /// 本次计算出的高水位标记
    pub last_modified: Option<i64>,
    /// 运行耗时（毫秒）
    pub duration_ms: u64,
}

/// 同步引擎
///
/// 严格顺序处理：一个远程连接、一个对象存储客户端、逐个文件。
/// 任何一次失败立即中止整个运行，标记停留在上次确认的值，
/// 下次运行会安全地重做同一窗口的工作。
pub struct SyncEngine {
    key_prefix: String,
    marker: MarkerStore,
}

impl SyncEngine {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            marker: MarkerStore::new(options.marker_key),
            key_prefix: options.key_prefix,
        }
    }

    /// 执行一次同步运行
    pub async fn run(
        &self,
        remote: &dyn RemoteSource,
        store: &dyn ObjectStore,
    ) -> Result<SyncReport, SyncError> {
        let started = Instant::now();

        info!("开始同步: {} -> {}", remote.name(), store.name());

        let start_time = self.marker.load(store).await?;
        let mut last_modified = start_time;

        let files = remote
            .list_files()
            .await
            .map_err(|e| SyncError::Transfer(format!("列举远程文件失败: {:#}", e)))?;

        info!("远程列举完成，共 {} 个文件", files.len());

        let mut files_uploaded = 0u64;
        let mut files_skipped = 0u64;
        let mut bytes_uploaded = 0u64;

        for file in &files {
            if should_sync(file.mtime, start_time) {
                let key = derive_key(&self.key_prefix, &file.path);

                if self.needs_upload(remote, store, file, &key, start_time).await? {
                    self.upload(remote, store, file, &key).await?;
                    files_uploaded += 1;
                    bytes_uploaded += file.size;
                } else {
                    info!("{}: 内容未变化，跳过", file.path);
                    files_skipped += 1;
                }
            } else {
                debug!("{}: 修改时间早于高水位，视为已同步", file.path);
            }

            // 高水位在所有文件上取最大值，与是否上传无关
            if last_modified.map_or(true, |lm| file.mtime > lm) {
                last_modified = Some(file.mtime);
            }
        }

        // 仅当标记机制开启且值发生变化时才写入，空跑不产生无谓的 PUT
        if self.marker.is_enabled() && last_modified != start_time {
            if let Some(value) = last_modified {
                self.marker.save(store, value).await?;
            }
        }

        let report = SyncReport {
            files_listed: files.len() as u64,
            files_uploaded,
            files_skipped,
            bytes_uploaded,
            last_modified,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "同步完成: {} 个文件上传, 共 {} 字节",
            report.files_uploaded, report.bytes_uploaded
        );

        Ok(report)
    }

    /// 上传判定，仅对通过选择过滤的文件调用
    ///
    /// mtime 严格大于高水位（或无高水位）时无条件上传；
    /// mtime 恰好等于高水位是边界情况——标记的秒级粒度无法区分
    /// "上次已同步到这一秒"与"同一秒内又被修改"，需要指纹消歧。
    async fn needs_upload(
        &self,
        remote: &dyn RemoteSource,
        store: &dyn ObjectStore,
        file: &RemoteFile,
        key: &str,
        start_time: Option<i64>,
    ) -> Result<bool, SyncError> {
        if Some(file.mtime) != start_time {
            return Ok(true);
        }

        let stored = store
            .head_fingerprint(key)
            .await
            .map_err(|e| SyncError::MetadataProbe(format!("{}: {:#}", key, e)))?;

        // 从未上传过，直接上传
        let Some(stored) = stored else {
            return Ok(true);
        };

        let mut reader = remote
            .open(&file.path)
            .await
            .map_err(|e| SyncError::Transfer(format!("打开远程文件 {}: {:#}", file.path, e)))?;

        let digest = fingerprint::digest_reader(&mut reader)
            .await
            .map_err(|e| SyncError::Transfer(format!("计算指纹 {}: {:#}", file.path, e)))?;

        debug!(
            "{}: 边界指纹比对 远程={} 已存={}",
            file.path, digest, stored
        );

        Ok(digest != stored)
    }

    /// 上传文件全部内容，并附带审计元数据
    async fn upload(
        &self,
        remote: &dyn RemoteSource,
        store: &dyn ObjectStore,
        file: &RemoteFile,
        key: &str,
    ) -> Result<(), SyncError> {
        info!("上传 {} ...", key);

        let mut reader = remote
            .open(&file.path)
            .await
            .map_err(|e| SyncError::Transfer(format!("打开远程文件 {}: {:#}", file.path, e)))?;

        let mut data = Vec::with_capacity(file.size as usize);
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut data)
            .await
            .map_err(|e| SyncError::Transfer(format!("读取远程文件 {}: {}", file.path, e)))?;

        let metadata = [
            ("sftp_mtime", file.mtime.to_string()),
            (
                "sftp_sync_time",
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];

        store
            .put(key, data, &metadata)
            .await
            .map_err(|e| SyncError::Transfer(format!("上传 {}: {:#}", key, e)))
    }
}

/// 选择过滤：修改时间早于上次高水位的文件视为已同步，完全不再检查
pub fn should_sync(mtime: i64, start_time: Option<i64>) -> bool {
    start_time.map_or(true, |st| mtime >= st)
}

/// 目标键推导：规范化远程路径后拼接配置的前缀
pub fn derive_key(prefix: &str, path: &str) -> String {
    format!("{}{}", prefix, normalize_path(path))
}

/// 路径规范化：去除多余分隔符、`.` 分段与前导斜杠，解析 `..`
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }

    parts.join("/")
}
