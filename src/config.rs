//! 应用配置模块 - YAML 配置文件 + 环境变量覆盖

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 环境变量前缀，沿用原部署约定
const ENV_PREFIX: &str = "S3_SFTP_SYNC__";

fn default_port() -> u16 {
    22
}

/// SFTP 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SftpConfig {
    #[serde(default)]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    /// 私钥文件路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// 远程根目录，缺省为登录目录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

impl Default for SftpConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            port: default_port(),
            username: String::new(),
            key: None,
            root: None,
        }
    }
}

/// S3 连接配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// 对象键前缀（命名空间），允许为空
    #[serde(default)]
    pub key_prefix: String,
}

/// 增量同步配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncrementalSyncConfig {
    /// 高水位标记所在的对象键；不配置则每次全量扫描
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_s3_key: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sftp: SftpConfig,
    #[serde(default)]
    pub s3: S3Config,
    #[serde(default)]
    pub incremental_sync: IncrementalSyncConfig,
}

impl AppConfig {
    /// 从配置文件加载，并应用环境变量覆盖
    pub fn load(config_file: &Path) -> Result<Self, SyncError> {
        if !config_file.exists() {
            return Err(SyncError::Config(format!(
                "配置文件不存在: {}",
                config_file.display()
            )));
        }

        tracing::info!("加载配置文件: {}", config_file.display());

        let content = fs::read_to_string(config_file)
            .map_err(|e| SyncError::Config(format!("读取配置文件失败: {}", e)))?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// 解析 YAML 配置
    pub fn from_yaml(content: &str) -> Result<Self, SyncError> {
        serde_yaml::from_str(content)
            .map_err(|e| SyncError::Config(format!("配置文件解析失败: {}", e)))
    }

    /// 应用环境变量覆盖（环境变量优先于配置文件）
    ///
    /// 查找函数作为参数注入，便于测试覆盖优先级。
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        let get = |suffix: &str| get(&format!("{}{}", ENV_PREFIX, suffix));

        if let Some(v) = get("SFTP_HOSTNAME") {
            self.sftp.hostname = v;
        }
        if let Some(v) = get("SFTP_PORT").and_then(|v| v.parse().ok()) {
            self.sftp.port = v;
        }
        if let Some(v) = get("SFTP_USERNAME") {
            self.sftp.username = v;
        }
        if let Some(v) = get("SFTP_KEY") {
            self.sftp.key = Some(v);
        }
        if let Some(v) = get("SFTP_ROOT") {
            self.sftp.root = Some(v);
        }
        if let Some(v) = get("S3_BUCKET") {
            self.s3.bucket = v;
        }
        if let Some(v) = get("S3_REGION") {
            self.s3.region = v;
        }
        if let Some(v) = get("AWS_ACCESS_KEY_ID") {
            self.s3.access_key_id = v;
        }
        if let Some(v) = get("AWS_SECRET_ACCESS_KEY") {
            self.s3.secret_access_key = v;
        }
        if let Some(v) = get("S3_ENDPOINT_URL") {
            self.s3.endpoint_url = Some(v);
        }
        if let Some(v) = get("S3_KEY_PREFIX") {
            self.s3.key_prefix = v;
        }
        if let Some(v) = get("SFTP_LAST_MODIFIED_S3_KEY") {
            self.incremental_sync.last_modified_s3_key = Some(v);
        }
    }

    /// 校验必填项，缺失时在任何连接建立前报错
    pub fn validate(&self) -> Result<(), SyncError> {
        let mut missing = Vec::new();

        if self.sftp.hostname.is_empty() {
            missing.push("sftp.hostname");
        }
        if self.sftp.username.is_empty() {
            missing.push("sftp.username");
        }
        if self.s3.bucket.is_empty() {
            missing.push("s3.bucket");
        }
        if self.s3.region.is_empty() {
            missing.push("s3.region");
        }
        if self.s3.access_key_id.is_empty() {
            missing.push("s3.access_key_id");
        }
        if self.s3.secret_access_key.is_empty() {
            missing.push("s3.secret_access_key");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Config(format!(
                "缺少必填配置项: {}",
                missing.join(", ")
            )))
        }
    }
}
