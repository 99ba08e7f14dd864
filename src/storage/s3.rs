use super::ObjectStore;
use crate::config::S3Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    name: String,
}

impl S3ObjectStore {
    pub async fn new(config: &S3Config) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "sftp2s3",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(ref endpoint) = config.endpoint_url {
            // 自建 S3 兼容存储（MinIO 等）通常要求 path-style 寻址
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        // 提前验证 bucket 可达，避免同步中途才发现配置问题
        client
            .head_bucket()
            .bucket(&config.bucket)
            .send()
            .await
            .with_context(|| format!("无法访问 S3 bucket {}", config.bucket))?;

        let name = format!("s3://{}", config.bucket);

        tracing::info!("S3 已连接: {}", name);

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            name,
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(resp) => {
                let data = resp
                    .body
                    .collect()
                    .await
                    .with_context(|| format!("读取对象内容失败: {}", key))?;
                Ok(Some(data.into_bytes().to_vec()))
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(anyhow::Error::new(service_error)
                        .context(format!("获取对象失败: {}", key)))
                }
            }
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>, metadata: &[(&str, String)]) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data));

        for (k, v) in metadata {
            request = request.metadata(*k, v.clone());
        }

        request
            .send()
            .await
            .with_context(|| format!("写入对象失败: {}", key))?;

        Ok(())
    }

    async fn head_fingerprint(&self, key: &str) -> Result<Option<String>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(resp) => Ok(resp
                .e_tag()
                .map(|s| s.trim_matches('"').trim_matches('\'').to_string())),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(None)
                } else {
                    Err(anyhow::Error::new(service_error)
                        .context(format!("查询对象元数据失败: {}", key)))
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
