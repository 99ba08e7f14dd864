//! 测试用的内存版存储实现

use crate::core::fingerprint::digest_bytes;
use crate::storage::{ObjectStore, RemoteFile, RemoteReader, RemoteSource};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// 内存对象存储，记录所有调用以便断言
#[derive(Default)]
pub struct MockObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    metadata: Mutex<HashMap<String, Vec<(String, String)>>>,
    put_keys: Mutex<Vec<String>>,
    head_keys: Mutex<Vec<String>>,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
    fail_head: AtomicBool,
}

impl MockObjectStore {
    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn metadata_of(&self, key: &str) -> Option<Vec<(String, String)>> {
        self.metadata.lock().unwrap().get(key).cloned()
    }

    /// 迄今为止 put 过的键（按调用顺序）
    pub fn put_keys(&self) -> Vec<String> {
        self.put_keys.lock().unwrap().clone()
    }

    /// 迄今为止 head 过的键（按调用顺序）
    pub fn head_keys(&self) -> Vec<String> {
        self.head_keys.lock().unwrap().clone()
    }

    pub fn fail_get(&self) {
        self.fail_get.store(true, Ordering::SeqCst);
    }

    pub fn fail_put(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    pub fn fail_head(&self) {
        self.fail_head.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_get.load(Ordering::SeqCst) {
            anyhow::bail!("注入的 get 故障");
        }
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, data: Vec<u8>, metadata: &[(&str, String)]) -> Result<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            anyhow::bail!("注入的 put 故障");
        }
        self.put_keys.lock().unwrap().push(key.to_string());
        self.objects.lock().unwrap().insert(key.to_string(), data);
        self.metadata.lock().unwrap().insert(
            key.to_string(),
            metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
        Ok(())
    }

    async fn head_fingerprint(&self, key: &str) -> Result<Option<String>> {
        if self.fail_head.load(Ordering::SeqCst) {
            anyhow::bail!("注入的 head 故障");
        }
        self.head_keys.lock().unwrap().push(key.to_string());
        // 模拟 S3 单次 PUT 的 ETag：内容的 MD5
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|d| digest_bytes(d)))
    }

    fn name(&self) -> &str {
        "mock-s3"
    }
}

/// 内存远程文件源
#[derive(Default)]
pub struct MockRemoteSource {
    files: Vec<RemoteFile>,
    contents: HashMap<String, Vec<u8>>,
    opened: Mutex<Vec<String>>,
}

impl MockRemoteSource {
    pub fn with_file(mut self, path: &str, mtime: i64, content: &[u8]) -> Self {
        self.files.push(RemoteFile {
            path: path.to_string(),
            size: content.len() as u64,
            mtime,
        });
        self.contents.insert(path.to_string(), content.to_vec());
        self
    }

    /// 迄今为止打开过的文件路径（按调用顺序）
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteSource for MockRemoteSource {
    async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        Ok(self.files.clone())
    }

    async fn open(&self, path: &str) -> Result<RemoteReader> {
        self.opened.lock().unwrap().push(path.to_string());
        let content = self
            .contents
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("文件不存在: {}", path))?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn name(&self) -> &str {
        "mock-sftp"
    }
}
