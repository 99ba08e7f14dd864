//! 高水位标记存储 - 以对象存储中单个对象保存上次同步到的修改时间

use crate::error::SyncError;
use crate::storage::ObjectStore;

/// 高水位标记存储
///
/// 标记以 ASCII 十进制形式保存在约定的对象键下。
/// 未配置标记键时增量模式整体关闭，每次运行都是全量扫描。
pub struct MarkerStore {
    key: Option<String>,
}

impl MarkerStore {
    pub fn new(key: Option<String>) -> Self {
        // 空字符串视同未配置
        let key = key.filter(|k| !k.is_empty());
        Self { key }
    }

    /// 是否配置了标记机制
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// 读取标记
    ///
    /// 对象不存在是合法的缺席（首次运行）；存在但无法解析、
    /// 或读取因 NotFound 以外的原因失败，都中止本次运行——
    /// 损坏的标记绝不能静默退化成全量重传。
    pub async fn load(&self, store: &dyn ObjectStore) -> Result<Option<i64>, SyncError> {
        let Some(ref key) = self.key else {
            return Ok(None);
        };

        let data = store
            .get(key)
            .await
            .map_err(|e| SyncError::MarkerRead(format!("{}: {:#}", key, e)))?;

        let Some(data) = data else {
            tracing::warn!("同步标记不存在，本次执行全量同步: {}", key);
            return Ok(None);
        };

        let text = String::from_utf8(data)
            .map_err(|_| SyncError::MarkerRead(format!("{}: 标记内容不是合法文本", key)))?;

        let value: i64 = text.trim().parse().map_err(|_| {
            SyncError::MarkerRead(format!("{}: 标记内容不是合法整数: {:?}", key, text))
        })?;

        tracing::info!("增量同步模式，起始时间 {}", value);
        Ok(Some(value))
    }

    /// 写入标记（单次 PUT 整体覆盖）
    pub async fn save(&self, store: &dyn ObjectStore, value: i64) -> Result<(), SyncError> {
        let Some(ref key) = self.key else {
            return Ok(());
        };

        tracing::info!("更新同步标记为 {}", value);

        store
            .put(key, value.to_string().into_bytes(), &[])
            .await
            .map_err(|e| SyncError::Transfer(format!("写入同步标记 {}: {:#}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::MockObjectStore;

    #[tokio::test]
    async fn test_load_without_key_is_always_absent() {
        let store = MockObjectStore::default();
        store.insert("marker", b"12345".to_vec());

        let marker = MarkerStore::new(None);
        assert!(!marker.is_enabled());
        assert_eq!(marker.load(&store).await.unwrap(), None);

        // 空字符串键同样关闭增量模式
        let marker = MarkerStore::new(Some(String::new()));
        assert!(!marker.is_enabled());
        assert_eq!(marker.load(&store).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_missing_object_is_absent() {
        let store = MockObjectStore::default();
        let marker = MarkerStore::new(Some("marker".to_string()));

        assert_eq!(marker.load(&store).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_parses_decimal() {
        let store = MockObjectStore::default();
        store.insert("marker", b"1700000000".to_vec());

        let marker = MarkerStore::new(Some("marker".to_string()));
        assert_eq!(marker.load(&store).await.unwrap(), Some(1700000000));
    }

    #[tokio::test]
    async fn test_load_corrupt_marker_aborts() {
        let store = MockObjectStore::default();
        store.insert("marker", b"not-a-number".to_vec());

        let marker = MarkerStore::new(Some("marker".to_string()));
        let err = marker.load(&store).await.unwrap_err();
        assert!(matches!(err, SyncError::MarkerRead(_)));
    }

    #[tokio::test]
    async fn test_load_failure_aborts() {
        let store = MockObjectStore::default();
        store.fail_get();

        let marker = MarkerStore::new(Some("marker".to_string()));
        let err = marker.load(&store).await.unwrap_err();
        assert!(matches!(err, SyncError::MarkerRead(_)));
    }

    #[tokio::test]
    async fn test_save_roundtrip() {
        let store = MockObjectStore::default();
        let marker = MarkerStore::new(Some("marker".to_string()));

        marker.save(&store, 1700000123).await.unwrap();
        assert_eq!(marker.load(&store).await.unwrap(), Some(1700000123));
    }
}
