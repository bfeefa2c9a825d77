//! 讲义缓存 - 业务能力层
//!
//! 单槽缓存：最多保留一份讲义，最后一次写入的结果会被之后每次 get() 返回，
//! 直到显式 clear()。查找时不区分主题。

use futures::future::{BoxFuture, FutureExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::models::CachedLecture;

/// 单槽讲义缓存
pub trait LectureCache: Send + Sync {
    /// 读取缓存槽，无内容或内容不可用时返回 None
    fn get(&self) -> BoxFuture<'_, Option<CachedLecture>>;

    /// 覆盖写入缓存槽
    fn set<'a>(&'a self, entry: &'a CachedLecture) -> BoxFuture<'a, Result<(), CacheError>>;

    /// 清空缓存槽
    fn clear(&self) -> BoxFuture<'_, Result<(), CacheError>>;
}

/// 进程内缓存
#[derive(Default)]
pub struct MemoryCache {
    slot: Mutex<Option<CachedLecture>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条缓存
    pub fn with_entry(entry: CachedLecture) -> Self {
        Self {
            slot: Mutex::new(Some(entry)),
        }
    }

    /// 同步读取当前内容
    pub fn snapshot(&self) -> Option<CachedLecture> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl LectureCache for MemoryCache {
    fn get(&self) -> BoxFuture<'_, Option<CachedLecture>> {
        let entry = self.snapshot();
        async move { entry }.boxed()
    }

    fn set<'a>(&'a self, entry: &'a CachedLecture) -> BoxFuture<'a, Result<(), CacheError>> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(entry.clone());
        }
        async { Ok(()) }.boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), CacheError>> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        async { Ok(()) }.boxed()
    }
}

/// 磁盘缓存
///
/// 以 JSON 文件保存唯一一条缓存，进程重启（即"刷新页面"）后依然可读。
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entry(&self) -> Option<CachedLecture> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("缓存文件不存在: {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("⚠️ 无法读取缓存文件 {}: {}，按未命中处理", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("⚠️ 缓存文件内容损坏 {}: {}，按未命中处理", self.path.display(), e);
                None
            }
        }
    }

    async fn write_entry(&self, entry: &CachedLecture) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(entry)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| self.io_error(source))?;
        }

        // 先写临时文件再改名，避免读到写了一半的内容
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await.map_err(|source| self.io_error(source))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        debug!("缓存已写入: {}", self.path.display());
        Ok(())
    }

    async fn remove_entry(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LectureCache for FileCache {
    fn get(&self) -> BoxFuture<'_, Option<CachedLecture>> {
        self.read_entry().boxed()
    }

    fn set<'a>(&'a self, entry: &'a CachedLecture) -> BoxFuture<'a, Result<(), CacheError>> {
        self.write_entry(entry).boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), CacheError>> {
        self.remove_entry().boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LectureDocument;
    use serde_json::json;

    fn entry(topic: &str, title: &str) -> CachedLecture {
        CachedLecture::new(
            topic,
            LectureDocument {
                title: title.to_string(),
                slides: json!([{ "heading": title }]),
                research_tasks: Vec::new(),
            },
        )
    }

    #[tokio::test]
    async fn test_memory_cache_last_write_wins() {
        let cache = MemoryCache::new();
        assert!(cache.get().await.is_none());

        cache.set(&entry("a", "A")).await.unwrap();
        cache.set(&entry("b", "B")).await.unwrap();
        assert_eq!(cache.get().await.unwrap().lecture.title, "B");
        assert_eq!(cache.get().await.unwrap().lecture.title, "B");

        cache.clear().await.unwrap();
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_file_cache_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lecture.json");

        FileCache::new(&path).set(&entry("photosynthesis", "Photosynthesis")).await.unwrap();

        // 新实例模拟页面刷新
        let reloaded = FileCache::new(&path).get().await.unwrap();
        assert_eq!(reloaded.topic, "photosynthesis");
        assert_eq!(reloaded.lecture.title, "Photosynthesis");
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(FileCache::new(&path).get().await.is_none());
    }

    #[tokio::test]
    async fn test_file_cache_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("lecture.json"));

        cache.clear().await.unwrap();
        cache.set(&entry("a", "A")).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get().await.is_none());
        assert!(!cache.path().exists());
    }
}
