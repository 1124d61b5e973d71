// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::SystemTime,
};

use bytes::Bytes;
use lru::LruCache;

#[derive(Clone)]
struct CacheEntry {
    content: Bytes,
    modified_time: SystemTime,
}

/// 主题静态资源的 LRU 缓存，以修改时间判定条目是否仍然有效。
///
/// 只缓存 `<theme>/assets` 下的原始文件，渲染后的页面永远不进入缓存。
pub struct FileCache {
    cache: LruCache<PathBuf, CacheEntry>,
}

impl FileCache {
    // 容量为 0 时按 1 处理
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    pub fn push(&mut self, path: &Path, bytes: Bytes, modified_time: SystemTime) {
        let entry = CacheEntry {
            content: bytes,
            modified_time,
        };
        self.cache.put(path.to_path_buf(), entry);
    }

    // 文件已被修改的条目视为未命中
    pub fn find(&mut self, path: &Path, current_modified_time: SystemTime) -> Option<Bytes> {
        match self.cache.get(path) {
            Some(entry) if entry.modified_time == current_modified_time => {
                Some(entry.content.clone())
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
