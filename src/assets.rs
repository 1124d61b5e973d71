// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
    sync::Mutex,
    time::SystemTime,
};

use bytes::Bytes;
use log::{debug, warn};

use crate::{cache::FileCache, exception::Exception, request::Request, response::Response};

/// 主题静态资源服务，根目录为 `<theme>/assets`。
pub struct Assets {
    base_dir: PathBuf,
    cache: Mutex<FileCache>,
    enable_ranges: bool,
}

impl Assets {
    pub fn new<P: Into<PathBuf>>(base: P, cache_size: usize, enable_ranges: bool) -> Self {
        Self {
            base_dir: base.into(),
            cache: Mutex::new(FileCache::from_capacity(cache_size)),
            enable_ranges,
        }
    }

    // 只接受普通路径段，出现 `..` 或根组件即拒绝
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// 返回资源内容；`url_path` 是去掉 `<root>.mdoc/assets` 前缀后的部分。
    pub fn serve(&self, request: &Request, url_path: &str) -> Result<Response, Exception> {
        let id = request.id();
        let path = self.map_path(url_path).ok_or_else(|| Exception::OpenFailure {
            path: PathBuf::from(url_path),
            source: io::Error::new(io::ErrorKind::NotFound, "invalid asset path"),
        })?;
        let open_failure = |source| Exception::OpenFailure {
            path: path.clone(),
            source,
        };
        let metadata = fs::metadata(&path).map_err(open_failure)?;
        if !metadata.is_file() {
            return Err(open_failure(io::Error::new(
                io::ErrorKind::NotFound,
                "asset is not a regular file",
            )));
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let content = self.load(&path, modified, id)?;
        Ok(Response::from_content(
            request,
            &path,
            modified,
            content.to_vec(),
            self.enable_ranges,
        ))
    }

    fn load(&self, path: &Path, modified: SystemTime, id: u128) -> Result<Bytes, Exception> {
        let mut cache = match self.cache.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("[ID{}]缓存锁被污染，恢复并继续", id);
                poisoned.into_inner()
            }
        };
        if let Some(bytes) = cache.find(path, modified) {
            debug!("[ID{}]资源缓存命中：{}", id, path.display());
            return Ok(bytes);
        }
        debug!("[ID{}]资源缓存未命中，读取：{}", id, path.display());
        let bytes = fs::read(path)
            .map(Bytes::from)
            .map_err(|source| Exception::ReadFailure {
                path: path.to_path_buf(),
                source,
            })?;
        cache.push(path, bytes.clone(), modified);
        Ok(bytes)
    }
}
