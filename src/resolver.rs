// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use crate::util::clean_path;

/// 保证 URL 路径以 `/` 开头。
pub fn normalize_url(url: &str) -> Cow<'_, str> {
    if url.starts_with('/') {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("/{}", url))
    }
}

/// 把挂载点内的 URL 路径映射为基目录下的文件系统路径。
///
/// 清理发生在拼接之前，`..` 无法越过基目录；符号链接不在防护范围内。
/// 本函数不访问文件系统。
pub fn resolve(base: &Path, url: &str) -> PathBuf {
    let url = normalize_url(url);
    if url == "/" {
        return base.to_path_buf();
    }
    let cleaned = clean_path(&url);
    let relative = cleaned.trim_start_matches('/');
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}
