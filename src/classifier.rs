// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 条目分类
//!
//! 根据请求 URL 与打开的文件系统条目决定处理方式。
//! 目录总是规范化为带尾部 `/` 的 URL，文件总是规范化为不带尾部 `/` 的 URL；
//! 目录下的 `index.md` 在不改变 URL 的前提下成为该目录的文档。

use crate::util::{encode_path_segment, path_base};

/// 打开解析后路径得到的条目类型。打开失败不经过分类，直接交给错误映射。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 目录缺少尾部 `/`：307 到 `<最后一段>/`
    AddSlash(String),
    /// 文件带有尾部 `/`：307 到 `../<文件名>`
    RemoveSlash(String),
    /// 渲染目录列表
    Listing,
    /// 把目录下的 `index.md` 当作文档渲染，逻辑路径仍为目录 URL
    ImplicitIndex,
    /// 渲染 Markdown 文档
    Document,
}

/// 状态转移表。`check_index` 只在目录 URL 带尾部 `/` 时调用，
/// 返回 `index.md` 是否可以作为文档打开。
pub fn classify<F>(url: &str, kind: EntryKind, check_index: F) -> Outcome
where
    F: FnOnce() -> bool,
{
    let trailing_slash = url.ends_with('/');
    match kind {
        EntryKind::Directory if !trailing_slash => {
            Outcome::AddSlash(format!("{}/", encode_path_segment(path_base(url))))
        }
        EntryKind::Directory => {
            if check_index() {
                Outcome::ImplicitIndex
            } else {
                Outcome::Listing
            }
        }
        EntryKind::File if trailing_slash => {
            Outcome::RemoveSlash(format!("../{}", encode_path_segment(path_base(url))))
        }
        EntryKind::File => Outcome::Document,
    }
}

/// 在重定向目标后附加原始查询串。
pub fn with_query(location: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", location, q),
        _ => location.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_directory_without_slash_redirects() {
        assert_eq!(
            classify("/notes", EntryKind::Directory, || panic!("must not check the index")),
            Outcome::AddSlash("notes/".to_string())
        );
        assert_eq!(
            classify("/docs/api", EntryKind::Directory, || true),
            Outcome::AddSlash("api/".to_string())
        );
    }

    #[test]
    fn test_directory_with_slash_lists_or_uses_index() {
        assert_eq!(classify("/docs/", EntryKind::Directory, || false), Outcome::Listing);
        assert_eq!(classify("/docs/", EntryKind::Directory, || true), Outcome::ImplicitIndex);
        assert_eq!(classify("/", EntryKind::Directory, || false), Outcome::Listing);
    }

    #[test]
    fn test_index_check_runs_once_only_when_needed() {
        let calls = Cell::new(0);
        classify("/docs/", EntryKind::Directory, || {
            calls.set(calls.get() + 1);
            false
        });
        assert_eq!(calls.get(), 1);

        classify("/docs/guide.md", EntryKind::File, || {
            calls.set(calls.get() + 1);
            true
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_file_with_slash_redirects_to_parent_relative() {
        assert_eq!(
            classify("/docs/guide.md/", EntryKind::File, || true),
            Outcome::RemoveSlash("../guide.md".to_string())
        );
        // 顶层文件同样适用
        assert_eq!(
            classify("/guide.md/", EntryKind::File, || false),
            Outcome::RemoveSlash("../guide.md".to_string())
        );
    }

    #[test]
    fn test_redirect_targets_are_encoded() {
        assert_eq!(
            classify("/my notes", EntryKind::Directory, || false),
            Outcome::AddSlash("my%20notes/".to_string())
        );
        assert_eq!(
            classify("/docs/a\r\nb.md/", EntryKind::File, || false),
            Outcome::RemoveSlash("../a%0D%0Ab.md".to_string())
        );
    }

    #[test]
    fn test_file_without_slash_is_document() {
        assert_eq!(classify("/guide.md", EntryKind::File, || true), Outcome::Document);
        assert_eq!(classify("/logo.png", EntryKind::File, || true), Outcome::Document);
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("notes/", Some("a=1&b=2")), "notes/?a=1&b=2");
        assert_eq!(with_query("notes/", Some("")), "notes/");
        assert_eq!(with_query("../a.md", None), "../a.md");
    }
}
