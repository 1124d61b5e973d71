// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 页面数据模型
//!
//! 每个请求临时构造、交给渲染钩子后即丢弃的数据结构。
//! 构造后不再修改，渲染函数按值接收。

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::{param::ASSETS_SEGMENT, util::clean_path};

/// `IndexPage` 与 `DocumentPage` 共用的布局数据。
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    root: String,
    path: String,
    theme: String,
}

impl Layout {
    pub fn new(root: &str, path: &str, theme: &str) -> Self {
        Self {
            root: root.to_string(),
            path: path.to_string(),
            theme: theme.to_string(),
        }
    }

    /// 挂载点
    pub fn root(&self) -> &str {
        &self.root
    }

    /// 请求的逻辑 URL 路径（含挂载点）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 主题目录
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// 当前目录相对于挂载点的路径，总是以 `/` 开头。
    pub fn dir(&self) -> String {
        let relative = self.path.strip_prefix(&self.root).unwrap_or(&self.path);
        format!("/{}", relative.trim_start_matches('/'))
    }

    /// 主题静态资源的 URL：挂载点 + `.mdoc/assets` + 文件名。
    pub fn static_file(&self, name: &str) -> String {
        clean_path(&format!("{}/{}/{}", self.root, ASSETS_SEGMENT, name))
    }
}

/// 目录列表中的一项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub name: String,
    pub is_dir: bool,
}

impl File {
    pub fn new(name: &str, is_dir: bool) -> Self {
        Self {
            name: name.to_string(),
            is_dir,
        }
    }

    /// 目录名后追加 `/`
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl Serialize for File {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("File", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("is_dir", &self.is_dir)?;
        state.serialize_field("display_name", &self.display_name())?;
        state.end()
    }
}

/// 目录列表页。
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPage {
    pub layout: Layout,
    pub files: Vec<File>,
}

/// 已转换为 HTML、无需再次转义的文档片段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Markdown 文档页。
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    pub layout: Layout,
    /// 源文件的文件名（不含目录）
    pub name: String,
    pub content: TrustedHtml,
}

/// 由文件列表与逻辑路径组装目录页，不会失败。
pub fn index_page(layout: Layout, files: Vec<File>) -> IndexPage {
    IndexPage { layout, files }
}
