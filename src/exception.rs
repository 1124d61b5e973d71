// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 定义请求处理生命周期中可能出现的全部失败类型。
//!
//! - 协议层：请求报文无法解析、方法或版本不受支持。
//! - 文件系统层：打开失败、读取失败、文件不是 Markdown 文档。
//! - 渲染层：页面模板执行失败，以及启动阶段的主题加载失败。
//!
//! 错误文本只写入日志，是否以及如何告知客户端完全由错误映射函数决定。

use std::{io, path::PathBuf};

use thiserror::Error;

/// 渲染钩子可以返回任意错误，统一装箱保存。
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 服务器处理请求过程中发生的异常类型。
#[derive(Debug, Error)]
pub enum Exception {
    /// 请求字节流不是合法的 UTF-8。
    #[error("Request bytes can't be parsed in UTF-8")]
    RequestIsNotUtf8,
    /// 请求行格式错误，无法提取方法、路径与版本。
    #[error("Malformed request line")]
    MalformedRequest,
    /// 不支持的 HTTP 方法。
    #[error("Unsupported request method")]
    UnSupportedRequestMethod,
    /// 不支持的 HTTP 协议版本。
    #[error("Unsupported HTTP version")]
    UnsupportedHttpVersion,
    /// 路径不存在或无法访问。
    #[error("open {}: {source}", .path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 文件存在，但不是可以渲染的 Markdown 文档。对外等同于“未找到”。
    #[error("mdoc: file not found")]
    NotAMarkdownFile,
    /// 读取文件内容或目录项时发生 I/O 错误。
    #[error("read {}: {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 渲染钩子执行失败。
    #[error("render failed: {0}")]
    RenderFailure(#[source] BoxError),
    /// 启动时主题模板缺失或格式错误。
    #[error("theme template {}: {source}", .path.display())]
    ThemeLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl Exception {
    /// 把任意渲染错误包装为 `RenderFailure`，供自定义渲染钩子使用。
    pub fn render<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Exception::RenderFailure(err.into())
    }

    /// 底层的操作系统错误类型（如果有）。
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Exception::OpenFailure { source, .. } | Exception::ReadFailure { source, .. } => {
                Some(source.kind())
            }
            _ => None,
        }
    }

    /// 是否应当被视为“未找到”。
    pub fn is_not_found(&self) -> bool {
        matches!(self, Exception::NotAMarkdownFile)
            || self.io_kind() == Some(io::ErrorKind::NotFound)
    }

    /// 是否是权限不足。
    pub fn is_permission_denied(&self) -> bool {
        self.io_kind() == Some(io::ErrorKind::PermissionDenied)
    }
}

impl From<minijinja::Error> for Exception {
    fn from(err: minijinja::Error) -> Self {
        Exception::RenderFailure(Box::new(err))
    }
}
