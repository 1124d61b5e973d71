// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 集中定义 `mdoc` 使用的常量与协议枚举：
//! - 挂载点、主题与资源目录的默认值；
//! - Markdown 文档识别规则；
//! - HTTP 状态码原因短语与主题资源的 MIME 类型；
//! - HTTP 方法、版本及内容编码的强类型枚举。

use lazy_static::lazy_static;
use std::{collections::HashMap, fmt};

/// 服务器名称标识，用于响应头的 `Server` 字段
pub const SERVER_NAME: &str = "mdoc";

/// HTTP 协议规定的换行符
pub const CRLF: &str = "\r\n";

/// 默认挂载点：站点根路径
pub const DEFAULT_ROOT: &str = "/";

/// 默认主题目录（相对于工作目录）
pub const DEFAULT_THEME_DIR: &str = "contrib/themes/default";

/// 挂载点下保留给主题静态资源的内部路径段
pub const ASSETS_SEGMENT: &str = ".mdoc/assets";

/// 目录的隐式首页文档
pub const INDEX_DOCUMENT: &str = "index.md";

/// 被识别为 Markdown 文档的扩展名（区分大小写）
pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// 隐藏文件前缀
pub const HIDDEN_PREFIX: char = '.';

/// 主题必须提供的模板
pub const LAYOUT_TEMPLATE: &str = "layout.html";
pub const INDEX_TEMPLATE: &str = "index.html";
pub const DOCUMENT_TEMPLATE: &str = "doc.html";

/// 渲染结果的 MIME 类型
pub const HTML_MIME: &str = "text/html;charset=utf-8";
pub const PLAIN_MIME: &str = "text/plain;charset=utf-8";
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

lazy_static! {
    /// 服务器允许处理的 HTTP 方法，用于 `Allow` 响应头。
    pub static ref ALLOWED_METHODS: Vec<HttpRequestMethod> = {
        vec![
            HttpRequestMethod::Get,
            HttpRequestMethod::Head,
            HttpRequestMethod::Options,
        ]
    };
}

lazy_static! {
    /// 本服务器会产生的状态码及其原因短语。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(204, "No Content");
        map.insert(206, "Partial Content");
        map.insert(304, "Not Modified");
        map.insert(307, "Temporary Redirect");
        map.insert(400, "Bad Request");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(416, "Range Not Satisfiable");
        map.insert(500, "Internal Server Error");
        map.insert(505, "HTTP Version Not Supported");
        map
    };
}

lazy_static! {
    /// 扩展名到 MIME 类型的映射，覆盖主题资源中常见的文件类型。
    ///
    /// `md` 故意不在表中：渲染后的页面依靠内容嗅探得到 `text/html`。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("css", "text/css;charset=utf-8");
        map.insert("csv", "text/csv");
        map.insert("eot", "application/vnd.ms-fontobject");
        map.insert("gif", "image/gif");
        map.insert("htm", HTML_MIME);
        map.insert("html", HTML_MIME);
        map.insert("ico", "image/x-icon");
        map.insert("jpeg", "image/jpeg");
        map.insert("jpg", "image/jpeg");
        map.insert("js", "text/javascript;charset=utf-8");
        map.insert("json", "application/json");
        map.insert("map", "application/json");
        map.insert("mjs", "text/javascript;charset=utf-8");
        map.insert("otf", "font/otf");
        map.insert("pdf", "application/pdf");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("ttf", "font/ttf");
        map.insert("txt", PLAIN_MIME);
        map.insert("wasm", "application/wasm");
        map.insert("webp", "image/webp");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        map.insert("xml", "text/xml");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    V1_0,
    V1_1,
}

/// 标准 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    Get,
    Head,
    Options,
    Post,
}

/// 支持的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpEncoding {
    Gzip,
    Deflate,
    Br,
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_0 => write!(f, "HTTP/1.0"),
            HttpVersion::V1_1 => write!(f, "HTTP/1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
            HttpRequestMethod::Post => write!(f, "POST"),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// `Content-Encoding` 头使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
            HttpEncoding::Deflate => write!(f, "deflate"),
            HttpEncoding::Br => write!(f, "br"),
        }
    }
}
