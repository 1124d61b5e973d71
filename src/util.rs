// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::path::Path;

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::param::*;

/// 按 URL 路径语义做纯词法的清理：折叠重复的 `/`，消解 `.` 与 `..`。
///
/// 以 `/` 开头的路径清理后仍以 `/` 开头，且 `..` 无法越过根。
/// 不访问文件系统。
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => {
                    if !rooted {
                        parts.push("..");
                    }
                }
            },
            s => parts.push(s),
        }
    }
    let joined = parts.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// 路径的最后一段，忽略末尾的 `/`。空路径返回 `.`，全为 `/` 时返回 `/`。
pub fn path_base(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

/// 路径段中原样保留的字符：字母、数字与 `-` `.` `_` `~`
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 对解码后的单个路径段重新做百分号编码，用于写入 `Location` 头。
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// 扩展名是否恰好为 `.md` 或 `.markdown`（区分大小写）。
///
/// 扩展名取文件名最后一个 `.` 之后的部分，因此 `.md` 本身也算 Markdown 文档。
pub fn is_markdown_file<P: AsRef<Path>>(name: P) -> bool {
    let file_name = match name.as_ref().file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    match file_name.rsplit_once('.') {
        Some((_, ext)) => MARKDOWN_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// 按 RFC 9110 的 IMF-fixdate 格式化时间，如 `Sun, 06 Nov 1994 08:49:37 GMT`。
pub fn format_http_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// 解析 `If-Modified-Since` 等头部中的时间。无法解析时返回 `None`。
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// 依据名称的扩展名确定 MIME 类型；扩展名未知时对内容进行嗅探。
pub fn detect_content_type(name: &Path, content: &[u8]) -> &'static str {
    let by_extension = name
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| MIME_TYPES.get(e).copied());
    match by_extension {
        Some(mime) => mime,
        None => sniff_content_type(content),
    }
}

/// 简化版内容嗅探：跳过前导空白后以 `<` 开头视为 HTML，合法 UTF-8 视为纯文本。
pub fn sniff_content_type(content: &[u8]) -> &'static str {
    let head = &content[..content.len().min(512)];
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let head = &head[start..];
    if head.is_empty() {
        return PLAIN_MIME;
    }
    if head.starts_with(b"<") {
        return HTML_MIME;
    }
    match std::str::from_utf8(head) {
        Ok(_) => PLAIN_MIME,
        // 截断可能切在多字节字符中间
        Err(e) if e.error_len().is_none() => PLAIN_MIME,
        Err(_) => OCTET_STREAM_MIME,
    }
}
