// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应构建模块
//!
//! `Response` 保存状态行、常用标头与响应体，并负责序列化为报文字节。
//! `from_content` 实现按修改时间的条件请求、单段范围请求与内容压缩，
//! 渲染后的页面和主题静态资源都经由它写出。

use crate::{
    param::*,
    request::Request,
    util::{detect_content_type, format_http_date},
};

use brotli::enc::{self, backward_references::BrotliEncoderParams};
use bytes::Bytes;
use chrono::prelude::*;
use flate2::{
    write::{DeflateEncoder, GzEncoder},
    Compression,
};
use log::{debug, error};

use std::{
    io::{self, Write},
    path::Path,
    time::SystemTime,
};

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    content_length: u64,
    date: DateTime<Utc>,
    content_encoding: Option<HttpEncoding>,
    server_name: String,
    allow: Option<Vec<HttpRequestMethod>>,
    content: Option<Bytes>,
    content_range: Option<String>,
    accept_ranges: Option<String>,
    location: Option<String>,
    last_modified: Option<DateTime<Utc>>,
    nosniff: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: 0,
            date: Utc::now(),
            content_encoding: None,
            server_name: SERVER_NAME.to_string(),
            allow: None,
            content: None,
            content_range: None,
            accept_ranges: None,
            location: None,
            last_modified: None,
            nosniff: false,
        }
    }

    /// 只有状态行的空响应。
    pub fn from_status_code(code: u16) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response
    }

    /// 307 临时重定向。`location` 原样写入 `Location` 头，可以是相对路径。
    pub fn redirect(location: &str) -> Self {
        let mut response = Self::from_status_code(307);
        response.location = Some(location.to_string());
        response
    }

    /// 只包含状态原因短语的纯文本错误响应，不回显任何内部错误信息。
    pub fn plain_error(code: u16) -> Self {
        let mut response = Self::from_status_code(code);
        let body = format!("{}\n", response.information);
        response.set_body(Bytes::from(body), PLAIN_MIME);
        response.nosniff = true;
        if code == 405 {
            response.allow = Some(ALLOWED_METHODS.to_vec());
        }
        response
    }

    /// OPTIONS 请求的应答：204 并列出允许的方法。
    pub fn options() -> Self {
        let mut response = Self::from_status_code(204);
        response.allow = Some(ALLOWED_METHODS.to_vec());
        response
    }

    /// 以给定名称与修改时间写出一段完整内容。
    ///
    /// - `If-Modified-Since` 不早于修改时间（秒级精度）时返回 304；
    /// - 启用范围请求且请求携带 `Range` 时返回 206 或 416；
    /// - 其余情况返回 200，并按 `Accept-Encoding` 压缩可压缩的类型。
    ///
    /// `name` 只用于推断 `Content-Type`，未知扩展名时嗅探内容。
    pub fn from_content(
        request: &Request,
        name: &Path,
        modified: SystemTime,
        content: Vec<u8>,
        enable_ranges: bool,
    ) -> Self {
        let id = request.id();
        let mut response = Self::new();
        let last_modified = truncate_to_seconds(DateTime::<Utc>::from(modified));
        response.last_modified = Some(last_modified);

        if let Some(since) = request.if_modified_since() {
            if last_modified <= since {
                debug!("[ID{}]内容未修改，返回304", id);
                response.set_code(304);
                return response;
            }
        }

        let mime = detect_content_type(name, &content);
        let file_size = content.len() as u64;
        if enable_ranges {
            response.accept_ranges = Some("bytes".to_string());
            if let Some((start, end)) = request.range() {
                let end = end.unwrap_or(file_size.saturating_sub(1)).min(file_size.saturating_sub(1));
                if file_size == 0 || start >= file_size || start > end {
                    error!(
                        "[ID{}]无效的Range请求: start={}, end={}, size={}",
                        id, start, end, file_size
                    );
                    response.set_code(416);
                    response.content_range = Some(format!("bytes */{}", file_size));
                    return response;
                }
                debug!("[ID{}]处理Range请求: bytes {}-{}/{}", id, start, end, file_size);
                response.set_code(206);
                response.content_range = Some(format!("bytes {}-{}/{}", start, end, file_size));
                let slice = content[start as usize..=end as usize].to_vec();
                response.set_body(Bytes::from(slice), mime);
                return response;
            }
        }

        let encoding = if should_skip_compression(mime) {
            None
        } else {
            decide_encoding(request.accept_encoding())
        };
        let body = match encoding {
            Some(mode) => match compress(&content, mode) {
                Ok(c) => {
                    response.content_encoding = Some(mode);
                    c
                }
                Err(e) => {
                    error!("[ID{}]压缩失败: {}，返回未压缩内容", id, e);
                    content
                }
            },
            None => content,
        };
        response.set_body(Bytes::from(body), mime);
        response
    }

    fn set_body(&mut self, body: Bytes, mime: &str) {
        self.content_length = body.len() as u64;
        self.content_type = Some(mime.to_string());
        self.content = Some(body);
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&reason) => reason.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                String::new()
            }
        };
        self
    }

    /// HEAD 请求：保留全部标头（包括 `Content-Length`），去掉响应体。
    pub fn strip_body(&mut self) -> &mut Self {
        self.content = None;
        self
    }

    pub fn set_version(&mut self, version: HttpVersion) -> &mut Self {
        self.version = version;
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut header = format!(
            "{} {} {}{}",
            self.version, self.status_code, self.information, CRLF
        );
        // 标头值中的 CR/LF 会拆分报文，写出前丢弃
        let mut push = |name: &str, value: &str| {
            header.push_str(name);
            header.push_str(": ");
            header.extend(value.chars().filter(|c| !matches!(c, '\r' | '\n')));
            header.push_str(CRLF);
        };
        if let Some(t) = &self.content_type {
            push("Content-Type", t);
        }
        if let Some(e) = self.content_encoding {
            push("Content-Encoding", &e.to_string());
        }
        if self.status_code != 204 && self.status_code != 304 {
            push("Content-Length", &self.content_length.to_string());
        }
        push("Date", &format_date(&self.date));
        push("Server", &self.server_name);
        if let Some(l) = &self.last_modified {
            push("Last-Modified", &format_http_date(l));
        }
        if let Some(l) = &self.location {
            push("Location", l);
        }
        if let Some(a) = &self.allow {
            let allow: Vec<String> = a.iter().map(|m| m.to_string()).collect();
            push("Allow", &allow.join(", "));
        }
        if let Some(r) = &self.accept_ranges {
            push("Accept-Ranges", r);
        }
        if let Some(r) = &self.content_range {
            push("Content-Range", r);
        }
        if self.nosniff {
            push("X-Content-Type-Options", "nosniff");
        }
        header.push_str(CRLF);

        let mut bytes = header.into_bytes();
        if let Some(c) = &self.content {
            bytes.extend_from_slice(c);
        }
        bytes
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_encoding(&self) -> Option<HttpEncoding> {
        self.content_encoding
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn content_range(&self) -> Option<&str> {
        self.content_range.as_deref()
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    format_http_date(date)
}

fn truncate_to_seconds(date: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(date.timestamp(), 0).unwrap_or(date)
}

fn compress(data: &[u8], mode: HttpEncoding) -> io::Result<Vec<u8>> {
    let result = match mode {
        HttpEncoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        HttpEncoding::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        HttpEncoding::Br => {
            let params = BrotliEncoderParams::default();
            let mut output = Vec::new();
            enc::BrotliCompress(&mut io::Cursor::new(data), &mut output, &params)?;
            Ok(output)
        }
    };

    if let Ok(compressed) = &result {
        debug!(
            "压缩完成: {}, 原始大小: {} bytes, 压缩后: {} bytes",
            mode,
            data.len(),
            compressed.len()
        );
    }

    result
}

fn should_skip_compression(mime_type: &str) -> bool {
    let skip_types = [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "image/x-icon",
        "application/pdf",
        "application/octet-stream",
        "font/woff",
        "font/woff2",
    ];

    skip_types
        .iter()
        .any(|&skip_type| mime_type.starts_with(skip_type))
}

fn decide_encoding(accept_encoding: &[HttpEncoding]) -> Option<HttpEncoding> {
    if accept_encoding.contains(&HttpEncoding::Gzip) {
        Some(HttpEncoding::Gzip)
    } else if accept_encoding.contains(&HttpEncoding::Br) {
        Some(HttpEncoding::Br)
    } else if accept_encoding.contains(&HttpEncoding::Deflate) {
        Some(HttpEncoding::Deflate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request(raw: &str) -> Request {
        Request::try_from(raw.as_bytes(), 1).unwrap()
    }

    fn mtime() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn text(response: &Response) -> String {
        String::from_utf8_lossy(&response.as_bytes()).into_owned()
    }

    #[test]
    fn test_redirect() {
        let response = Response::redirect("notes/?a=1");
        let raw = text(&response);
        assert!(raw.starts_with("HTTP/1.1 307 Temporary Redirect\r\n"));
        assert!(raw.contains("Location: notes/?a=1\r\n"));
        assert!(raw.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn test_header_values_cannot_split_response() {
        let raw = text(&Response::redirect("a\r\nSet-Cookie: x=1/"));
        assert!(raw.contains("Location: aSet-Cookie: x=1/\r\n"));
        assert!(!raw.contains("\r\nSet-Cookie"));
    }

    #[test]
    fn test_plain_error_has_only_status_text() {
        for (code, reason) in [(404, "Not Found"), (403, "Forbidden"), (500, "Internal Server Error")] {
            let response = Response::plain_error(code);
            assert_eq!(response.status_code(), code);
            assert_eq!(response.content_type(), Some(PLAIN_MIME));
            assert_eq!(response.body().unwrap().as_ref(), format!("{}\n", reason).as_bytes());
            assert!(text(&response).contains("X-Content-Type-Options: nosniff"));
        }
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let raw = text(&Response::plain_error(405));
        assert!(raw.contains("Allow: GET, HEAD, OPTIONS"));
    }

    #[test]
    fn test_options_response() {
        let raw = text(&Response::options());
        assert!(raw.starts_with("HTTP/1.1 204 No Content"));
        assert!(raw.contains("Allow: GET, HEAD, OPTIONS"));
        assert!(!raw.contains("Content-Length"));
    }

    #[test]
    fn test_from_content_sniffs_html() {
        let req = request("GET /guide.md HTTP/1.1\r\n\r\n");
        let response = Response::from_content(
            &req,
            Path::new("/srv/docs/guide.md"),
            mtime(),
            b"<!DOCTYPE html><p>hi</p>".to_vec(),
            true,
        );
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content_type(), Some(HTML_MIME));
        assert_eq!(response.content_length(), 24);
        let raw = text(&response);
        assert!(raw.contains("Last-Modified: Tue, 14 Nov 2023 22:13:20 GMT"));
        assert!(raw.contains("Accept-Ranges: bytes"));
        assert!(raw.ends_with("<!DOCTYPE html><p>hi</p>"));
    }

    #[test]
    fn test_from_content_not_modified() {
        let req = request(
            "GET /guide.md HTTP/1.1\r\nIf-Modified-Since: Tue, 14 Nov 2023 22:13:20 GMT\r\n\r\n",
        );
        let response =
            Response::from_content(&req, Path::new("guide.md"), mtime(), b"<p></p>".to_vec(), true);
        assert_eq!(response.status_code(), 304);
        assert!(response.body().is_none());
        assert!(!text(&response).contains("Content-Length"));
    }

    #[test]
    fn test_from_content_modified_since_older_date() {
        let req = request(
            "GET /guide.md HTTP/1.1\r\nIf-Modified-Since: Mon, 13 Nov 2023 22:13:20 GMT\r\n\r\n",
        );
        let response =
            Response::from_content(&req, Path::new("guide.md"), mtime(), b"<p></p>".to_vec(), true);
        assert_eq!(response.status_code(), 200);
    }

    #[test]
    fn test_from_content_range() {
        let req = request("GET /style.css HTTP/1.1\r\nRange: bytes=2-5\r\n\r\n");
        let response = Response::from_content(
            &req,
            Path::new("style.css"),
            mtime(),
            b"0123456789".to_vec(),
            true,
        );
        assert_eq!(response.status_code(), 206);
        assert_eq!(response.content_range(), Some("bytes 2-5/10"));
        assert_eq!(response.body().unwrap().as_ref(), b"2345");
    }

    #[test]
    fn test_from_content_range_unsatisfiable() {
        let req = request("GET /style.css HTTP/1.1\r\nRange: bytes=20-\r\n\r\n");
        let response =
            Response::from_content(&req, Path::new("style.css"), mtime(), b"0123".to_vec(), true);
        assert_eq!(response.status_code(), 416);
        assert_eq!(response.content_range(), Some("bytes */4"));
    }

    #[test]
    fn test_from_content_range_disabled() {
        let req = request("GET /style.css HTTP/1.1\r\nRange: bytes=0-1\r\n\r\n");
        let response =
            Response::from_content(&req, Path::new("style.css"), mtime(), b"0123".to_vec(), false);
        assert_eq!(response.status_code(), 200);
        assert!(!text(&response).contains("Accept-Ranges"));
    }

    #[test]
    fn test_from_content_gzip() {
        let req = request("GET / HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n");
        let body = vec![b'a'; 4096];
        let response = Response::from_content(&req, Path::new("/srv/docs"), mtime(), body, true);
        assert_eq!(response.content_encoding(), Some(HttpEncoding::Gzip));
        assert_eq!(&response.body().unwrap()[0..2], &[0x1f, 0x8b]);
        assert!(response.content_length() < 4096);
        assert!(text(&response).contains("Content-Encoding: gzip"));
    }

    #[test]
    fn test_images_are_not_compressed() {
        let req = request("GET /logo.png HTTP/1.1\r\nAccept-Encoding: gzip, br\r\n\r\n");
        let response =
            Response::from_content(&req, Path::new("logo.png"), mtime(), vec![0x89, 0x50], true);
        assert_eq!(response.content_encoding(), None);
    }

    #[test]
    fn test_strip_body_keeps_length() {
        let req = request("HEAD / HTTP/1.1\r\n\r\n");
        let mut response =
            Response::from_content(&req, Path::new("a.txt"), mtime(), b"hello".to_vec(), true);
        response.strip_body();
        let raw = text(&response);
        assert!(raw.contains("Content-Length: 5"));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_decide_encoding() {
        assert_eq!(
            decide_encoding(&[HttpEncoding::Br, HttpEncoding::Gzip]),
            Some(HttpEncoding::Gzip)
        );
        assert_eq!(decide_encoding(&[HttpEncoding::Br]), Some(HttpEncoding::Br));
        assert_eq!(decide_encoding(&[HttpEncoding::Deflate]), Some(HttpEncoding::Deflate));
        assert_eq!(decide_encoding(&[]), None);
    }

    #[test]
    fn test_compress_round_sizes() {
        let data = vec![b'A'; 10000];
        for mode in [HttpEncoding::Gzip, HttpEncoding::Deflate, HttpEncoding::Br] {
            let result = compress(&data, mode).unwrap();
            assert!(result.len() < data.len());
        }
    }

    #[test]
    fn test_http_1_0_status_line() {
        let mut response = Response::from_status_code(404);
        response.set_version(HttpVersion::V1_0);
        assert!(text(&response).starts_with("HTTP/1.0 404 Not Found\r\n"));
    }
}
