// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责把 TCP 流中读取的原始字节解析为强类型的 `Request`：
//! 1. 请求行（方法、请求目标、版本），请求目标拆分为解码后的路径与原始查询串；
//! 2. 条件请求与范围请求相关的标头；
//! 3. 内容协商使用的 `Accept-Encoding`。

use chrono::{DateTime, Utc};
use log::error;
use percent_encoding::percent_decode_str;

use crate::{exception::Exception, param::*, util::parse_http_date};

/// 一个 HTTP 请求的元数据。不包含请求体。
#[derive(Debug, Clone)]
pub struct Request {
    /// 全局请求 ID，用于日志追踪
    id: u128,
    method: HttpRequestMethod,
    /// 百分号解码后的路径，不含查询串
    path: String,
    /// 原始查询串（不含 `?`），重定向时原样保留
    query: Option<String>,
    version: HttpVersion,
    user_agent: String,
    accept_encoding: Vec<HttpEncoding>,
    if_modified_since: Option<DateTime<Utc>>,
    /// 范围请求参数：(起始字节, 结束字节)，结束为 `None` 表示直到末尾
    range: Option<(u64, Option<u64>)>,
}

impl Request {
    /// 从原始字节缓冲区构建 `Request`。
    ///
    /// 报文不是 UTF-8、请求行不完整、方法或版本不受支持时返回对应的 `Exception`。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let request_string = match std::str::from_utf8(buffer) {
            Ok(s) => s.trim_end_matches('\0'),
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let mut lines = request_string.split(CRLF);
        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split(' ').filter(|s| !s.is_empty()).collect();
        if parts.len() != 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(Exception::MalformedRequest);
        }

        let method_str = parts[0].to_uppercase();
        let method = match method_str.as_str() {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            "OPTIONS" => HttpRequestMethod::Options,
            "POST" => HttpRequestMethod::Post,
            _ => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        let version_str = parts[2].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            "HTTP/1.0" => HttpVersion::V1_0,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        let (raw_path, query) = match parts[1].split_once('?') {
            Some((p, q)) => (p, Some(q.to_string()).filter(|q| !q.is_empty())),
            None => (parts[1], None),
        };
        let path = percent_decode_str(raw_path).decode_utf8_lossy().into_owned();

        let mut user_agent = String::new();
        let mut accept_encoding = vec![];
        let mut if_modified_since = None;
        let mut range = None;
        for line in lines {
            if line.is_empty() {
                break;
            }
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match name.trim().to_ascii_lowercase().as_str() {
                "user-agent" => user_agent = value.to_string(),
                "accept-encoding" => accept_encoding = parse_accept_encoding(value),
                "if-modified-since" => if_modified_since = parse_http_date(value),
                // 格式示例: Range: bytes=0-1023
                "range" => range = parse_range(value),
                _ => {}
            }
        }

        Ok(Self {
            id,
            method,
            path,
            query,
            version,
            user_agent,
            accept_encoding,
            if_modified_since,
            range,
        })
    }
}

fn parse_accept_encoding(value: &str) -> Vec<HttpEncoding> {
    let mut encodings = vec![];
    for token in value.split(',') {
        let name = token.split(';').next().unwrap_or_default().trim();
        let encoding = match name {
            "gzip" => HttpEncoding::Gzip,
            "deflate" => HttpEncoding::Deflate,
            "br" => HttpEncoding::Br,
            _ => continue,
        };
        if !encodings.contains(&encoding) {
            encodings.push(encoding);
        }
    }
    encodings
}

fn parse_range(value: &str) -> Option<(u64, Option<u64>)> {
    let bytes_part = value.strip_prefix("bytes=")?;
    let (start, end) = bytes_part.split_once('-')?;
    let start = start.trim().parse::<u64>().ok()?;
    let end = match end.trim() {
        "" => None,
        e => Some(e.parse::<u64>().ok()?),
    };
    Some((start, end))
}

impl Request {
    pub fn id(&self) -> u128 {
        self.id
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// 解码后的请求路径（不含查询串）
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn accept_encoding(&self) -> &[HttpEncoding] {
        &self.accept_encoding
    }

    pub fn if_modified_since(&self) -> Option<DateTime<Utc>> {
        self.if_modified_since
    }

    pub fn range(&self) -> Option<(u64, Option<u64>)> {
        self.range
    }
}
