// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # mdoc
//!
//! 把一个 Markdown 目录树作为网站提供：目录渲染为列表页，
//! `.md`/`.markdown` 文件渲染为 HTML 文档，两者都套用主题布局。

pub mod assets;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod document;
pub mod exception;
pub mod handler;
pub mod listing;
pub mod markdown;
pub mod page;
pub mod param;
pub mod render;
pub mod request;
pub mod resolver;
pub mod response;
pub mod server;
pub mod util;

pub use cache::FileCache;
pub use config::Config;
pub use exception::Exception;
pub use handler::{default_error_handler, ErrorHandler, Handler, HandlerBuilder};
pub use page::{DocumentPage, File, IndexPage, Layout, TrustedHtml};
pub use param::{HttpEncoding, HttpRequestMethod, HttpVersion};
pub use render::{DocumentRenderer, IndexRenderer};
pub use request::Request;
pub use response::Response;
