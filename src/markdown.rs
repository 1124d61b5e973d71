// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use pulldown_cmark::{html, Options, Parser};

/// 接近 GitHub 风格的 Markdown 扩展：表格、删除线、任务列表、脚注。
fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// 把 Markdown 源字节转换为 HTML 片段。非法 UTF-8 字节以替换字符代替。
pub fn to_html(raw: &[u8]) -> String {
    let source = String::from_utf8_lossy(raw);
    let parser = Parser::new_ext(&source, options());
    let mut buf = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut buf, parser);
    buf
}
