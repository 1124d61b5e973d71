// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::{io::Read, path::Path};

use crate::{
    exception::Exception,
    markdown,
    page::{DocumentPage, Layout, TrustedHtml},
    util::is_markdown_file,
};

/// 读取已打开的 Markdown 文件并组装文档页。
///
/// 扩展名不是 `.md`/`.markdown` 时返回 `NotAMarkdownFile`，
/// 直接请求的文件与隐式 `index.md` 都经过这一检查。
pub fn read_document<R: Read>(
    mut file: R,
    path: &Path,
    layout: Layout,
) -> Result<DocumentPage, Exception> {
    if !is_markdown_file(path) {
        return Err(Exception::NotAMarkdownFile);
    }
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)
        .map_err(|source| Exception::ReadFailure {
            path: path.to_path_buf(),
            source,
        })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(DocumentPage {
        layout,
        name,
        content: TrustedHtml::new(markdown::to_html(&raw)),
    })
}
