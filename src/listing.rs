// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::{cmp::Ordering, fs, path::Path};

use crate::{
    exception::Exception,
    page::File,
    param::HIDDEN_PREFIX,
    util::is_markdown_file,
};

/// 读取目录，过滤并排序后返回可以出现在目录页中的条目。
///
/// 过滤规则：隐藏条目一律丢弃；非目录条目必须是 Markdown 文档。
/// 排序规则：目录在前、文件在后，组内按名称字节序升序。
pub fn list_files(dir: &Path) -> Result<Vec<File>, Exception> {
    let read_failure = |source| Exception::ReadFailure {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failure)? {
        let entry = entry.map_err(read_failure)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map_err(read_failure)?.is_dir();
        let file = File::new(&name, is_dir);
        if is_listed(&file) {
            files.push(file);
        }
    }
    sort_files(&mut files);
    Ok(files)
}

fn is_listed(file: &File) -> bool {
    if file.name.starts_with(HIDDEN_PREFIX) {
        return false;
    }
    file.is_dir || is_markdown_file(&file.name)
}

fn sort_files(files: &mut [File]) {
    files.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
}
