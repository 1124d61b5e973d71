// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 页面渲染钩子
//!
//! 两个可替换的渲染函数把页面数据转换为最终字节。默认实现在构建
//! `Handler` 时从主题目录加载 `layout.html` 与页面模板（`index.html`
//! 或 `doc.html`），模板缺失或语法错误会让构建失败。
//!
//! 模板中可用的变量：
//!
//! | 名称 | 含义 |
//! |------|------|
//! | `root` | 挂载点 |
//! | `path` | 请求的逻辑路径 |
//! | `dir` | 相对挂载点的目录路径 |
//! | `theme` | 主题目录 |
//! | `static_file(name)` | 主题资源的 URL |
//! | `files` | 目录页条目，含 `name`、`is_dir`、`display_name` |
//! | `name`、`content` | 文档文件名与 HTML 内容（不会被再次转义） |

use std::{fs, path::Path, sync::Arc};

use log::debug;
use minijinja::{context, escape_formatter, AutoEscape, Environment, Output, State, Value};

use crate::{
    exception::Exception,
    page::{DocumentPage, IndexPage, Layout},
    param::*,
};

pub type IndexRenderer = Arc<dyn Fn(IndexPage) -> Result<Vec<u8>, Exception> + Send + Sync>;
pub type DocumentRenderer =
    Arc<dyn Fn(DocumentPage) -> Result<Vec<u8>, Exception> + Send + Sync>;

/// 布局模板与一个页面模板组成的模板集。
pub struct ThemeTemplates {
    env: Environment<'static>,
    page: &'static str,
}

impl ThemeTemplates {
    /// 从主题目录加载 `layout.html` 与 `page`。
    pub fn load(theme_dir: &Path, page: &'static str) -> Result<Self, Exception> {
        let mut env = Environment::new();
        env.set_formatter(html_formatter);
        for name in [LAYOUT_TEMPLATE, page] {
            let path = theme_dir.join(name);
            let source = fs::read_to_string(&path).map_err(|e| Exception::ThemeLoad {
                path: path.clone(),
                source: Box::new(e),
            })?;
            env.add_template_owned(name, source)
                .map_err(|e| Exception::ThemeLoad {
                    path: path.clone(),
                    source: Box::new(e),
                })?;
            debug!("主题模板已载入：{}", path.display());
        }
        Ok(Self { env, page })
    }

    pub fn render(&self, ctx: Value) -> Result<Vec<u8>, Exception> {
        let template = self.env.get_template(self.page)?;
        Ok(template.render(ctx)?.into_bytes())
    }
}

// 只转义 `< > & " '`，URL 路径中的 `/` 原样输出
fn html_formatter(out: &mut Output, state: &State, value: &Value) -> Result<(), minijinja::Error> {
    match value.as_str() {
        Some(text) if state.auto_escape() == AutoEscape::Html && !value.is_safe() => {
            let mut escaped = String::with_capacity(text.len());
            for c in text.chars() {
                match c {
                    '<' => escaped.push_str("&lt;"),
                    '>' => escaped.push_str("&gt;"),
                    '&' => escaped.push_str("&amp;"),
                    '"' => escaped.push_str("&quot;"),
                    '\'' => escaped.push_str("&#x27;"),
                    c => escaped.push(c),
                }
            }
            Ok(out.write_str(&escaped)?)
        }
        _ => escape_formatter(out, state, value),
    }
}

fn static_file_function(layout: &Layout) -> Value {
    let layout = layout.clone();
    Value::from_function(move |name: String| layout.static_file(&name))
}

/// 目录页的模板上下文
pub fn index_context(page: IndexPage) -> Value {
    let layout = &page.layout;
    context! {
        root => layout.root(),
        path => layout.path(),
        dir => layout.dir(),
        theme => layout.theme(),
        static_file => static_file_function(layout),
        files => page.files,
    }
}

/// 文档页的模板上下文。`content` 标记为安全字符串，模板不会再次转义。
pub fn document_context(page: DocumentPage) -> Value {
    let layout = &page.layout;
    context! {
        root => layout.root(),
        path => layout.path(),
        dir => layout.dir(),
        theme => layout.theme(),
        static_file => static_file_function(layout),
        name => page.name,
        content => Value::from_safe_string(page.content.into_string()),
    }
}

/// 以主题中的 `layout.html` + `index.html` 渲染目录页。
pub fn default_index_renderer(theme_dir: &Path) -> Result<IndexRenderer, Exception> {
    let templates = ThemeTemplates::load(theme_dir, INDEX_TEMPLATE)?;
    Ok(Arc::new(move |page: IndexPage| templates.render(index_context(page))))
}

/// 以主题中的 `layout.html` + `doc.html` 渲染文档页。
pub fn default_document_renderer(theme_dir: &Path) -> Result<DocumentRenderer, Exception> {
    let templates = ThemeTemplates::load(theme_dir, DOCUMENT_TEMPLATE)?;
    Ok(Arc::new(move |page: DocumentPage| {
        templates.render(document_context(page))
    }))
}
