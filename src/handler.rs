// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求分发模块
//!
//! `Handler` 持有一个站点的全部只读配置：文档根目录、挂载点、主题、
//! 两个渲染钩子与错误映射函数。每个请求经过以下步骤：
//!
//! 1. 方法检查（`OPTIONS` 直接应答，`GET`/`HEAD` 以外返回 405）；
//! 2. 去掉挂载点前缀，`.mdoc/assets` 下的请求交给主题资源服务；
//! 3. 路径解析、打开条目、分类；
//! 4. 重定向、目录列表、文档渲染三者之一，或交给错误映射函数。
//!
//! 每个请求恰好产生一个响应。

use std::{
    fs::{self, Metadata},
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use log::{debug, error, warn};

use crate::{
    assets::Assets,
    classifier::{classify, with_query, EntryKind, Outcome},
    document::read_document,
    exception::Exception,
    listing::list_files,
    page::{index_page, DocumentPage, IndexPage, Layout},
    param::*,
    render::{default_document_renderer, default_index_renderer, DocumentRenderer, IndexRenderer},
    request::Request,
    resolver::resolve,
    response::Response,
    util::{clean_path, encode_path_segment, path_base},
};

/// 把失败转换为响应的函数，每个失败的请求调用一次。
pub type ErrorHandler = Arc<dyn Fn(&Request, &Exception) -> Response + Send + Sync>;

/// 默认错误映射：未找到 → 404，权限不足 → 403，其余 → 500。
/// 响应体只有状态短语，不包含任何错误细节。
pub fn default_error_handler(_request: &Request, err: &Exception) -> Response {
    let code = if err.is_not_found() {
        404
    } else if err.is_permission_denied() {
        403
    } else {
        500
    };
    Response::plain_error(code)
}

/// 挂载点总是以 `/` 开头并以 `/` 结尾。
pub fn normalize_root(root: &str) -> String {
    let cleaned = clean_path(&format!("/{}", root));
    if cleaned == "/" {
        cleaned
    } else {
        format!("{}/", cleaned)
    }
}

pub struct HandlerBuilder {
    dir: PathBuf,
    root: String,
    theme: PathBuf,
    index_renderer: Option<IndexRenderer>,
    document_renderer: Option<DocumentRenderer>,
    error_handler: Option<ErrorHandler>,
    cache_size: usize,
    enable_ranges: bool,
}

impl HandlerBuilder {
    /// 挂载点，默认 `/`
    pub fn root(mut self, root: &str) -> Self {
        self.root = root.to_string();
        self
    }

    /// 主题目录，默认 `contrib/themes/default`
    pub fn theme<P: Into<PathBuf>>(mut self, theme: P) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn index_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(IndexPage) -> Result<Vec<u8>, Exception> + Send + Sync + 'static,
    {
        self.index_renderer = Some(Arc::new(render));
        self
    }

    pub fn document_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(DocumentPage) -> Result<Vec<u8>, Exception> + Send + Sync + 'static,
    {
        self.document_renderer = Some(Arc::new(render));
        self
    }

    pub fn error_handler<F>(mut self, handle: F) -> Self
    where
        F: Fn(&Request, &Exception) -> Response + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handle));
        self
    }

    /// 主题资源 LRU 缓存的容量
    pub fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    pub fn enable_range_requests(mut self, enable: bool) -> Self {
        self.enable_ranges = enable;
        self
    }

    /// 构建 `Handler`。未被替换的渲染钩子在这里从主题加载模板，
    /// 模板缺失或格式错误时返回 `ThemeLoad`。
    pub fn build(self) -> Result<Handler, Exception> {
        let index_renderer = match self.index_renderer {
            Some(render) => render,
            None => default_index_renderer(&self.theme)?,
        };
        let document_renderer = match self.document_renderer {
            Some(render) => render,
            None => default_document_renderer(&self.theme)?,
        };
        let error_handler: ErrorHandler = match self.error_handler {
            Some(handle) => handle,
            None => Arc::new(default_error_handler),
        };
        let dir = if self.dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            self.dir
        };
        let assets = Assets::new(self.theme.join("assets"), self.cache_size, self.enable_ranges);
        debug!(
            "站点配置：目录 {}，挂载点 {}，主题 {}",
            dir.display(),
            self.root,
            self.theme.display()
        );
        Ok(Handler {
            dir,
            root: normalize_root(&self.root),
            theme_name: self.theme.to_string_lossy().into_owned(),
            assets,
            index_renderer,
            document_renderer,
            error_handler,
            enable_ranges: self.enable_ranges,
        })
    }
}

/// 一个挂载点上的 Markdown 站点。构建后只读，可在线程间共享。
pub struct Handler {
    dir: PathBuf,
    root: String,
    theme_name: String,
    assets: Assets,
    index_renderer: IndexRenderer,
    document_renderer: DocumentRenderer,
    error_handler: ErrorHandler,
    enable_ranges: bool,
}

impl Handler {
    /// 以 `dir` 为文档根目录开始配置，空路径视为当前目录。
    pub fn builder<P: Into<PathBuf>>(dir: P) -> HandlerBuilder {
        HandlerBuilder {
            dir: dir.into(),
            root: DEFAULT_ROOT.to_string(),
            theme: PathBuf::from(DEFAULT_THEME_DIR),
            index_renderer: None,
            document_renderer: None,
            error_handler: None,
            cache_size: 16,
            enable_ranges: true,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// 处理一个请求并返回完整的响应。
    pub fn serve(&self, request: &Request) -> Response {
        let mut response = match request.method() {
            HttpRequestMethod::Options => Response::options(),
            HttpRequestMethod::Get | HttpRequestMethod::Head => self.route(request),
            method => {
                warn!("[ID{}]不允许的请求方法：{}", request.id(), method);
                Response::plain_error(405)
            }
        };
        if request.method() == HttpRequestMethod::Head {
            response.strip_body();
        }
        response.set_version(request.version());
        response
    }

    fn route(&self, request: &Request) -> Response {
        let id = request.id();
        let path = request.path();
        let mount = self.root.trim_end_matches('/');
        let result = match path.strip_prefix(mount) {
            // 挂载点本身缺少尾部 `/`
            Some("") => Ok(Response::redirect(&with_query(
                &format!("{}/", encode_path_segment(path_base(path))),
                request.query(),
            ))),
            Some(rest) if rest.starts_with('/') => {
                let assets_prefix = format!("/{}", ASSETS_SEGMENT);
                match rest.strip_prefix(&assets_prefix) {
                    Some(asset) if asset.is_empty() || asset.starts_with('/') => {
                        debug!("[ID{}]主题资源请求：{}", id, asset);
                        self.assets.serve(request, asset)
                    }
                    _ => self.dispatch(request, rest),
                }
            }
            _ => {
                debug!("[ID{}]请求路径不在挂载点 {} 之下：{}", id, self.root, path);
                Err(Exception::NotAMarkdownFile)
            }
        };
        match result {
            Ok(response) => response,
            Err(e) => {
                if e.is_not_found() || e.is_permission_denied() {
                    warn!("[ID{}]{}", id, e);
                } else {
                    error!("[ID{}]{}", id, e);
                }
                (self.error_handler)(request, &e)
            }
        }
    }

    /// `url` 是相对挂载点的路径，以 `/` 开头。
    fn dispatch(&self, request: &Request, url: &str) -> Result<Response, Exception> {
        let id = request.id();
        let name = resolve(&self.dir, url);
        debug!("[ID{}]{} 解析为 {}", id, url, name.display());
        let (file, metadata) = open(&name)?;

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let index_path = name.join(INDEX_DOCUMENT);
        let mut index = None;
        let outcome = classify(url, kind, || {
            index = open_regular_file(&index_path);
            index.is_some()
        });
        debug!("[ID{}]分类结果：{:?}", id, outcome);

        let layout = Layout::new(&self.root, request.path(), &self.theme_name);
        match outcome {
            Outcome::AddSlash(location) | Outcome::RemoveSlash(location) => {
                Ok(Response::redirect(&with_query(&location, request.query())))
            }
            Outcome::ImplicitIndex => match index {
                Some((index_file, index_metadata)) => self.render_document(
                    request,
                    index_file,
                    &index_path,
                    modified(&index_metadata),
                    layout,
                ),
                None => self.render_listing(request, &name, modified(&metadata), layout),
            },
            Outcome::Listing => {
                drop(file);
                self.render_listing(request, &name, modified(&metadata), layout)
            }
            Outcome::Document => {
                self.render_document(request, file, &name, modified(&metadata), layout)
            }
        }
    }

    fn render_listing(
        &self,
        request: &Request,
        dir: &Path,
        modified: SystemTime,
        layout: Layout,
    ) -> Result<Response, Exception> {
        let files = list_files(dir)?;
        debug!("[ID{}]目录 {} 共 {} 项", request.id(), dir.display(), files.len());
        let body = (self.index_renderer)(index_page(layout, files))?;
        Ok(Response::from_content(
            request,
            dir,
            modified,
            body,
            self.enable_ranges,
        ))
    }

    fn render_document(
        &self,
        request: &Request,
        file: fs::File,
        path: &Path,
        modified: SystemTime,
        layout: Layout,
    ) -> Result<Response, Exception> {
        let page = read_document(file, path, layout)?;
        let body = (self.document_renderer)(page)?;
        Ok(Response::from_content(
            request,
            path,
            modified,
            body,
            self.enable_ranges,
        ))
    }
}

fn open(path: &Path) -> Result<(fs::File, Metadata), Exception> {
    let open_failure = |source| Exception::OpenFailure {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::open(path).map_err(open_failure)?;
    let metadata = file.metadata().map_err(open_failure)?;
    Ok((file, metadata))
}

// 隐式 index.md 必须是普通文件，同名目录不算
fn open_regular_file(path: &Path) -> Option<(fs::File, Metadata)> {
    open(path).ok().filter(|(_, metadata)| metadata.is_file())
}

fn modified(metadata: &Metadata) -> SystemTime {
    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
}
