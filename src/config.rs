// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use serde_derive::Deserialize;

use log::{info, warn};
use std::{
    fs,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs},
    path::Path,
};

use crate::param::{DEFAULT_ROOT, DEFAULT_THEME_DIR};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_doc_root")]
    doc_root: String,
    #[serde(default = "default_mount")]
    mount: String,
    #[serde(default = "default_theme")]
    theme: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default)]
    cache_size: usize,
    #[serde(default = "default_enable_range_requests")]
    enable_range_requests: bool,
}

fn default_doc_root() -> String {
    ".".to_string()
}

fn default_mount() -> String {
    DEFAULT_ROOT.to_string()
}

fn default_theme() -> String {
    DEFAULT_THEME_DIR.to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_local() -> bool {
    true
}

fn default_enable_range_requests() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            doc_root: default_doc_root(),
            mount: default_mount(),
            theme: default_theme(),
            port: default_port(),
            local: default_local(),
            worker_threads: 0,
            cache_size: 0,
            enable_range_requests: default_enable_range_requests(),
        }
        .normalized()
    }

    /// 从 TOML 文件读取配置。文件不存在或格式错误时使用默认配置。
    pub fn from_toml<P: AsRef<Path>>(filename: P) -> Self {
        let filename = filename.as_ref();
        let text = match fs::read_to_string(filename) {
            Ok(text) => text,
            Err(e) => {
                warn!("无法读取配置文件{}：{}，使用默认配置", filename.display(), e);
                return Self::new();
            }
        };
        match Self::from_toml_str(&text) {
            Ok(config) => {
                info!("配置文件{}已载入", filename.display());
                config
            }
            Err(e) => {
                warn!("无法从配置文件构建配置对象：{}，使用默认配置", e);
                Self::new()
            }
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(text).map(Config::normalized)
    }

    fn normalized(mut self) -> Self {
        if self.worker_threads == 0 {
            self.worker_threads = num_cpus::get();
        }
        if self.cache_size == 0 {
            self.cache_size = 16;
        }
        self
    }

    /// 命令行参数覆盖配置文件
    pub fn set_doc_root(&mut self, doc_root: &str) {
        self.doc_root = doc_root.to_string();
    }

    pub fn set_mount(&mut self, mount: &str) {
        self.mount = mount.to_string();
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.theme = theme.to_string();
    }

    /// 由 `local` 与 `port` 得到的监听地址
    pub fn listen_addr(&self) -> SocketAddr {
        let address = match self.local {
            true => Ipv4Addr::new(127, 0, 0, 1),
            false => Ipv4Addr::new(0, 0, 0, 0),
        };
        SocketAddr::V4(SocketAddrV4::new(address, self.port))
    }
}

impl Config {
    pub fn doc_root(&self) -> &str {
        &self.doc_root
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn enable_range_requests(&self) -> bool {
        self.enable_range_requests
    }
}

/// 解析 `--addr`。省略主机部分（如 `:3000`）时监听全部地址。
pub fn parse_listen_addr(addr: &str) -> Option<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    addr.to_socket_addrs().ok()?.next()
}
